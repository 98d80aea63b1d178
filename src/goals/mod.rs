//! Goals module - savings and spending-reduction targets.

mod goals_model;
mod goals_repository;
mod goals_traits;

pub use goals_model::{
    Goal, GoalDB, GoalKind, NewGoal, GOAL_KIND_CATEGORY_REDUCTION, GOAL_KIND_SAVINGS,
};
pub use goals_repository::GoalRepository;
pub use goals_traits::GoalRepositoryTrait;
