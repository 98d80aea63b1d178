use super::goals_model::{Goal, NewGoal};
use crate::Result;

/// Trait defining the contract for goal repository operations.
pub trait GoalRepositoryTrait: Send + Sync {
    fn create(&self, new_goal: NewGoal) -> Result<Goal>;
    fn delete(&self, goal_id: &str) -> Result<()>;
    fn get_by_id(&self, goal_id: &str) -> Result<Goal>;
    fn list_active(&self, user_id: &str) -> Result<Vec<Goal>>;
}
