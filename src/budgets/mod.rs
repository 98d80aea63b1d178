//! Budgets module - spending limits evaluated on demand by the reports engine.

mod budgets_model;
mod budgets_repository;
mod budgets_traits;

pub use budgets_model::{
    Budget, BudgetAlertStatus, BudgetDB, BudgetPeriod, NewBudget, BUDGET_PERIOD_ANNUAL,
    BUDGET_PERIOD_MONTHLY, BUDGET_PERIOD_WEEKLY,
};
pub use budgets_repository::BudgetRepository;
pub use budgets_traits::BudgetRepositoryTrait;
