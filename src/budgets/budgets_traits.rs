use super::budgets_model::{Budget, NewBudget};
use crate::Result;

/// Trait defining the contract for budget repository operations.
pub trait BudgetRepositoryTrait: Send + Sync {
    fn create(&self, new_budget: NewBudget) -> Result<Budget>;
    fn delete(&self, budget_id: &str) -> Result<()>;
    fn get_by_id(&self, budget_id: &str) -> Result<Budget>;
    fn list_active(&self, user_id: &str) -> Result<Vec<Budget>>;
    fn set_active(&self, budget_id: &str, active: bool) -> Result<()>;
}
