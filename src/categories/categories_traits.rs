use super::categories_model::{Category, CategoryScope};
use crate::Result;

/// Trait defining the contract for category repository operations.
pub trait CategoryRepositoryTrait: Send + Sync {
    fn get_by_id(&self, category_id: &str) -> Result<Category>;
    fn list_visible(&self, scope: &CategoryScope) -> Result<Vec<Category>>;

    /// Returns the category id plus the ids of its direct subcategories,
    /// used by report filters that include a whole category subtree.
    fn get_with_children(&self, category_id: &str) -> Result<Vec<String>>;
}
