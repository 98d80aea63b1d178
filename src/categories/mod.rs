//! Categories module - read-only reference data for the ledger and reports.

mod categories_model;
mod categories_repository;
mod categories_traits;

pub use categories_model::{
    Category, CategoryDB, CategoryKind, CategoryScope, CATEGORY_KIND_EXPENSE, CATEGORY_KIND_INCOME,
};
pub use categories_repository::CategoryRepository;
pub use categories_traits::CategoryRepositoryTrait;
