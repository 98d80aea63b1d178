//! Category reference data.
//!
//! Categories are read-only from the core's point of view: the ledger
//! validates against them and the aggregation engine groups by them.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const CATEGORY_KIND_INCOME: &str = "income";
pub const CATEGORY_KIND_EXPENSE: &str = "expense";

/// Whether a category classifies income or expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Income,
    Expense,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Income => CATEGORY_KIND_INCOME,
            CategoryKind::Expense => CATEGORY_KIND_EXPENSE,
        }
    }
}

impl FromStr for CategoryKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            CATEGORY_KIND_INCOME => Ok(CategoryKind::Income),
            CATEGORY_KIND_EXPENSE => Ok(CategoryKind::Expense),
            _ => Err(format!("Unknown category kind: {}", s)),
        }
    }
}

/// Domain model for a category. System defaults carry no owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub kind: CategoryKind,
    pub parent_id: Option<String>,
    pub is_default: bool,
    pub created_at: NaiveDateTime,
}

/// Explicit visibility predicate for category lookups: a user sees their own
/// categories plus the system defaults. Passed into every query that touches
/// categories instead of living in ambient state.
#[derive(Debug, Clone)]
pub struct CategoryScope {
    pub user_id: String,
}

impl CategoryScope {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn visible(&self, category: &Category) -> bool {
        category.is_default || category.user_id.as_deref() == Some(self.user_id.as_str())
    }
}

/// Database model for categories
#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CategoryDB {
    pub id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub category_type: String,
    pub parent_id: Option<String>,
    pub is_default: bool,
    pub created_at: NaiveDateTime,
}

impl From<CategoryDB> for Category {
    fn from(db: CategoryDB) -> Self {
        Category {
            kind: CategoryKind::from_str(&db.category_type).unwrap_or(CategoryKind::Expense),
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            parent_id: db.parent_id,
            is_default: db.is_default,
            created_at: db.created_at,
        }
    }
}
