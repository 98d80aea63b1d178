use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{Error, Result, ValidationError};
use crate::utils::{format_date, parse_date_tolerant, parse_decimal_tolerant};

pub const GOAL_KIND_SAVINGS: &str = "savings";
pub const GOAL_KIND_CATEGORY_REDUCTION: &str = "category_reduction";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalKind {
    Savings,
    CategoryReduction,
}

impl GoalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalKind::Savings => GOAL_KIND_SAVINGS,
            GoalKind::CategoryReduction => GOAL_KIND_CATEGORY_REDUCTION,
        }
    }
}

impl FromStr for GoalKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            GOAL_KIND_SAVINGS => Ok(GoalKind::Savings),
            GOAL_KIND_CATEGORY_REDUCTION => Ok(GoalKind::CategoryReduction),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown goal kind: {other}"
            )))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub kind: GoalKind,
    pub target_amount: Decimal,
    pub target_date: NaiveDate,
    pub category_id: Option<String>,
    pub baseline_amount: Option<Decimal>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl Goal {
    /// Progress toward the target given the achieved amount (net savings for
    /// savings goals, baseline minus spending for reduction goals), clamped
    /// to [0, 100] and rounded to one decimal place.
    pub fn progress_percentage(&self, achieved: Decimal) -> Decimal {
        if self.target_amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (achieved / self.target_amount * Decimal::ONE_HUNDRED)
            .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
            .round_dp(1)
    }

    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.target_date - today).num_days().max(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub kind: GoalKind,
    pub target_amount: Decimal,
    pub target_date: NaiveDate,
    pub category_id: Option<String>,
    pub baseline_amount: Option<Decimal>,
}

impl NewGoal {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Goal name cannot be empty".to_string(),
            )));
        }
        if self.target_amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Target amount must be greater than zero".to_string(),
            )));
        }
        if self.kind == GoalKind::CategoryReduction {
            if self.category_id.is_none() {
                return Err(Error::Validation(ValidationError::MissingField(
                    "categoryId".to_string(),
                )));
            }
            if self.baseline_amount.is_none() {
                return Err(Error::Validation(ValidationError::MissingField(
                    "baselineAmount".to_string(),
                )));
            }
        }
        Ok(())
    }
}

/// Database model for goals
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct GoalDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub goal_type: String,
    pub target_amount: String,
    pub target_date: String,
    pub category_id: Option<String>,
    pub baseline_amount: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl From<GoalDB> for Goal {
    fn from(db: GoalDB) -> Self {
        Goal {
            kind: GoalKind::from_str(&db.goal_type).unwrap_or(GoalKind::Savings),
            target_amount: parse_decimal_tolerant(&db.target_amount, "goals.target_amount"),
            target_date: parse_date_tolerant(&db.target_date, "goals.target_date"),
            baseline_amount: db
                .baseline_amount
                .as_deref()
                .map(|a| parse_decimal_tolerant(a, "goals.baseline_amount")),
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            category_id: db.category_id,
            is_active: db.is_active,
            created_at: db.created_at,
        }
    }
}

impl From<NewGoal> for GoalDB {
    fn from(goal: NewGoal) -> Self {
        GoalDB {
            id: goal
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            user_id: goal.user_id,
            name: goal.name,
            goal_type: goal.kind.as_str().to_string(),
            target_amount: goal.target_amount.to_string(),
            target_date: format_date(goal.target_date),
            category_id: goal.category_id,
            baseline_amount: goal.baseline_amount.map(|a| a.to_string()),
            is_active: true,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
