use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{Error, Result, ValidationError};
use crate::utils::parse_decimal_tolerant;

pub const BUDGET_PERIOD_WEEKLY: &str = "weekly";
pub const BUDGET_PERIOD_MONTHLY: &str = "monthly";
pub const BUDGET_PERIOD_ANNUAL: &str = "annual";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
    Annual,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Weekly => BUDGET_PERIOD_WEEKLY,
            BudgetPeriod::Monthly => BUDGET_PERIOD_MONTHLY,
            BudgetPeriod::Annual => BUDGET_PERIOD_ANNUAL,
        }
    }

    /// The closed date window the budget currently covers: the week from
    /// Monday, the calendar month, or the calendar year containing `today`.
    pub fn window(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            BudgetPeriod::Weekly => {
                let monday = today - Days::new(today.weekday().num_days_from_monday() as u64);
                (monday, monday + Days::new(6))
            }
            BudgetPeriod::Monthly => {
                let first = today.with_day(1).unwrap_or(today);
                let next_month = if today.month() == 12 {
                    NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
                };
                let last = next_month.map(|d| d - Days::new(1)).unwrap_or(today);
                (first, last)
            }
            BudgetPeriod::Annual => {
                let first = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                let last = NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today);
                (first, last)
            }
        }
    }
}

impl FromStr for BudgetPeriod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            BUDGET_PERIOD_WEEKLY => Ok(BudgetPeriod::Weekly),
            BUDGET_PERIOD_MONTHLY => Ok(BudgetPeriod::Monthly),
            BUDGET_PERIOD_ANNUAL => Ok(BudgetPeriod::Annual),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown budget period: {other}"
            )))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetAlertStatus {
    Ok,
    Warning,
    Exceeded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub user_id: String,
    pub category_id: String,
    pub amount_limit: Decimal,
    pub period: BudgetPeriod,
    pub alert_threshold: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl Budget {
    /// Percentage of the limit consumed, rounded to one decimal place.
    pub fn percentage_used(&self, spent: Decimal) -> Decimal {
        if self.amount_limit.is_zero() {
            return Decimal::ZERO;
        }
        (spent / self.amount_limit * Decimal::ONE_HUNDRED).round_dp(1)
    }

    /// Exceeded at or past 100% of the limit, warning at or past the
    /// threshold but under 100%. Compares unrounded amounts; the rounded
    /// percentage is display-only.
    pub fn alert_status(&self, spent: Decimal) -> BudgetAlertStatus {
        if self.amount_limit.is_zero() {
            return BudgetAlertStatus::Ok;
        }
        if spent >= self.amount_limit {
            BudgetAlertStatus::Exceeded
        } else if spent * Decimal::ONE_HUNDRED
            >= self.amount_limit * Decimal::from(self.alert_threshold)
        {
            BudgetAlertStatus::Warning
        } else {
            BudgetAlertStatus::Ok
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    pub id: Option<String>,
    pub user_id: String,
    pub category_id: String,
    pub amount_limit: Decimal,
    pub period: BudgetPeriod,
    pub alert_threshold: i32,
}

impl NewBudget {
    pub fn validate(&self) -> Result<()> {
        if self.amount_limit <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Budget limit must be greater than zero".to_string(),
            )));
        }
        if !(1..=100).contains(&self.alert_threshold) {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Alert threshold must be between 1 and 100".to_string(),
            )));
        }
        Ok(())
    }
}

/// Database model for budgets
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::budgets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BudgetDB {
    pub id: String,
    pub user_id: String,
    pub category_id: String,
    pub amount_limit: String,
    pub period: String,
    pub alert_threshold: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl From<BudgetDB> for Budget {
    fn from(db: BudgetDB) -> Self {
        Budget {
            amount_limit: parse_decimal_tolerant(&db.amount_limit, "budgets.amount_limit"),
            period: BudgetPeriod::from_str(&db.period).unwrap_or(BudgetPeriod::Monthly),
            id: db.id,
            user_id: db.user_id,
            category_id: db.category_id,
            alert_threshold: db.alert_threshold,
            is_active: db.is_active,
            created_at: db.created_at,
        }
    }
}

impl From<NewBudget> for BudgetDB {
    fn from(budget: NewBudget) -> Self {
        BudgetDB {
            id: budget
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            user_id: budget.user_id,
            category_id: budget.category_id,
            amount_limit: budget.amount_limit.to_string(),
            period: budget.period.as_str().to_string(),
            alert_threshold: budget.alert_threshold,
            is_active: true,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn budget(limit: Decimal, threshold: i32) -> Budget {
        Budget {
            id: "budget-1".to_string(),
            user_id: "user-1".to_string(),
            category_id: "cat-1".to_string(),
            amount_limit: limit,
            period: BudgetPeriod::Monthly,
            alert_threshold: threshold,
            is_active: true,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_weekly_window_starts_on_monday() {
        // 2025-03-13 is a Thursday.
        let (start, end) = BudgetPeriod::Weekly.window(day(2025, 3, 13));
        assert_eq!(start, day(2025, 3, 10));
        assert_eq!(end, day(2025, 3, 16));

        // A Monday is its own window start.
        let (start, _) = BudgetPeriod::Weekly.window(day(2025, 3, 10));
        assert_eq!(start, day(2025, 3, 10));
    }

    #[test]
    fn test_monthly_window_covers_calendar_month() {
        let (start, end) = BudgetPeriod::Monthly.window(day(2025, 2, 14));
        assert_eq!(start, day(2025, 2, 1));
        assert_eq!(end, day(2025, 2, 28));

        let (start, end) = BudgetPeriod::Monthly.window(day(2025, 12, 31));
        assert_eq!(start, day(2025, 12, 1));
        assert_eq!(end, day(2025, 12, 31));
    }

    #[test]
    fn test_annual_window_covers_calendar_year() {
        let (start, end) = BudgetPeriod::Annual.window(day(2025, 7, 4));
        assert_eq!(start, day(2025, 1, 1));
        assert_eq!(end, day(2025, 12, 31));
    }

    #[test]
    fn test_alert_status_boundaries() {
        let budget = budget(dec!(100000), 80);
        assert_eq!(budget.alert_status(dec!(79999)), BudgetAlertStatus::Ok);
        assert_eq!(budget.alert_status(dec!(80000)), BudgetAlertStatus::Warning);
        assert_eq!(budget.alert_status(dec!(85000)), BudgetAlertStatus::Warning);
        assert_eq!(budget.alert_status(dec!(100000)), BudgetAlertStatus::Exceeded);
        assert_eq!(budget.alert_status(dec!(100001)), BudgetAlertStatus::Exceeded);
    }

    #[test]
    fn test_percentage_rounds_to_one_decimal() {
        assert_eq!(budget(dec!(30000), 80).percentage_used(dec!(10000)), dec!(33.3));
        assert_eq!(budget(dec!(0), 80).percentage_used(dec!(10)), dec!(0));
    }
}
