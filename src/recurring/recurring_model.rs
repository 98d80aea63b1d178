use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{Error, Result, ValidationError};
use crate::ledger::{EntryKind, NewEntry};
use crate::utils::{format_date, parse_date_tolerant, parse_decimal_tolerant};

pub const FREQUENCY_DAILY: &str = "daily";
pub const FREQUENCY_WEEKLY: &str = "weekly";
pub const FREQUENCY_BIWEEKLY: &str = "biweekly";
pub const FREQUENCY_MONTHLY: &str = "monthly";
pub const FREQUENCY_ANNUAL: &str = "annual";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Annual,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => FREQUENCY_DAILY,
            Frequency::Weekly => FREQUENCY_WEEKLY,
            Frequency::Biweekly => FREQUENCY_BIWEEKLY,
            Frequency::Monthly => FREQUENCY_MONTHLY,
            Frequency::Annual => FREQUENCY_ANNUAL,
        }
    }

    /// Advances an occurrence date by one period. Monthly advancement clamps
    /// the day-of-month to 28 so every target month is valid; annual rolls
    /// the year with the same clamp for Feb 29.
    pub fn advance(&self, from: NaiveDate) -> NaiveDate {
        match self {
            Frequency::Daily => from + Days::new(1),
            Frequency::Weekly => from + Days::new(7),
            Frequency::Biweekly => from + Days::new(15),
            Frequency::Monthly => {
                let (year, month) = if from.month() == 12 {
                    (from.year() + 1, 1)
                } else {
                    (from.year(), from.month() + 1)
                };
                let day = from.day().min(28);
                NaiveDate::from_ymd_opt(year, month, day).unwrap_or(from)
            }
            Frequency::Annual => {
                let day = from.day().min(28);
                NaiveDate::from_ymd_opt(from.year() + 1, from.month(), day).unwrap_or(from)
            }
        }
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            FREQUENCY_DAILY => Ok(Frequency::Daily),
            FREQUENCY_WEEKLY => Ok(Frequency::Weekly),
            FREQUENCY_BIWEEKLY => Ok(Frequency::Biweekly),
            FREQUENCY_MONTHLY => Ok(Frequency::Monthly),
            FREQUENCY_ANNUAL => Ok(Frequency::Annual),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown frequency: {other}"
            )))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTemplate {
    pub id: String,
    pub user_id: String,
    pub kind: EntryKind,
    pub amount: Decimal,
    pub description: String,
    pub account_id: String,
    pub destination_account_id: Option<String>,
    pub category_id: Option<String>,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub next_occurrence: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub last_executed: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl RecurringTemplate {
    /// Builds the ledger entry for one occurrence, dated at the occurrence
    /// itself rather than the day the scheduler happens to run.
    pub fn materialize(&self, occurrence: NaiveDate) -> NewEntry {
        NewEntry {
            id: None,
            user_id: self.user_id.clone(),
            kind: self.kind,
            amount: self.amount,
            description: self.description.clone(),
            date: occurrence,
            account_id: self.account_id.clone(),
            destination_account_id: self.destination_account_id.clone(),
            category_id: self.category_id.clone(),
            wager_id: None,
            is_recurring: true,
            is_ant_expense: false,
            line_items: vec![],
        }
    }

    /// True when the template's end date lies before the given occurrence.
    pub fn is_expired_at(&self, occurrence: NaiveDate) -> bool {
        self.end_date.is_some_and(|end| end < occurrence)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecurringTemplate {
    pub id: Option<String>,
    pub user_id: String,
    pub kind: EntryKind,
    pub amount: Decimal,
    pub description: String,
    pub account_id: String,
    pub destination_account_id: Option<String>,
    pub category_id: Option<String>,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl NewRecurringTemplate {
    pub fn validate(&self) -> Result<()> {
        if self.kind == EntryKind::Adjustment {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Adjustments cannot recur".to_string(),
            )));
        }
        if self.amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Amount must be greater than zero".to_string(),
            )));
        }
        match self.kind {
            EntryKind::Transfer => {
                let Some(dest) = self.destination_account_id.as_deref() else {
                    return Err(Error::Validation(ValidationError::InvalidInput(
                        "Transfers require a destination account".to_string(),
                    )));
                };
                if dest == self.account_id {
                    return Err(Error::Validation(ValidationError::InvalidInput(
                        "Destination account must differ from the source account".to_string(),
                    )));
                }
            }
            _ => {
                if self.destination_account_id.is_some() {
                    return Err(Error::Validation(ValidationError::InvalidInput(
                        "Only transfers can have a destination account".to_string(),
                    )));
                }
            }
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "End date cannot precede the start date".to_string(),
                )));
            }
        }
        Ok(())
    }
}

/// Database model for recurring templates
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::recurring_templates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct RecurringTemplateDB {
    pub id: String,
    pub user_id: String,
    pub entry_type: String,
    pub amount: String,
    pub description: String,
    pub account_id: String,
    pub destination_account_id: Option<String>,
    pub category_id: Option<String>,
    pub frequency: String,
    pub start_date: String,
    pub next_occurrence: String,
    pub end_date: Option<String>,
    pub last_executed: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl From<RecurringTemplateDB> for RecurringTemplate {
    fn from(db: RecurringTemplateDB) -> Self {
        RecurringTemplate {
            kind: EntryKind::from_str(&db.entry_type).unwrap_or(EntryKind::Expense),
            amount: parse_decimal_tolerant(&db.amount, "recurring_templates.amount"),
            frequency: Frequency::from_str(&db.frequency).unwrap_or(Frequency::Monthly),
            start_date: parse_date_tolerant(&db.start_date, "recurring_templates.start_date"),
            next_occurrence: parse_date_tolerant(
                &db.next_occurrence,
                "recurring_templates.next_occurrence",
            ),
            end_date: db
                .end_date
                .as_deref()
                .map(|d| parse_date_tolerant(d, "recurring_templates.end_date")),
            last_executed: db
                .last_executed
                .as_deref()
                .map(|d| parse_date_tolerant(d, "recurring_templates.last_executed")),
            id: db.id,
            user_id: db.user_id,
            description: db.description,
            account_id: db.account_id,
            destination_account_id: db.destination_account_id,
            category_id: db.category_id,
            is_active: db.is_active,
            created_at: db.created_at,
        }
    }
}

impl From<NewRecurringTemplate> for RecurringTemplateDB {
    fn from(template: NewRecurringTemplate) -> Self {
        RecurringTemplateDB {
            id: template
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            user_id: template.user_id,
            entry_type: template.kind.as_str().to_string(),
            amount: template.amount.to_string(),
            description: template.description,
            account_id: template.account_id,
            destination_account_id: template.destination_account_id,
            category_id: template.category_id,
            frequency: template.frequency.as_str().to_string(),
            start_date: format_date(template.start_date),
            // The first occurrence is the start date itself.
            next_occurrence: format_date(template.start_date),
            end_date: template.end_date.map(format_date),
            last_executed: None,
            is_active: true,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_weekly_biweekly_advancement() {
        let from = day(2025, 3, 20);
        assert_eq!(Frequency::Daily.advance(from), day(2025, 3, 21));
        assert_eq!(Frequency::Weekly.advance(from), day(2025, 3, 27));
        assert_eq!(Frequency::Biweekly.advance(from), day(2025, 4, 4));
    }

    #[test]
    fn test_monthly_advancement_clamps_day_to_28() {
        assert_eq!(Frequency::Monthly.advance(day(2025, 1, 31)), day(2025, 2, 28));
        assert_eq!(Frequency::Monthly.advance(day(2025, 3, 15)), day(2025, 4, 15));
        assert_eq!(Frequency::Monthly.advance(day(2025, 12, 5)), day(2026, 1, 5));
    }

    #[test]
    fn test_annual_advancement_rolls_year() {
        assert_eq!(Frequency::Annual.advance(day(2025, 6, 10)), day(2026, 6, 10));
        assert_eq!(Frequency::Annual.advance(day(2024, 2, 29)), day(2025, 2, 28));
    }

    #[test]
    fn test_expiry_check() {
        let db: RecurringTemplateDB = NewRecurringTemplate {
            id: None,
            user_id: "user-1".to_string(),
            kind: EntryKind::Expense,
            amount: rust_decimal_macros::dec!(100),
            description: "rent".to_string(),
            account_id: "acc-1".to_string(),
            destination_account_id: None,
            category_id: None,
            frequency: Frequency::Monthly,
            start_date: day(2025, 1, 1),
            end_date: Some(day(2025, 3, 1)),
        }
        .into();
        let template: RecurringTemplate = db.into();

        assert!(!template.is_expired_at(day(2025, 3, 1)));
        assert!(template.is_expired_at(day(2025, 3, 2)));
    }

    #[test]
    fn test_validation_rejects_adjustment_templates() {
        let template = NewRecurringTemplate {
            id: None,
            user_id: "user-1".to_string(),
            kind: EntryKind::Adjustment,
            amount: rust_decimal_macros::dec!(100),
            description: "nope".to_string(),
            account_id: "acc-1".to_string(),
            destination_account_id: None,
            category_id: None,
            frequency: Frequency::Daily,
            start_date: day(2025, 1, 1),
            end_date: None,
        };
        assert!(template.validate().is_err());
    }
}
