use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{Error, Result, ValidationError};
use crate::ledger::{EntryKind, NewEntry};
use crate::utils::{format_date, parse_date_tolerant, parse_decimal_tolerant};

pub const WAGER_RESULT_PENDING: &str = "pending";
pub const WAGER_RESULT_WON: &str = "won";
pub const WAGER_RESULT_LOST: &str = "lost";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WagerResult {
    Pending,
    Won,
    Lost,
}

impl WagerResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            WagerResult::Pending => WAGER_RESULT_PENDING,
            WagerResult::Won => WAGER_RESULT_WON,
            WagerResult::Lost => WAGER_RESULT_LOST,
        }
    }
}

impl FromStr for WagerResult {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            WAGER_RESULT_PENDING => Ok(WagerResult::Pending),
            WAGER_RESULT_WON => Ok(WagerResult::Won),
            WAGER_RESULT_LOST => Ok(WagerResult::Lost),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown wager result: {other}"
            )))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wager {
    pub id: String,
    pub user_id: String,
    pub event_name: String,
    pub stake: Decimal,
    pub payout: Decimal,
    pub result: WagerResult,
    pub account_id: String,
    pub date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Wager {
    /// Builds the single ledger entry this wager generates in its current
    /// state. A won wager yields the net profit as income; lost and pending
    /// wagers record the stake as an outlay.
    pub fn generated_entry(&self) -> NewEntry {
        let (kind, amount, description) = match self.result {
            WagerResult::Won => (
                EntryKind::Income,
                self.payout - self.stake,
                format!("Wager won: {}", self.event_name),
            ),
            WagerResult::Lost => (
                EntryKind::Expense,
                self.stake,
                format!("Wager lost: {}", self.event_name),
            ),
            WagerResult::Pending => (
                EntryKind::Expense,
                self.stake,
                format!("Wager placed: {}", self.event_name),
            ),
        };

        NewEntry {
            id: None,
            user_id: self.user_id.clone(),
            kind,
            amount,
            description,
            date: self.date,
            account_id: self.account_id.clone(),
            destination_account_id: None,
            category_id: None,
            wager_id: Some(self.id.clone()),
            is_recurring: false,
            is_ant_expense: false,
            line_items: vec![],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWager {
    pub id: Option<String>,
    pub user_id: String,
    pub event_name: String,
    pub stake: Decimal,
    #[serde(default)]
    pub payout: Decimal,
    pub result: WagerResult,
    pub account_id: String,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

impl NewWager {
    pub fn validate(&self) -> Result<()> {
        validate_wager_fields(&self.event_name, self.stake, self.payout, self.result)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WagerUpdate {
    pub id: String,
    pub user_id: String,
    pub event_name: String,
    pub stake: Decimal,
    pub payout: Decimal,
    pub result: WagerResult,
    pub account_id: String,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

impl WagerUpdate {
    pub fn validate(&self) -> Result<()> {
        validate_wager_fields(&self.event_name, self.stake, self.payout, self.result)
    }
}

fn validate_wager_fields(
    event_name: &str,
    stake: Decimal,
    payout: Decimal,
    result: WagerResult,
) -> Result<()> {
    if event_name.trim().is_empty() {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "Event name cannot be empty".to_string(),
        )));
    }
    if stake <= Decimal::ZERO {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "Stake must be greater than zero".to_string(),
        )));
    }
    if payout < Decimal::ZERO {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "Payout cannot be negative".to_string(),
        )));
    }
    // A won wager must net a profit, otherwise the generated income entry
    // would carry a non-positive amount.
    if result == WagerResult::Won && payout <= stake {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "Payout of a won wager must exceed the stake".to_string(),
        )));
    }
    Ok(())
}

/// Database model for wagers
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::wagers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct WagerDB {
    pub id: String,
    pub user_id: String,
    pub event_name: String,
    pub stake: String,
    pub payout: String,
    pub result: String,
    pub account_id: String,
    pub date: String,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<WagerDB> for Wager {
    fn from(db: WagerDB) -> Self {
        Wager {
            stake: parse_decimal_tolerant(&db.stake, "wagers.stake"),
            payout: parse_decimal_tolerant(&db.payout, "wagers.payout"),
            result: WagerResult::from_str(&db.result).unwrap_or(WagerResult::Pending),
            date: parse_date_tolerant(&db.date, "wagers.date"),
            id: db.id,
            user_id: db.user_id,
            event_name: db.event_name,
            account_id: db.account_id,
            notes: db.notes,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewWager> for WagerDB {
    fn from(wager: NewWager) -> Self {
        let now = chrono::Utc::now().naive_utc();
        WagerDB {
            id: wager
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            user_id: wager.user_id,
            event_name: wager.event_name,
            stake: wager.stake.to_string(),
            payout: wager.payout.to_string(),
            result: wager.result.as_str().to_string(),
            account_id: wager.account_id,
            date: format_date(wager.date),
            notes: wager.notes,
            created_at: now,
            updated_at: now,
        }
    }
}
