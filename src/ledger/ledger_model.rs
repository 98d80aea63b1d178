use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{Error, ValidationError};
use crate::ledger::LedgerError;
use crate::utils::{format_date, parse_date_tolerant, parse_decimal_tolerant};

pub const ENTRY_TYPE_INCOME: &str = "income";
pub const ENTRY_TYPE_EXPENSE: &str = "expense";
pub const ENTRY_TYPE_TRANSFER: &str = "transfer";
pub const ENTRY_TYPE_ADJUSTMENT: &str = "adjustment";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    Income,
    Expense,
    Transfer,
    Adjustment,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Income => ENTRY_TYPE_INCOME,
            EntryKind::Expense => ENTRY_TYPE_EXPENSE,
            EntryKind::Transfer => ENTRY_TYPE_TRANSFER,
            EntryKind::Adjustment => ENTRY_TYPE_ADJUSTMENT,
        }
    }
}

impl FromStr for EntryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            ENTRY_TYPE_INCOME => Ok(EntryKind::Income),
            ENTRY_TYPE_EXPENSE => Ok(EntryKind::Expense),
            ENTRY_TYPE_TRANSFER => Ok(EntryKind::Transfer),
            ENTRY_TYPE_ADJUSTMENT => Ok(EntryKind::Adjustment),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown entry kind: {other}"
            )))),
        }
    }
}

/// Signed balance deltas an entry produces when applied, as
/// `(account_id, delta)` pairs.
pub fn balance_effects(
    kind: EntryKind,
    account_id: &str,
    destination_account_id: Option<&str>,
    amount: Decimal,
) -> Vec<(String, Decimal)> {
    match kind {
        EntryKind::Income => vec![(account_id.to_string(), amount)],
        EntryKind::Expense => vec![(account_id.to_string(), -amount)],
        EntryKind::Transfer => {
            let mut effects = vec![(account_id.to_string(), -amount)];
            if let Some(dest) = destination_account_id {
                effects.push((dest.to_string(), amount));
            }
            effects
        }
        // Adjustment amounts are already signed deltas.
        EntryKind::Adjustment => vec![(account_id.to_string(), amount)],
    }
}

/// Negates every delta, turning an apply set into its exact undo.
pub fn reverse_effects(effects: &[(String, Decimal)]) -> Vec<(String, Decimal)> {
    effects
        .iter()
        .map(|(account_id, delta)| (account_id.clone(), -*delta))
        .collect()
}

/// Collapses deltas to one net delta per account, dropping zero nets.
/// Output is sorted by account id so writers always touch account rows
/// in the same order.
pub fn merge_deltas(effects: Vec<(String, Decimal)>) -> Vec<(String, Decimal)> {
    let mut merged: std::collections::BTreeMap<String, Decimal> = std::collections::BTreeMap::new();
    for (account_id, delta) in effects {
        *merged.entry(account_id).or_insert(Decimal::ZERO) += delta;
    }
    merged
        .into_iter()
        .filter(|(_, delta)| !delta.is_zero())
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: String,
    pub entry_id: String,
    pub name: String,
    pub amount: Decimal,
    pub quantity: i32,
    pub category_id: Option<String>,
    pub is_ant_expense: bool,
}

impl LineItem {
    pub fn total(&self) -> Decimal {
        self.amount * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewLineItem {
    pub name: String,
    pub amount: Decimal,
    pub quantity: i32,
    pub category_id: Option<String>,
    #[serde(default)]
    pub is_ant_expense: bool,
}

impl NewLineItem {
    pub fn total(&self) -> Decimal {
        self.amount * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    pub user_id: String,
    pub kind: EntryKind,
    pub amount: Decimal,
    pub description: String,
    pub date: NaiveDate,
    pub account_id: String,
    pub destination_account_id: Option<String>,
    pub category_id: Option<String>,
    pub wager_id: Option<String>,
    pub is_recurring: bool,
    pub is_ant_expense: bool,
    pub line_items: Vec<LineItem>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Entry {
    pub fn balance_effects(&self) -> Vec<(String, Decimal)> {
        balance_effects(
            self.kind,
            &self.account_id,
            self.destination_account_id.as_deref(),
            self.amount,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub id: Option<String>,
    pub user_id: String,
    pub kind: EntryKind,
    pub amount: Decimal,
    pub description: String,
    pub date: NaiveDate,
    pub account_id: String,
    pub destination_account_id: Option<String>,
    pub category_id: Option<String>,
    pub wager_id: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub is_ant_expense: bool,
    #[serde(default)]
    pub line_items: Vec<NewLineItem>,
}

impl NewEntry {
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate_entry_fields(
            self.kind,
            &self.account_id,
            self.destination_account_id.as_deref(),
            self.category_id.as_deref(),
            self.amount,
            &self.line_items,
        )
    }

    pub fn balance_effects(&self) -> Vec<(String, Decimal)> {
        balance_effects(
            self.kind,
            &self.account_id,
            self.destination_account_id.as_deref(),
            self.amount,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryUpdate {
    pub id: String,
    pub user_id: String,
    pub kind: EntryKind,
    pub amount: Decimal,
    pub description: String,
    pub date: NaiveDate,
    pub account_id: String,
    pub destination_account_id: Option<String>,
    pub category_id: Option<String>,
    #[serde(default)]
    pub is_ant_expense: bool,
    #[serde(default)]
    pub line_items: Vec<NewLineItem>,
}

impl EntryUpdate {
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate_entry_fields(
            self.kind,
            &self.account_id,
            self.destination_account_id.as_deref(),
            self.category_id.as_deref(),
            self.amount,
            &self.line_items,
        )
    }

    pub fn balance_effects(&self) -> Vec<(String, Decimal)> {
        balance_effects(
            self.kind,
            &self.account_id,
            self.destination_account_id.as_deref(),
            self.amount,
        )
    }
}

fn validate_entry_fields(
    kind: EntryKind,
    account_id: &str,
    destination_account_id: Option<&str>,
    category_id: Option<&str>,
    amount: Decimal,
    line_items: &[NewLineItem],
) -> Result<(), LedgerError> {
    match kind {
        EntryKind::Adjustment => {
            if amount.is_zero() {
                return Err(LedgerError::InvalidAmount(
                    "Adjustment amount must be non-zero".to_string(),
                ));
            }
        }
        _ => {
            if amount <= Decimal::ZERO {
                return Err(LedgerError::InvalidAmount(
                    "Amount must be greater than zero".to_string(),
                ));
            }
        }
    }

    match kind {
        EntryKind::Transfer => {
            let Some(dest) = destination_account_id else {
                return Err(LedgerError::InvalidDestination(
                    "Transfers require a destination account".to_string(),
                ));
            };
            if dest == account_id {
                return Err(LedgerError::InvalidDestination(
                    "Destination account must differ from the source account".to_string(),
                ));
            }
        }
        _ => {
            if destination_account_id.is_some() {
                return Err(LedgerError::InvalidDestination(format!(
                    "{} entries cannot have a destination account",
                    kind.as_str()
                )));
            }
        }
    }

    if matches!(kind, EntryKind::Transfer | EntryKind::Adjustment) && category_id.is_some() {
        return Err(LedgerError::CategoryMismatch(format!(
            "{} entries cannot carry a category",
            kind.as_str()
        )));
    }

    if !line_items.is_empty() {
        if kind != EntryKind::Expense {
            return Err(LedgerError::LineItemMismatch(
                "Only expense entries can carry line items".to_string(),
            ));
        }
        let mut total = Decimal::ZERO;
        for item in line_items {
            if item.name.trim().is_empty() {
                return Err(LedgerError::LineItemMismatch(
                    "Line item name cannot be empty".to_string(),
                ));
            }
            if item.amount <= Decimal::ZERO {
                return Err(LedgerError::LineItemMismatch(
                    "Line item amount must be greater than zero".to_string(),
                ));
            }
            if item.quantity < 1 {
                return Err(LedgerError::LineItemMismatch(
                    "Line item quantity must be at least 1".to_string(),
                ));
            }
            total += item.total();
        }
        if total != amount {
            return Err(LedgerError::LineItemMismatch(format!(
                "Line items total {total} does not match entry amount {amount}"
            )));
        }
    }

    Ok(())
}

#[derive(
    Debug,
    Clone,
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
)]
#[diesel(table_name = crate::schema::entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct EntryDB {
    pub id: String,
    pub user_id: String,
    pub entry_type: String,
    pub amount: String,
    pub description: String,
    pub date: String,
    pub account_id: String,
    pub destination_account_id: Option<String>,
    pub category_id: Option<String>,
    pub wager_id: Option<String>,
    pub is_recurring: bool,
    pub is_ant_expense: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(
    Debug,
    Clone,
    Queryable,
    Identifiable,
    Insertable,
    Associations,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
)]
#[diesel(belongs_to(EntryDB, foreign_key = entry_id))]
#[diesel(table_name = crate::schema::entry_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EntryItemDB {
    pub id: String,
    pub entry_id: String,
    pub name: String,
    pub amount: String,
    pub quantity: i32,
    pub category_id: Option<String>,
    pub is_ant_expense: bool,
    pub created_at: NaiveDateTime,
}

impl From<EntryItemDB> for LineItem {
    fn from(item: EntryItemDB) -> Self {
        let amount = parse_decimal_tolerant(&item.amount, "entry_items.amount");
        LineItem {
            id: item.id,
            entry_id: item.entry_id,
            name: item.name,
            amount,
            quantity: item.quantity,
            category_id: item.category_id,
            is_ant_expense: item.is_ant_expense,
        }
    }
}

impl From<(EntryDB, Vec<EntryItemDB>)> for Entry {
    fn from((entry, items): (EntryDB, Vec<EntryItemDB>)) -> Self {
        let kind = EntryKind::from_str(&entry.entry_type).unwrap_or_else(|_| {
            log::error!(
                "Unknown entry kind '{}' for entry {}",
                entry.entry_type,
                entry.id
            );
            EntryKind::Expense
        });
        Entry {
            kind,
            amount: parse_decimal_tolerant(&entry.amount, "entries.amount"),
            date: parse_date_tolerant(&entry.date, "entries.date"),
            id: entry.id,
            user_id: entry.user_id,
            description: entry.description,
            account_id: entry.account_id,
            destination_account_id: entry.destination_account_id,
            category_id: entry.category_id,
            wager_id: entry.wager_id,
            is_recurring: entry.is_recurring,
            is_ant_expense: entry.is_ant_expense,
            line_items: items.into_iter().map(LineItem::from).collect(),
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}

impl From<NewEntry> for EntryDB {
    fn from(entry: NewEntry) -> Self {
        let now = chrono::Utc::now().naive_utc();
        EntryDB {
            id: entry
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            user_id: entry.user_id,
            entry_type: entry.kind.as_str().to_string(),
            amount: entry.amount.to_string(),
            description: entry.description,
            date: format_date(entry.date),
            account_id: entry.account_id,
            destination_account_id: entry.destination_account_id,
            category_id: entry.category_id,
            wager_id: entry.wager_id,
            is_recurring: entry.is_recurring,
            is_ant_expense: entry.is_ant_expense,
            created_at: now,
            updated_at: now,
        }
    }
}

impl NewLineItem {
    pub fn into_db(self, entry_id: &str) -> EntryItemDB {
        EntryItemDB {
            id: uuid::Uuid::new_v4().to_string(),
            entry_id: entry_id.to_string(),
            name: self.name,
            amount: self.amount.to_string(),
            quantity: self.quantity,
            category_id: self.category_id,
            is_ant_expense: self.is_ant_expense,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
