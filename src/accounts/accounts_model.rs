//! Account domain and database models.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};
use crate::utils::parse_decimal_tolerant;

/// Domain model representing an account.
///
/// The balance is a derived quantity: it always equals the cumulative effect
/// of every ledger entry currently referencing the account. Only the ledger
/// mutator writes it.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub account_type: String,
    pub balance: Decimal,
    pub currency: String,
    pub include_in_total: bool,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new account.
///
/// Accounts open with a zero balance; a non-zero opening balance is
/// materialized through the balance-reconciliation workflow so the
/// balance/entries invariant holds from day one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub account_type: String,
    pub currency: String,
    pub include_in_total: bool,
    pub is_active: bool,
}

impl NewAccount {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Account name cannot be empty".to_string(),
            )));
        }
        if self.currency.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Currency cannot be empty".to_string(),
            )));
        }
        Ok(())
    }
}

/// Input model for updating account metadata. The balance is intentionally
/// absent: it is never writable from the outside.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    pub id: Option<String>,
    pub name: String,
    pub account_type: String,
    pub include_in_total: bool,
    pub is_active: bool,
}

impl AccountUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.id.is_none() {
            return Err(Error::Validation(ValidationError::MissingField(
                "id".to_string(),
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Account name cannot be empty".to_string(),
            )));
        }
        Ok(())
    }
}

/// Database model for accounts
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone, Default,
)]
#[diesel(table_name = crate::schema::accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub account_type: String,
    pub balance: String,
    pub currency: String,
    pub include_in_total: bool,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<AccountDB> for Account {
    fn from(db: AccountDB) -> Self {
        Account {
            balance: parse_decimal_tolerant(&db.balance, "account.balance"),
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            account_type: db.account_type,
            currency: db.currency,
            include_in_total: db.include_in_total,
            is_active: db.is_active,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewAccount> for AccountDB {
    fn from(new_account: NewAccount) -> Self {
        let now = chrono::Utc::now().naive_utc();
        AccountDB {
            id: new_account.id.unwrap_or_default(),
            user_id: new_account.user_id,
            name: new_account.name,
            account_type: new_account.account_type,
            balance: Decimal::ZERO.to_string(),
            currency: new_account.currency,
            include_in_total: new_account.include_in_total,
            is_active: new_account.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}
