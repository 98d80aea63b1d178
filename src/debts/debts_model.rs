use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};
use crate::utils::{format_date, parse_date_tolerant, parse_decimal_tolerant};

/// Domain model for a debt. `paid_amount` and `is_paid` are derived from the
/// payment collection and only written by the payment accumulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debt {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub is_paid: bool,
    pub start_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Debt {
    pub fn remaining_amount(&self) -> Decimal {
        (self.total_amount - self.paid_amount).max(Decimal::ZERO)
    }

    /// Progress as a percentage of the total, rounded to one decimal place.
    pub fn progress_percentage(&self) -> Decimal {
        if self.total_amount.is_zero() {
            return Decimal::ZERO;
        }
        (self.paid_amount / self.total_amount * Decimal::ONE_HUNDRED).round_dp(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DebtPayment {
    pub id: String,
    pub debt_id: String,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDebt {
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub total_amount: Decimal,
    pub start_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
}

impl NewDebt {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Debt name cannot be empty".to_string(),
            )));
        }
        if self.total_amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Total amount must be greater than zero".to_string(),
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtUpdate {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub total_amount: Decimal,
    pub start_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
}

impl DebtUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Debt name cannot be empty".to_string(),
            )));
        }
        if self.total_amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Total amount must be greater than zero".to_string(),
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDebtPayment {
    pub debt_id: String,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
}

impl NewDebtPayment {
    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Payment amount must be greater than zero".to_string(),
            )));
        }
        Ok(())
    }
}

/// Database model for debts
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::debts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct DebtDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub total_amount: String,
    pub paid_amount: String,
    pub is_paid: bool,
    pub start_date: String,
    pub due_date: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for debt payments
#[derive(Queryable, Identifiable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::debt_payments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DebtPaymentDB {
    pub id: String,
    pub debt_id: String,
    pub amount: String,
    pub payment_date: String,
    pub created_at: NaiveDateTime,
}

impl From<DebtDB> for Debt {
    fn from(db: DebtDB) -> Self {
        Debt {
            total_amount: parse_decimal_tolerant(&db.total_amount, "debts.total_amount"),
            paid_amount: parse_decimal_tolerant(&db.paid_amount, "debts.paid_amount"),
            start_date: parse_date_tolerant(&db.start_date, "debts.start_date"),
            due_date: db
                .due_date
                .as_deref()
                .map(|d| parse_date_tolerant(d, "debts.due_date")),
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            is_paid: db.is_paid,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewDebt> for DebtDB {
    fn from(debt: NewDebt) -> Self {
        let now = chrono::Utc::now().naive_utc();
        DebtDB {
            id: debt
                .id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            user_id: debt.user_id,
            name: debt.name,
            total_amount: debt.total_amount.to_string(),
            paid_amount: Decimal::ZERO.to_string(),
            is_paid: false,
            start_date: format_date(debt.start_date),
            due_date: debt.due_date.map(format_date),
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<DebtPaymentDB> for DebtPayment {
    fn from(db: DebtPaymentDB) -> Self {
        DebtPayment {
            amount: parse_decimal_tolerant(&db.amount, "debt_payments.amount"),
            payment_date: parse_date_tolerant(&db.payment_date, "debt_payments.payment_date"),
            id: db.id,
            debt_id: db.debt_id,
            created_at: db.created_at,
        }
    }
}
