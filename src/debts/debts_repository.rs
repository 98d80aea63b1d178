use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::db::get_connection;
use crate::errors::{DatabaseError, Error, Result};
use crate::schema::{debt_payments, debts};
use crate::utils::format_date;

use super::debts_model::{
    Debt, DebtDB, DebtPayment, DebtPaymentDB, DebtUpdate, NewDebt, NewDebtPayment,
};
use super::debts_traits::DebtRepositoryTrait;

/// Repository for managing debt and payment data in the database
pub struct DebtRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl DebtRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    fn load_debt(debt_id: &str, conn: &mut SqliteConnection) -> Result<Debt> {
        let debt = debts::table
            .select(DebtDB::as_select())
            .find(debt_id)
            .first::<DebtDB>(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => Error::Database(DatabaseError::NotFound(
                    format!("Debt {} not found", debt_id),
                )),
                other => other.into(),
            })?;
        Ok(debt.into())
    }
}

impl DebtRepositoryTrait for DebtRepository {
    fn create(&self, new_debt: NewDebt) -> Result<Debt> {
        let debt_db: DebtDB = new_debt.into();

        let mut conn = get_connection(&self.pool)?;
        diesel::insert_into(debts::table)
            .values(&debt_db)
            .execute(&mut conn)?;

        Ok(debt_db.into())
    }

    fn update(&self, debt_update: DebtUpdate) -> Result<Debt> {
        let mut conn = get_connection(&self.pool)?;

        let mut existing = debts::table
            .select(DebtDB::as_select())
            .find(&debt_update.id)
            .first::<DebtDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => Error::Database(DatabaseError::NotFound(
                    format!("Debt {} not found", debt_update.id),
                )),
                other => other.into(),
            })?;

        existing.name = debt_update.name;
        existing.total_amount = debt_update.total_amount.to_string();
        existing.start_date = format_date(debt_update.start_date);
        existing.due_date = debt_update.due_date.map(format_date);
        existing.updated_at = chrono::Utc::now().naive_utc();

        // A changed total can flip the derived paid flag.
        let debt: Debt = existing.clone().into();
        existing.is_paid = debt.paid_amount >= debt.total_amount;

        diesel::update(debts::table.find(&existing.id))
            .set(&existing)
            .execute(&mut conn)?;

        Ok(existing.into())
    }

    fn delete(&self, debt_id: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        diesel::delete(debts::table.find(debt_id)).execute(&mut conn)?;
        Ok(())
    }

    fn get_by_id(&self, debt_id: &str) -> Result<Debt> {
        let mut conn = get_connection(&self.pool)?;
        Self::load_debt(debt_id, &mut conn)
    }

    fn list(&self, user_id: &str) -> Result<Vec<Debt>> {
        let mut conn = get_connection(&self.pool)?;

        let results = debts::table
            .filter(debts::user_id.eq(user_id))
            .select(DebtDB::as_select())
            .order((debts::is_paid.asc(), debts::start_date.desc()))
            .load::<DebtDB>(&mut conn)?;

        Ok(results.into_iter().map(Debt::from).collect())
    }

    fn get_payments(&self, debt_id: &str) -> Result<Vec<DebtPayment>> {
        let mut conn = get_connection(&self.pool)?;

        let results = debt_payments::table
            .filter(debt_payments::debt_id.eq(debt_id))
            .select(DebtPaymentDB::as_select())
            .order(debt_payments::payment_date.asc())
            .load::<DebtPaymentDB>(&mut conn)?;

        Ok(results.into_iter().map(DebtPayment::from).collect())
    }

    fn get_payment_by_id(&self, payment_id: &str) -> Result<DebtPayment> {
        let mut conn = get_connection(&self.pool)?;

        let payment = debt_payments::table
            .select(DebtPaymentDB::as_select())
            .find(payment_id)
            .first::<DebtPaymentDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => Error::Database(DatabaseError::NotFound(
                    format!("Payment {} not found", payment_id),
                )),
                other => other.into(),
            })?;

        Ok(payment.into())
    }

    fn get_debt_in_transaction(&self, debt_id: &str, conn: &mut SqliteConnection) -> Result<Debt> {
        Self::load_debt(debt_id, conn)
    }

    fn create_payment_in_transaction(
        &self,
        new_payment: NewDebtPayment,
        conn: &mut SqliteConnection,
    ) -> Result<DebtPayment> {
        let payment_db = DebtPaymentDB {
            id: uuid::Uuid::new_v4().to_string(),
            debt_id: new_payment.debt_id,
            amount: new_payment.amount.to_string(),
            payment_date: format_date(new_payment.payment_date),
            created_at: chrono::Utc::now().naive_utc(),
        };

        diesel::insert_into(debt_payments::table)
            .values(&payment_db)
            .execute(conn)?;

        Ok(payment_db.into())
    }

    fn delete_payment_in_transaction(
        &self,
        payment_id: &str,
        conn: &mut SqliteConnection,
    ) -> Result<DebtPayment> {
        let payment = debt_payments::table
            .select(DebtPaymentDB::as_select())
            .find(payment_id)
            .first::<DebtPaymentDB>(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => Error::Database(DatabaseError::NotFound(
                    format!("Payment {} not found", payment_id),
                )),
                other => other.into(),
            })?;

        diesel::delete(debt_payments::table.find(payment_id)).execute(conn)?;

        Ok(payment.into())
    }

    fn set_progress_in_transaction(
        &self,
        debt_id: &str,
        paid_amount: Decimal,
        is_paid: bool,
        conn: &mut SqliteConnection,
    ) -> Result<()> {
        diesel::update(debts::table.find(debt_id))
            .set((
                debts::paid_amount.eq(paid_amount.to_string()),
                debts::is_paid.eq(is_paid),
                debts::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(conn)?;
        Ok(())
    }
}
