use log::debug;
use std::sync::Arc;

use crate::db::DbTransactionExecutor;
use crate::errors::{DatabaseError, Error, Result};

use super::debts_model::{Debt, DebtPayment, DebtUpdate, NewDebt, NewDebtPayment};
use super::debts_traits::{DebtRepositoryTrait, DebtServiceTrait};

/// Service maintaining the payment accumulator on debts.
///
/// The accumulator never touches account balances: recording a payment only
/// moves the debt's own paid/total state machine.
pub struct DebtService<E: DbTransactionExecutor> {
    repository: Arc<dyn DebtRepositoryTrait>,
    executor: E,
}

impl<E: DbTransactionExecutor> DebtService<E> {
    pub fn new(repository: Arc<dyn DebtRepositoryTrait>, executor: E) -> Self {
        Self {
            repository,
            executor,
        }
    }

    fn get_owned(&self, user_id: &str, debt_id: &str) -> Result<Debt> {
        let debt = self.repository.get_by_id(debt_id)?;
        if debt.user_id != user_id {
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "Debt {} not found for user {}",
                debt_id, user_id
            ))));
        }
        Ok(debt)
    }
}

#[async_trait::async_trait]
impl<E: DbTransactionExecutor + Send + Sync> DebtServiceTrait for DebtService<E> {
    fn get_debt(&self, debt_id: &str) -> Result<Debt> {
        self.repository.get_by_id(debt_id)
    }

    fn list_debts(&self, user_id: &str) -> Result<Vec<Debt>> {
        self.repository.list(user_id)
    }

    fn get_payments(&self, debt_id: &str) -> Result<Vec<DebtPayment>> {
        self.repository.get_payments(debt_id)
    }

    async fn create_debt(&self, new_debt: NewDebt) -> Result<Debt> {
        new_debt.validate()?;
        debug!(
            "Creating debt '{}' of {} for user {}",
            new_debt.name, new_debt.total_amount, new_debt.user_id
        );
        self.repository.create(new_debt)
    }

    async fn update_debt(&self, debt_update: DebtUpdate) -> Result<Debt> {
        debt_update.validate()?;
        self.get_owned(&debt_update.user_id, &debt_update.id)?;
        self.repository.update(debt_update)
    }

    async fn delete_debt(&self, user_id: &str, debt_id: &str) -> Result<()> {
        self.get_owned(user_id, debt_id)?;
        // Payments cascade via the FK.
        self.repository.delete(debt_id)
    }

    async fn record_payment(&self, user_id: &str, new_payment: NewDebtPayment) -> Result<Debt> {
        new_payment.validate()?;
        self.get_owned(user_id, &new_payment.debt_id)?;

        debug!(
            "Recording payment of {} on debt {}",
            new_payment.amount, new_payment.debt_id
        );

        let repository = Arc::clone(&self.repository);
        self.executor.execute(move |conn| {
            let debt = repository.get_debt_in_transaction(&new_payment.debt_id, conn)?;
            let payment = repository.create_payment_in_transaction(new_payment, conn)?;

            let paid = debt.paid_amount + payment.amount;
            repository.set_progress_in_transaction(
                &debt.id,
                paid,
                paid >= debt.total_amount,
                conn,
            )?;

            repository.get_debt_in_transaction(&debt.id, conn)
        })
    }

    async fn remove_payment(&self, user_id: &str, payment_id: &str) -> Result<Debt> {
        let payment = self.repository.get_payment_by_id(payment_id)?;
        self.get_owned(user_id, &payment.debt_id)?;

        debug!(
            "Removing payment {} from debt {}",
            payment_id, payment.debt_id
        );

        let repository = Arc::clone(&self.repository);
        let payment_id = payment_id.to_string();
        self.executor.execute(move |conn| {
            let removed = repository.delete_payment_in_transaction(&payment_id, conn)?;
            let debt = repository.get_debt_in_transaction(&removed.debt_id, conn)?;

            let paid = debt.paid_amount - removed.amount;
            repository.set_progress_in_transaction(
                &debt.id,
                paid,
                paid >= debt.total_amount,
                conn,
            )?;

            repository.get_debt_in_transaction(&debt.id, conn)
        })
    }
}
