use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;

use super::debts_model::{Debt, DebtPayment, DebtUpdate, NewDebt, NewDebtPayment};
use crate::Result;

/// Trait defining the contract for debt repository operations.
pub trait DebtRepositoryTrait: Send + Sync {
    fn create(&self, new_debt: NewDebt) -> Result<Debt>;
    fn update(&self, debt_update: DebtUpdate) -> Result<Debt>;
    fn delete(&self, debt_id: &str) -> Result<()>;
    fn get_by_id(&self, debt_id: &str) -> Result<Debt>;
    fn list(&self, user_id: &str) -> Result<Vec<Debt>>;
    fn get_payments(&self, debt_id: &str) -> Result<Vec<DebtPayment>>;
    fn get_payment_by_id(&self, payment_id: &str) -> Result<DebtPayment>;

    fn get_debt_in_transaction(&self, debt_id: &str, conn: &mut SqliteConnection) -> Result<Debt>;
    fn create_payment_in_transaction(
        &self,
        new_payment: NewDebtPayment,
        conn: &mut SqliteConnection,
    ) -> Result<DebtPayment>;
    fn delete_payment_in_transaction(
        &self,
        payment_id: &str,
        conn: &mut SqliteConnection,
    ) -> Result<DebtPayment>;

    /// Writes the derived accumulator fields on a debt row.
    fn set_progress_in_transaction(
        &self,
        debt_id: &str,
        paid_amount: Decimal,
        is_paid: bool,
        conn: &mut SqliteConnection,
    ) -> Result<()>;
}

/// Trait defining the contract for debt service operations.
#[async_trait::async_trait]
pub trait DebtServiceTrait: Send + Sync {
    fn get_debt(&self, debt_id: &str) -> Result<Debt>;
    fn list_debts(&self, user_id: &str) -> Result<Vec<Debt>>;
    fn get_payments(&self, debt_id: &str) -> Result<Vec<DebtPayment>>;

    async fn create_debt(&self, new_debt: NewDebt) -> Result<Debt>;
    async fn update_debt(&self, debt_update: DebtUpdate) -> Result<Debt>;
    async fn delete_debt(&self, user_id: &str, debt_id: &str) -> Result<()>;

    async fn record_payment(&self, user_id: &str, new_payment: NewDebtPayment) -> Result<Debt>;
    async fn remove_payment(&self, user_id: &str, payment_id: &str) -> Result<Debt>;
}
