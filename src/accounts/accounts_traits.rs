use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;

use super::accounts_model::{Account, AccountUpdate, NewAccount};
use crate::Result;

/// Trait defining the contract for account repository operations.
pub trait AccountRepositoryTrait: Send + Sync {
    fn create(&self, new_account: NewAccount) -> Result<Account>;
    fn update(&self, account_update: AccountUpdate) -> Result<Account>;
    fn get_by_id(&self, account_id: &str) -> Result<Account>;
    fn list(
        &self,
        user_id: &str,
        is_active_filter: Option<bool>,
        account_ids: Option<&[String]>,
    ) -> Result<Vec<Account>>;

    /// Applies signed balance deltas to the given accounts inside an open
    /// transaction. Deltas must already be in ascending account-id order;
    /// a missing account fails the whole transaction.
    fn apply_balance_deltas_in_transaction(
        &self,
        deltas: &[(String, Decimal)],
        conn: &mut SqliteConnection,
    ) -> Result<()>;
}

/// Trait defining the contract for account service operations.
#[async_trait::async_trait]
pub trait AccountServiceTrait: Send + Sync {
    async fn create_account(&self, new_account: NewAccount) -> Result<Account>;
    async fn update_account(&self, account_update: AccountUpdate) -> Result<Account>;
    fn get_account(&self, account_id: &str) -> Result<Account>;
    fn list_accounts(
        &self,
        user_id: &str,
        is_active_filter: Option<bool>,
        account_ids: Option<&[String]>,
    ) -> Result<Vec<Account>>;
    fn get_active_accounts(&self, user_id: &str) -> Result<Vec<Account>>;
}
