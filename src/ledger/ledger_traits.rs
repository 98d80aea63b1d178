use chrono::NaiveDate;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;

use super::ledger_model::{Entry, EntryUpdate, NewEntry};
use crate::Result;

/// Trait defining the contract for ledger repository operations.
///
/// Mutations only exist as `*_in_transaction` variants: the service pairs
/// every row change with the matching account-balance deltas inside one
/// transaction, so the repository never opens its own.
pub trait LedgerRepositoryTrait: Send + Sync {
    fn get_entry(&self, entry_id: &str) -> Result<Entry>;
    fn get_entries_in_range(
        &self,
        user_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Entry>>;
    fn get_entries_for_wager(&self, wager_id: &str) -> Result<Vec<Entry>>;

    fn get_entry_in_transaction(
        &self,
        entry_id: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Entry>;
    fn create_in_transaction(
        &self,
        new_entry: NewEntry,
        conn: &mut SqliteConnection,
    ) -> Result<Entry>;
    fn update_in_transaction(
        &self,
        entry_update: EntryUpdate,
        conn: &mut SqliteConnection,
    ) -> Result<Entry>;
    fn delete_in_transaction(&self, entry_id: &str, conn: &mut SqliteConnection) -> Result<Entry>;
}

/// Trait defining the contract for ledger service operations.
#[async_trait::async_trait]
pub trait LedgerServiceTrait: Send + Sync {
    fn get_entry(&self, entry_id: &str) -> Result<Entry>;
    fn get_entries_in_range(
        &self,
        user_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Entry>>;
    fn get_entries_for_wager(&self, wager_id: &str) -> Result<Vec<Entry>>;

    async fn create_entry(&self, new_entry: NewEntry) -> Result<Entry>;
    async fn update_entry(&self, entry_update: EntryUpdate) -> Result<Entry>;
    async fn delete_entry(&self, user_id: &str, entry_id: &str) -> Result<Entry>;

    /// Brings an account balance to `target_balance` by recording an
    /// adjustment entry for the difference. Returns `None` when the balance
    /// already matches.
    async fn reconcile_balance(
        &self,
        user_id: &str,
        account_id: &str,
        target_balance: Decimal,
    ) -> Result<Option<Entry>>;
}
