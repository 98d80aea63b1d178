use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::accounts::AccountRepositoryTrait;
use crate::categories::{CategoryKind, CategoryRepositoryTrait, CategoryScope};
use crate::db::DbTransactionExecutor;
use crate::errors::{Error, Result};

use super::ledger_model::{
    merge_deltas, reverse_effects, Entry, EntryKind, EntryUpdate, NewEntry, NewLineItem,
};
use super::ledger_traits::{LedgerRepositoryTrait, LedgerServiceTrait};
use super::LedgerError;

/// Service orchestrating ledger mutations.
///
/// Every mutation runs as a single write transaction pairing the entry row
/// change with the net balance deltas it implies, so account balances and
/// the entry set can never drift apart.
pub struct LedgerService<E: DbTransactionExecutor> {
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    account_repository: Arc<dyn AccountRepositoryTrait>,
    category_repository: Arc<dyn CategoryRepositoryTrait>,
    executor: E,
}

impl<E: DbTransactionExecutor> LedgerService<E> {
    pub fn new(
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        account_repository: Arc<dyn AccountRepositoryTrait>,
        category_repository: Arc<dyn CategoryRepositoryTrait>,
        executor: E,
    ) -> Self {
        Self {
            ledger_repository,
            account_repository,
            category_repository,
            executor,
        }
    }

    fn check_account_ownership(&self, account_id: &str, user_id: &str) -> Result<()> {
        let account = self.account_repository.get_by_id(account_id)?;
        if account.user_id != user_id {
            return Err(LedgerError::NotFound(format!(
                "Account {} not found for user {}",
                account_id, user_id
            ))
            .into());
        }
        Ok(())
    }

    fn check_category(
        &self,
        category_id: Option<&str>,
        expected_kind: CategoryKind,
        user_id: &str,
    ) -> Result<()> {
        let Some(category_id) = category_id else {
            return Ok(());
        };
        let category = self.category_repository.get_by_id(category_id)?;
        let scope = CategoryScope::new(user_id);
        if !scope.visible(&category) {
            return Err(LedgerError::CategoryNotVisible(format!(
                "Category {} is not visible to user {}",
                category_id, user_id
            ))
            .into());
        }
        if category.kind != expected_kind {
            return Err(LedgerError::CategoryMismatch(format!(
                "Category {} is a {} category",
                category_id,
                category.kind.as_str()
            ))
            .into());
        }
        Ok(())
    }

    fn check_references(
        &self,
        kind: EntryKind,
        user_id: &str,
        account_id: &str,
        destination_account_id: Option<&str>,
        category_id: Option<&str>,
        line_items: &[NewLineItem],
    ) -> Result<()> {
        self.check_account_ownership(account_id, user_id)?;
        if let Some(dest) = destination_account_id {
            self.check_account_ownership(dest, user_id)?;
        }

        match kind {
            EntryKind::Income => self.check_category(category_id, CategoryKind::Income, user_id)?,
            EntryKind::Expense => {
                self.check_category(category_id, CategoryKind::Expense, user_id)?
            }
            // Validation already rejects categories on these kinds.
            EntryKind::Transfer | EntryKind::Adjustment => {}
        }

        for item in line_items {
            self.check_category(item.category_id.as_deref(), CategoryKind::Expense, user_id)?;
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl<E: DbTransactionExecutor + Send + Sync> LedgerServiceTrait for LedgerService<E> {
    fn get_entry(&self, entry_id: &str) -> Result<Entry> {
        self.ledger_repository.get_entry(entry_id)
    }

    fn get_entries_in_range(
        &self,
        user_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Entry>> {
        self.ledger_repository
            .get_entries_in_range(user_id, start_date, end_date)
    }

    fn get_entries_for_wager(&self, wager_id: &str) -> Result<Vec<Entry>> {
        self.ledger_repository.get_entries_for_wager(wager_id)
    }

    async fn create_entry(&self, new_entry: NewEntry) -> Result<Entry> {
        new_entry.validate()?;
        self.check_references(
            new_entry.kind,
            &new_entry.user_id,
            &new_entry.account_id,
            new_entry.destination_account_id.as_deref(),
            new_entry.category_id.as_deref(),
            &new_entry.line_items,
        )?;

        debug!(
            "Creating {} entry of {} on account {}",
            new_entry.kind.as_str(),
            new_entry.amount,
            new_entry.account_id
        );

        let ledger_repository = Arc::clone(&self.ledger_repository);
        let account_repository = Arc::clone(&self.account_repository);

        self.executor.execute(move |conn| {
            let entry = ledger_repository.create_in_transaction(new_entry, conn)?;
            let deltas = merge_deltas(entry.balance_effects());
            account_repository.apply_balance_deltas_in_transaction(&deltas, conn)?;
            Ok::<_, Error>(entry)
        })
    }

    async fn update_entry(&self, entry_update: EntryUpdate) -> Result<Entry> {
        entry_update.validate()?;
        self.check_references(
            entry_update.kind,
            &entry_update.user_id,
            &entry_update.account_id,
            entry_update.destination_account_id.as_deref(),
            entry_update.category_id.as_deref(),
            &entry_update.line_items,
        )?;

        let ledger_repository = Arc::clone(&self.ledger_repository);
        let account_repository = Arc::clone(&self.account_repository);

        self.executor.execute(move |conn| {
            let existing = ledger_repository.get_entry_in_transaction(&entry_update.id, conn)?;
            if existing.user_id != entry_update.user_id {
                return Err(LedgerError::NotFound(format!(
                    "Entry {} not found for user {}",
                    entry_update.id, entry_update.user_id
                ))
                .into());
            }
            if existing.wager_id.is_some() {
                return Err(LedgerError::WagerManaged(format!(
                    "Entry {} is managed by its wager",
                    entry_update.id
                ))
                .into());
            }

            let mut effects = reverse_effects(&existing.balance_effects());
            effects.extend(entry_update.balance_effects());
            let deltas = merge_deltas(effects);

            let updated = ledger_repository.update_in_transaction(entry_update, conn)?;
            account_repository.apply_balance_deltas_in_transaction(&deltas, conn)?;
            Ok::<_, Error>(updated)
        })
    }

    async fn delete_entry(&self, user_id: &str, entry_id: &str) -> Result<Entry> {
        debug!("Deleting entry {}", entry_id);

        let ledger_repository = Arc::clone(&self.ledger_repository);
        let account_repository = Arc::clone(&self.account_repository);
        let user_id = user_id.to_string();
        let entry_id = entry_id.to_string();

        self.executor.execute(move |conn| {
            let existing = ledger_repository.get_entry_in_transaction(&entry_id, conn)?;
            if existing.user_id != user_id {
                return Err(LedgerError::NotFound(format!(
                    "Entry {} not found for user {}",
                    entry_id, user_id
                ))
                .into());
            }
            let deltas = merge_deltas(reverse_effects(&existing.balance_effects()));

            let deleted = ledger_repository.delete_in_transaction(&entry_id, conn)?;
            account_repository.apply_balance_deltas_in_transaction(&deltas, conn)?;
            Ok::<_, Error>(deleted)
        })
    }

    async fn reconcile_balance(
        &self,
        user_id: &str,
        account_id: &str,
        target_balance: Decimal,
    ) -> Result<Option<Entry>> {
        let account = self.account_repository.get_by_id(account_id)?;
        if account.user_id != user_id {
            return Err(LedgerError::NotFound(format!(
                "Account {} not found for user {}",
                account_id, user_id
            ))
            .into());
        }

        let delta = target_balance - account.balance;
        if delta.is_zero() {
            return Ok(None);
        }

        debug!(
            "Reconciling account {} from {} to {}",
            account_id, account.balance, target_balance
        );

        let adjustment = NewEntry {
            id: None,
            user_id: user_id.to_string(),
            kind: EntryKind::Adjustment,
            amount: delta,
            description: "Balance adjustment".to_string(),
            date: chrono::Utc::now().date_naive(),
            account_id: account_id.to_string(),
            destination_account_id: None,
            category_id: None,
            wager_id: None,
            is_recurring: false,
            is_ant_expense: false,
            line_items: vec![],
        };

        self.create_entry(adjustment).await.map(Some)
    }
}
