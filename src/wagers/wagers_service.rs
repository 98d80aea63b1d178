use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::accounts::AccountRepositoryTrait;
use crate::errors::{DatabaseError, Error, Result};
use crate::ledger::LedgerServiceTrait;

use super::wagers_model::{NewWager, Wager, WagerResult, WagerUpdate};
use super::wagers_traits::{WagerRepositoryTrait, WagerServiceTrait};

/// Service keeping wagers and their generated ledger entries in sync.
///
/// Regeneration is delete-then-create through the ledger service, so the
/// reverse and apply halves each run under the ledger's own transaction.
pub struct WagerService {
    repository: Arc<dyn WagerRepositoryTrait>,
    account_repository: Arc<dyn AccountRepositoryTrait>,
    ledger_service: Arc<dyn LedgerServiceTrait>,
}

impl WagerService {
    pub fn new(
        repository: Arc<dyn WagerRepositoryTrait>,
        account_repository: Arc<dyn AccountRepositoryTrait>,
        ledger_service: Arc<dyn LedgerServiceTrait>,
    ) -> Self {
        Self {
            repository,
            account_repository,
            ledger_service,
        }
    }

    // The account reference is checked before the wager row is written, so a
    // rejected wager leaves no row behind.
    fn check_account(&self, user_id: &str, account_id: &str) -> Result<()> {
        let account = self.account_repository.get_by_id(account_id)?;
        if account.user_id != user_id {
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "Account {} not found for user {}",
                account_id, user_id
            ))));
        }
        Ok(())
    }

    fn get_owned(&self, user_id: &str, wager_id: &str) -> Result<Wager> {
        let wager = self.repository.get_by_id(wager_id)?;
        if wager.user_id != user_id {
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "Wager {} not found for user {}",
                wager_id, user_id
            ))));
        }
        Ok(wager)
    }

    async fn remove_generated_entries(&self, wager_id: &str) -> Result<()> {
        for entry in self.ledger_service.get_entries_for_wager(wager_id)? {
            self.ledger_service
                .delete_entry(&entry.user_id, &entry.id)
                .await?;
        }
        Ok(())
    }

    async fn regenerate_entry(&self, wager: &Wager) -> Result<()> {
        self.remove_generated_entries(&wager.id).await?;
        self.ledger_service
            .create_entry(wager.generated_entry())
            .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl WagerServiceTrait for WagerService {
    fn get_wager(&self, wager_id: &str) -> Result<Wager> {
        self.repository.get_by_id(wager_id)
    }

    fn list_wagers(&self, user_id: &str) -> Result<Vec<Wager>> {
        self.repository.list(user_id)
    }

    async fn create_wager(&self, new_wager: NewWager) -> Result<Wager> {
        new_wager.validate()?;
        self.check_account(&new_wager.user_id, &new_wager.account_id)?;

        debug!(
            "Creating wager '{}' with stake {} for user {}",
            new_wager.event_name, new_wager.stake, new_wager.user_id
        );

        let wager = self.repository.create(new_wager)?;
        self.regenerate_entry(&wager).await?;
        Ok(wager)
    }

    async fn update_wager(&self, wager_update: WagerUpdate) -> Result<Wager> {
        wager_update.validate()?;
        self.get_owned(&wager_update.user_id, &wager_update.id)?;
        self.check_account(&wager_update.user_id, &wager_update.account_id)?;

        let wager = self.repository.update(wager_update)?;
        self.regenerate_entry(&wager).await?;
        Ok(wager)
    }

    async fn set_wager_result(
        &self,
        user_id: &str,
        wager_id: &str,
        result: WagerResult,
        payout: Option<Decimal>,
    ) -> Result<Wager> {
        let wager = self.get_owned(user_id, wager_id)?;

        let update = WagerUpdate {
            id: wager.id,
            user_id: wager.user_id,
            event_name: wager.event_name,
            stake: wager.stake,
            payout: payout.unwrap_or(wager.payout),
            result,
            account_id: wager.account_id,
            date: wager.date,
            notes: wager.notes,
        };

        debug!("Resolving wager {} as {}", wager_id, result.as_str());
        self.update_wager(update).await
    }

    async fn delete_wager(&self, user_id: &str, wager_id: &str) -> Result<()> {
        self.get_owned(user_id, wager_id)?;

        self.remove_generated_entries(wager_id).await?;
        self.repository.delete(wager_id)
    }
}
