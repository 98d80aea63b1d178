use chrono::NaiveDate;
use log::{debug, error};
use std::sync::Arc;

use crate::accounts::AccountRepositoryTrait;
use crate::categories::{CategoryKind, CategoryRepositoryTrait, CategoryScope};
use crate::db::DbTransactionExecutor;
use crate::errors::{DatabaseError, Error, Result};
use crate::ledger::{merge_deltas, EntryKind, LedgerError, LedgerRepositoryTrait};

use super::recurring_model::{NewRecurringTemplate, RecurringTemplate};
use super::recurring_traits::{RecurringRepositoryTrait, RecurringServiceTrait};

/// Scheduler that materializes due recurring templates into ledger entries.
///
/// Each occurrence is one transaction: entry insert, balance deltas, and the
/// next-occurrence advancement commit together, so a crashed run re-attempts
/// at most the occurrence in flight and never duplicates one.
pub struct RecurringService<E: DbTransactionExecutor> {
    repository: Arc<dyn RecurringRepositoryTrait>,
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    account_repository: Arc<dyn AccountRepositoryTrait>,
    category_repository: Arc<dyn CategoryRepositoryTrait>,
    executor: E,
}

impl<E: DbTransactionExecutor> RecurringService<E> {
    pub fn new(
        repository: Arc<dyn RecurringRepositoryTrait>,
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        account_repository: Arc<dyn AccountRepositoryTrait>,
        category_repository: Arc<dyn CategoryRepositoryTrait>,
        executor: E,
    ) -> Self {
        Self {
            repository,
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

    /// Materialized entries obey the same reference rules as direct entry
    /// creation: owned accounts, visible categories, matching category kind.
    fn check_references(
        &self,
        kind: EntryKind,
        user_id: &str,
        account_id: &str,
        destination_account_id: Option<&str>,
        category_id: Option<&str>,
    ) -> Result<()> {
        self.check_account_ownership(account_id, user_id)?;
        if let Some(dest) = destination_account_id {
            self.check_account_ownership(dest, user_id)?;
        }

        let Some(category_id) = category_id else {
            return Ok(());
        };
        let category = self.category_repository.get_by_id(category_id)?;
        if !CategoryScope::new(user_id).visible(&category) {
            return Err(LedgerError::CategoryNotVisible(format!(
                "Category {} is not visible to user {}",
                category_id, user_id
            ))
            .into());
        }
        let expected_kind = match kind {
            EntryKind::Income => CategoryKind::Income,
            EntryKind::Expense => CategoryKind::Expense,
            _ => {
                return Err(LedgerError::CategoryMismatch(format!(
                    "{} entries cannot carry a category",
                    kind.as_str()
                ))
                .into())
            }
        };
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

    /// Materializes every due occurrence of one template up to `as_of`.
    /// Returns the number of entries created.
    fn process_template(&self, mut template: RecurringTemplate, as_of: NaiveDate) -> Result<usize> {
        self.check_references(
            template.kind,
            &template.user_id,
            &template.account_id,
            template.destination_account_id.as_deref(),
            template.category_id.as_deref(),
        )?;

        let mut created = 0;

        while template.is_active && template.next_occurrence <= as_of {
            let occurrence = template.next_occurrence;

            if template.is_expired_at(occurrence) {
                debug!("Deactivating expired recurring template {}", template.id);
                self.repository.deactivate(&template.id)?;
                template.is_active = false;
                break;
            }

            let new_entry = template.materialize(occurrence);
            new_entry.validate()?;
            let advanced = template.frequency.advance(occurrence);

            let ledger_repository = Arc::clone(&self.ledger_repository);
            let account_repository = Arc::clone(&self.account_repository);
            let repository = Arc::clone(&self.repository);
            let template_id = template.id.clone();

            self.executor.execute(move |conn| {
                let entry = ledger_repository.create_in_transaction(new_entry, conn)?;
                let deltas = merge_deltas(entry.balance_effects());
                account_repository.apply_balance_deltas_in_transaction(&deltas, conn)?;
                repository.mark_executed_in_transaction(&template_id, occurrence, advanced, conn)?;
                Ok::<_, Error>(())
            })?;

            template.last_executed = Some(occurrence);
            template.next_occurrence = advanced;
            created += 1;
        }

        Ok(created)
    }
}

#[async_trait::async_trait]
impl<E: DbTransactionExecutor + Send + Sync> RecurringServiceTrait for RecurringService<E> {
    fn get_template(&self, template_id: &str) -> Result<RecurringTemplate> {
        self.repository.get_by_id(template_id)
    }

    fn list_templates(&self, user_id: &str) -> Result<Vec<RecurringTemplate>> {
        self.repository.list(user_id)
    }

    async fn create_template(
        &self,
        new_template: NewRecurringTemplate,
    ) -> Result<RecurringTemplate> {
        new_template.validate()?;
        self.check_references(
            new_template.kind,
            &new_template.user_id,
            &new_template.account_id,
            new_template.destination_account_id.as_deref(),
            new_template.category_id.as_deref(),
        )?;
        debug!(
            "Creating {} recurring template '{}' for user {}",
            new_template.frequency.as_str(),
            new_template.description,
            new_template.user_id
        );
        self.repository.create(new_template)
    }

    async fn delete_template(&self, user_id: &str, template_id: &str) -> Result<()> {
        let template = self.repository.get_by_id(template_id)?;
        if template.user_id != user_id {
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "Recurring template {} not found for user {}",
                template_id, user_id
            ))));
        }
        self.repository.delete(template_id)
    }

    async fn run_scheduler(&self, as_of: NaiveDate) -> Result<usize> {
        let due = self.repository.get_due(as_of)?;
        debug!("Recurring scheduler found {} due templates", due.len());

        let mut created = 0;
        for template in due {
            let template_id = template.id.clone();
            match self.process_template(template, as_of) {
                Ok(count) => created += count,
                // One broken template must not starve the rest of the batch.
                Err(e) => error!("Failed to process recurring template {}: {}", template_id, e),
            }
        }

        Ok(created)
    }
}
