use chrono::NaiveDate;
use diesel::sqlite::SqliteConnection;

use super::recurring_model::{NewRecurringTemplate, RecurringTemplate};
use crate::Result;

/// Trait defining the contract for recurring template repository operations.
pub trait RecurringRepositoryTrait: Send + Sync {
    fn create(&self, new_template: NewRecurringTemplate) -> Result<RecurringTemplate>;
    fn delete(&self, template_id: &str) -> Result<()>;
    fn get_by_id(&self, template_id: &str) -> Result<RecurringTemplate>;
    fn list(&self, user_id: &str) -> Result<Vec<RecurringTemplate>>;

    /// Active templates whose next occurrence is due at or before `as_of`.
    fn get_due(&self, as_of: NaiveDate) -> Result<Vec<RecurringTemplate>>;

    fn deactivate(&self, template_id: &str) -> Result<()>;

    /// Records a materialized occurrence: sets `last_executed` and moves
    /// `next_occurrence` forward, in the same transaction as the entry
    /// insert so a crash can never skip or duplicate an occurrence.
    fn mark_executed_in_transaction(
        &self,
        template_id: &str,
        executed_on: NaiveDate,
        next_occurrence: NaiveDate,
        conn: &mut SqliteConnection,
    ) -> Result<()>;
}

/// Trait defining the contract for recurring scheduler operations.
#[async_trait::async_trait]
pub trait RecurringServiceTrait: Send + Sync {
    fn get_template(&self, template_id: &str) -> Result<RecurringTemplate>;
    fn list_templates(&self, user_id: &str) -> Result<Vec<RecurringTemplate>>;

    async fn create_template(&self, new_template: NewRecurringTemplate)
        -> Result<RecurringTemplate>;
    async fn delete_template(&self, user_id: &str, template_id: &str) -> Result<()>;

    /// Materializes every due occurrence up to `as_of` and returns the
    /// number of entries created.
    async fn run_scheduler(&self, as_of: NaiveDate) -> Result<usize>;
}
