use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::db::get_connection;
use crate::errors::{DatabaseError, Error, Result};
use crate::schema::recurring_templates;
use crate::utils::format_date;

use super::recurring_model::{NewRecurringTemplate, RecurringTemplate, RecurringTemplateDB};
use super::recurring_traits::RecurringRepositoryTrait;

/// Repository for managing recurring template data in the database
pub struct RecurringRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl RecurringRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl RecurringRepositoryTrait for RecurringRepository {
    fn create(&self, new_template: NewRecurringTemplate) -> Result<RecurringTemplate> {
        let template_db: RecurringTemplateDB = new_template.into();

        let mut conn = get_connection(&self.pool)?;
        diesel::insert_into(recurring_templates::table)
            .values(&template_db)
            .execute(&mut conn)?;

        Ok(template_db.into())
    }

    fn delete(&self, template_id: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        diesel::delete(recurring_templates::table.find(template_id)).execute(&mut conn)?;
        Ok(())
    }

    fn get_by_id(&self, template_id: &str) -> Result<RecurringTemplate> {
        let mut conn = get_connection(&self.pool)?;

        let template = recurring_templates::table
            .select(RecurringTemplateDB::as_select())
            .find(template_id)
            .first::<RecurringTemplateDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => Error::Database(DatabaseError::NotFound(
                    format!("Recurring template {} not found", template_id),
                )),
                other => other.into(),
            })?;

        Ok(template.into())
    }

    fn list(&self, user_id: &str) -> Result<Vec<RecurringTemplate>> {
        let mut conn = get_connection(&self.pool)?;

        let results = recurring_templates::table
            .filter(recurring_templates::user_id.eq(user_id))
            .select(RecurringTemplateDB::as_select())
            .order(recurring_templates::next_occurrence.asc())
            .load::<RecurringTemplateDB>(&mut conn)?;

        Ok(results.into_iter().map(RecurringTemplate::from).collect())
    }

    fn get_due(&self, as_of: NaiveDate) -> Result<Vec<RecurringTemplate>> {
        let mut conn = get_connection(&self.pool)?;

        let results = recurring_templates::table
            .filter(recurring_templates::is_active.eq(true))
            .filter(recurring_templates::next_occurrence.le(format_date(as_of)))
            .select(RecurringTemplateDB::as_select())
            .order(recurring_templates::next_occurrence.asc())
            .load::<RecurringTemplateDB>(&mut conn)?;

        Ok(results.into_iter().map(RecurringTemplate::from).collect())
    }

    fn deactivate(&self, template_id: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        diesel::update(recurring_templates::table.find(template_id))
            .set(recurring_templates::is_active.eq(false))
            .execute(&mut conn)?;
        Ok(())
    }

    fn mark_executed_in_transaction(
        &self,
        template_id: &str,
        executed_on: NaiveDate,
        next_occurrence: NaiveDate,
        conn: &mut SqliteConnection,
    ) -> Result<()> {
        diesel::update(recurring_templates::table.find(template_id))
            .set((
                recurring_templates::last_executed.eq(Some(format_date(executed_on))),
                recurring_templates::next_occurrence.eq(format_date(next_occurrence)),
            ))
            .execute(conn)?;
        Ok(())
    }
}
