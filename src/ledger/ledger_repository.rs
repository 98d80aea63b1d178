use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::db::get_connection;
use crate::errors::{DatabaseError, Error, Result};
use crate::schema::{entries, entry_items};
use crate::utils::format_date;

use super::ledger_model::{Entry, EntryDB, EntryItemDB, EntryUpdate, NewEntry};
use super::ledger_traits::LedgerRepositoryTrait;

/// Repository for ledger entries and their line items.
pub struct LedgerRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl LedgerRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }

    fn attach_line_items(
        entry_rows: Vec<EntryDB>,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<Entry>> {
        let item_rows = EntryItemDB::belonging_to(&entry_rows)
            .select(EntryItemDB::as_select())
            .load::<EntryItemDB>(conn)?;

        let grouped = item_rows.grouped_by(&entry_rows);
        Ok(entry_rows
            .into_iter()
            .zip(grouped)
            .map(Entry::from)
            .collect())
    }

    fn load_entry(entry_id: &str, conn: &mut SqliteConnection) -> Result<Entry> {
        let entry_row = entries::table
            .select(EntryDB::as_select())
            .find(entry_id)
            .first::<EntryDB>(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => Error::Database(DatabaseError::NotFound(
                    format!("Entry {} not found", entry_id),
                )),
                other => other.into(),
            })?;

        let item_rows = EntryItemDB::belonging_to(&entry_row)
            .select(EntryItemDB::as_select())
            .load::<EntryItemDB>(conn)?;

        Ok(Entry::from((entry_row, item_rows)))
    }

    fn insert_line_items(
        entry_id: &str,
        items: Vec<super::ledger_model::NewLineItem>,
        conn: &mut SqliteConnection,
    ) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }
        let rows: Vec<EntryItemDB> = items
            .into_iter()
            .map(|item| item.into_db(entry_id))
            .collect();
        diesel::insert_into(entry_items::table)
            .values(&rows)
            .execute(conn)?;
        Ok(())
    }
}

impl LedgerRepositoryTrait for LedgerRepository {
    fn get_entry(&self, entry_id: &str) -> Result<Entry> {
        let mut conn = get_connection(&self.pool)?;
        Self::load_entry(entry_id, &mut conn)
    }

    fn get_entries_in_range(
        &self,
        user_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Entry>> {
        let mut conn = get_connection(&self.pool)?;

        let entry_rows = entries::table
            .filter(entries::user_id.eq(user_id))
            .filter(entries::date.ge(format_date(start_date)))
            .filter(entries::date.le(format_date(end_date)))
            .select(EntryDB::as_select())
            .order((entries::date.asc(), entries::created_at.asc()))
            .load::<EntryDB>(&mut conn)?;

        Self::attach_line_items(entry_rows, &mut conn)
    }

    fn get_entries_for_wager(&self, wager_id: &str) -> Result<Vec<Entry>> {
        let mut conn = get_connection(&self.pool)?;

        let entry_rows = entries::table
            .filter(entries::wager_id.eq(wager_id))
            .select(EntryDB::as_select())
            .order(entries::created_at.asc())
            .load::<EntryDB>(&mut conn)?;

        Self::attach_line_items(entry_rows, &mut conn)
    }

    fn get_entry_in_transaction(
        &self,
        entry_id: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Entry> {
        Self::load_entry(entry_id, conn)
    }

    fn create_in_transaction(
        &self,
        new_entry: NewEntry,
        conn: &mut SqliteConnection,
    ) -> Result<Entry> {
        let line_items = new_entry.line_items.clone();
        let entry_row: EntryDB = new_entry.into();

        diesel::insert_into(entries::table)
            .values(&entry_row)
            .execute(conn)?;

        Self::insert_line_items(&entry_row.id, line_items, conn)?;
        Self::load_entry(&entry_row.id, conn)
    }

    fn update_in_transaction(
        &self,
        entry_update: EntryUpdate,
        conn: &mut SqliteConnection,
    ) -> Result<Entry> {
        let mut existing = entries::table
            .select(EntryDB::as_select())
            .find(&entry_update.id)
            .first::<EntryDB>(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => Error::Database(DatabaseError::NotFound(
                    format!("Entry {} not found", entry_update.id),
                )),
                other => other.into(),
            })?;

        // Wager linkage and the recurring flag are system-managed; an update
        // never touches them.
        existing.entry_type = entry_update.kind.as_str().to_string();
        existing.amount = entry_update.amount.to_string();
        existing.description = entry_update.description;
        existing.date = format_date(entry_update.date);
        existing.account_id = entry_update.account_id;
        existing.destination_account_id = entry_update.destination_account_id;
        existing.category_id = entry_update.category_id;
        existing.is_ant_expense = entry_update.is_ant_expense;
        existing.updated_at = chrono::Utc::now().naive_utc();

        diesel::update(entries::table.find(&existing.id))
            .set(&existing)
            .execute(conn)?;

        diesel::delete(entry_items::table.filter(entry_items::entry_id.eq(&existing.id)))
            .execute(conn)?;
        Self::insert_line_items(&existing.id, entry_update.line_items, conn)?;

        Self::load_entry(&existing.id, conn)
    }

    fn delete_in_transaction(&self, entry_id: &str, conn: &mut SqliteConnection) -> Result<Entry> {
        let entry = Self::load_entry(entry_id, conn)?;

        // Line items cascade via the FK.
        diesel::delete(entries::table.find(entry_id)).execute(conn)?;

        Ok(entry)
    }
}
