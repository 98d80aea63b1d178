use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use crate::db::get_connection;
use crate::errors::{DatabaseError, Error, Result};
use crate::schema::wagers;
use crate::schema::wagers::dsl::*;
use crate::utils::format_date;

use super::wagers_model::{NewWager, Wager, WagerDB, WagerUpdate};
use super::wagers_traits::WagerRepositoryTrait;

/// Repository for managing wager data in the database
pub struct WagerRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl WagerRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl WagerRepositoryTrait for WagerRepository {
    fn create(&self, new_wager: NewWager) -> Result<Wager> {
        let wager_db: WagerDB = new_wager.into();

        let mut conn = get_connection(&self.pool)?;
        diesel::insert_into(wagers::table)
            .values(&wager_db)
            .execute(&mut conn)?;

        Ok(wager_db.into())
    }

    fn update(&self, wager_update: WagerUpdate) -> Result<Wager> {
        let mut conn = get_connection(&self.pool)?;

        let mut existing = wagers
            .select(WagerDB::as_select())
            .find(&wager_update.id)
            .first::<WagerDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => Error::Database(DatabaseError::NotFound(
                    format!("Wager {} not found", wager_update.id),
                )),
                other => other.into(),
            })?;

        existing.event_name = wager_update.event_name;
        existing.stake = wager_update.stake.to_string();
        existing.payout = wager_update.payout.to_string();
        existing.result = wager_update.result.as_str().to_string();
        existing.account_id = wager_update.account_id;
        existing.date = format_date(wager_update.date);
        existing.notes = wager_update.notes;
        existing.updated_at = chrono::Utc::now().naive_utc();

        diesel::update(wagers.find(&existing.id))
            .set(&existing)
            .execute(&mut conn)?;

        Ok(existing.into())
    }

    fn delete(&self, wager_id: &str) -> Result<()> {
        let mut conn = get_connection(&self.pool)?;
        diesel::delete(wagers.find(wager_id)).execute(&mut conn)?;
        Ok(())
    }

    fn get_by_id(&self, wager_id: &str) -> Result<Wager> {
        let mut conn = get_connection(&self.pool)?;

        let wager = wagers
            .select(WagerDB::as_select())
            .find(wager_id)
            .first::<WagerDB>(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => Error::Database(DatabaseError::NotFound(
                    format!("Wager {} not found", wager_id),
                )),
                other => other.into(),
            })?;

        Ok(wager.into())
    }

    fn list(&self, user_id_filter: &str) -> Result<Vec<Wager>> {
        let mut conn = get_connection(&self.pool)?;

        let results = wagers
            .filter(user_id.eq(user_id_filter))
            .select(WagerDB::as_select())
            .order((date.desc(), created_at.desc()))
            .load::<WagerDB>(&mut conn)?;

        Ok(results.into_iter().map(Wager::from).collect())
    }
}
