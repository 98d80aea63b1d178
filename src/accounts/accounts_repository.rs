use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::db::get_connection;
use crate::errors::{DatabaseError, Error, Result};
use crate::schema::accounts;
use crate::schema::accounts::dsl::*;
use crate::utils::parse_decimal_tolerant;

use super::accounts_model::{Account, AccountDB, AccountUpdate, NewAccount};
use super::accounts_traits::AccountRepositoryTrait;

/// Repository for managing account data in the database
pub struct AccountRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
}

impl AccountRepository {
    pub fn new(pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

impl AccountRepositoryTrait for AccountRepository {
    fn create(&self, new_account: NewAccount) -> Result<Account> {
        new_account.validate()?;

        let mut account_db: AccountDB = new_account.into();
        if account_db.id.is_empty() {
            account_db.id = uuid::Uuid::new_v4().to_string();
        }

        let mut conn = get_connection(&self.pool)?;

        diesel::insert_into(accounts::table)
            .values(&account_db)
            .execute(&mut conn)?;

        Ok(account_db.into())
    }

    fn update(&self, account_update: AccountUpdate) -> Result<Account> {
        account_update.validate()?;

        let mut conn = get_connection(&self.pool)?;
        let update_id = account_update.id.clone().ok_or_else(|| {
            Error::Validation(crate::errors::ValidationError::MissingField(
                "id".to_string(),
            ))
        })?;

        let mut existing = accounts
            .select(AccountDB::as_select())
            .find(&update_id)
            .first::<AccountDB>(&mut conn)?;

        existing.name = account_update.name;
        existing.account_type = account_update.account_type;
        existing.include_in_total = account_update.include_in_total;
        existing.is_active = account_update.is_active;
        existing.updated_at = chrono::Utc::now().naive_utc();

        diesel::update(accounts.find(&update_id))
            .set(&existing)
            .execute(&mut conn)?;

        Ok(existing.into())
    }

    fn get_by_id(&self, account_id: &str) -> Result<Account> {
        let mut conn = get_connection(&self.pool)?;

        let account = accounts
            .select(AccountDB::as_select())
            .find(account_id)
            .first::<AccountDB>(&mut conn)?;

        Ok(account.into())
    }

    fn list(
        &self,
        user_id_filter: &str,
        is_active_filter: Option<bool>,
        account_ids: Option<&[String]>,
    ) -> Result<Vec<Account>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = accounts::table
            .filter(user_id.eq(user_id_filter))
            .into_boxed();

        if let Some(active) = is_active_filter {
            query = query.filter(is_active.eq(active));
        }

        if let Some(ids) = account_ids {
            query = query.filter(id.eq_any(ids));
        }

        let results = query
            .select(AccountDB::as_select())
            .order((is_active.desc(), name.asc()))
            .load::<AccountDB>(&mut conn)?;

        Ok(results.into_iter().map(Account::from).collect())
    }

    fn apply_balance_deltas_in_transaction(
        &self,
        deltas: &[(String, Decimal)],
        conn: &mut SqliteConnection,
    ) -> Result<()> {
        for (account_id, delta) in deltas {
            let current: String = accounts
                .select(balance)
                .find(account_id)
                .first::<String>(conn)
                .map_err(|e| match e {
                    diesel::result::Error::NotFound => Error::Database(DatabaseError::NotFound(
                        format!("Account {} not found", account_id),
                    )),
                    other => other.into(),
                })?;

            let next = parse_decimal_tolerant(&current, "account.balance") + delta;

            diesel::update(accounts.find(account_id))
                .set((
                    balance.eq(next.to_string()),
                    updated_at.eq(chrono::Utc::now().naive_utc()),
                ))
                .execute(conn)?;
        }

        Ok(())
    }
}
