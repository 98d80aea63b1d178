//! Shared helpers for tests that run against a real SQLite database.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use diesel::prelude::*;

use crate::accounts::{AccountRepository, AccountRepositoryTrait, NewAccount};
use crate::categories::{CategoryDB, CategoryKind};
use crate::db::{create_pool, get_connection, run_migrations, DbPool};
use crate::schema::categories;

/// A migrated on-disk database that lives for the duration of a test.
/// Dropping it removes the backing directory.
pub struct TestDb {
    pub pool: Arc<DbPool>,
    _dir: tempfile::TempDir,
}

pub fn setup_test_db() -> TestDb {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let db_path = dir
        .path()
        .join("centavo-test.db")
        .to_string_lossy()
        .to_string();

    let pool = create_pool(&db_path).expect("failed to create test pool");
    run_migrations(&pool).expect("failed to run migrations");

    TestDb { pool, _dir: dir }
}

pub fn seed_account(pool: &Arc<DbPool>, user_id: &str, name: &str) -> String {
    let repository = AccountRepository::new(Arc::clone(pool));
    let account = repository
        .create(NewAccount {
            id: None,
            user_id: user_id.to_string(),
            name: name.to_string(),
            account_type: "bank".to_string(),
            currency: "CLP".to_string(),
            include_in_total: true,
            is_active: true,
        })
        .expect("failed to seed account");
    account.id
}

pub fn seed_category(
    pool: &Arc<DbPool>,
    user_id: Option<&str>,
    name: &str,
    kind: CategoryKind,
) -> String {
    let row = CategoryDB {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.map(str::to_string),
        name: name.to_string(),
        category_type: kind.as_str().to_string(),
        parent_id: None,
        is_default: user_id.is_none(),
        created_at: chrono::Utc::now().naive_utc(),
    };
    let mut conn = get_connection(pool).expect("failed to get connection");
    diesel::insert_into(categories::table)
        .values(&row)
        .execute(&mut conn)
        .expect("failed to seed category");
    row.id
}

pub fn account_balance(pool: &Arc<DbPool>, account_id: &str) -> Decimal {
    let repository = AccountRepository::new(Arc::clone(pool));
    repository
        .get_by_id(account_id)
        .expect("failed to load account")
        .balance
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("invalid test date")
}
