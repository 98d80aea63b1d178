use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::accounts::AccountRepository;
use crate::categories::{CategoryKind, CategoryRepository};
use crate::db::DbPool;
use crate::errors::Error;
use crate::test_utils::{account_balance, date, seed_account, seed_category, setup_test_db};

use super::{
    EntryKind, EntryUpdate, LedgerError, LedgerRepository, LedgerService, LedgerServiceTrait,
    NewEntry, NewLineItem,
};

fn make_service(pool: &Arc<DbPool>) -> LedgerService<Arc<DbPool>> {
    LedgerService::new(
        Arc::new(LedgerRepository::new(Arc::clone(pool))),
        Arc::new(AccountRepository::new(Arc::clone(pool))),
        Arc::new(CategoryRepository::new(Arc::clone(pool))),
        Arc::clone(pool),
    )
}

fn new_entry(user_id: &str, account_id: &str, kind: EntryKind, amount: Decimal) -> NewEntry {
    NewEntry {
        id: None,
        user_id: user_id.to_string(),
        kind,
        amount,
        description: "test entry".to_string(),
        date: date(2025, 3, 10),
        account_id: account_id.to_string(),
        destination_account_id: None,
        category_id: None,
        wager_id: None,
        is_recurring: false,
        is_ant_expense: false,
        line_items: vec![],
    }
}

#[tokio::test]
async fn test_create_income_and_expense_moves_balance() {
    let db = setup_test_db();
    let service = make_service(&db.pool);
    let account_id = seed_account(&db.pool, "user-1", "Checking");

    service
        .create_entry(new_entry("user-1", &account_id, EntryKind::Income, dec!(1000)))
        .await
        .unwrap();
    assert_eq!(account_balance(&db.pool, &account_id), dec!(1000));

    service
        .create_entry(new_entry("user-1", &account_id, EntryKind::Expense, dec!(250)))
        .await
        .unwrap();
    assert_eq!(account_balance(&db.pool, &account_id), dec!(750));
}

#[tokio::test]
async fn test_transfer_moves_funds_between_accounts() {
    let db = setup_test_db();
    let service = make_service(&db.pool);
    let source = seed_account(&db.pool, "user-1", "Checking");
    let destination = seed_account(&db.pool, "user-1", "Savings");

    let mut entry = new_entry("user-1", &source, EntryKind::Transfer, dec!(300));
    entry.destination_account_id = Some(destination.clone());
    service.create_entry(entry).await.unwrap();

    assert_eq!(account_balance(&db.pool, &source), dec!(-300));
    assert_eq!(account_balance(&db.pool, &destination), dec!(300));
}

#[tokio::test]
async fn test_update_reverses_old_effects_before_applying_new() {
    let db = setup_test_db();
    let service = make_service(&db.pool);
    let first = seed_account(&db.pool, "user-1", "Checking");
    let second = seed_account(&db.pool, "user-1", "Savings");

    let created = service
        .create_entry(new_entry("user-1", &first, EntryKind::Expense, dec!(100)))
        .await
        .unwrap();
    assert_eq!(account_balance(&db.pool, &first), dec!(-100));

    // Move the expense to another account with a different amount.
    let updated = service
        .update_entry(EntryUpdate {
            id: created.id.clone(),
            user_id: "user-1".to_string(),
            kind: EntryKind::Expense,
            amount: dec!(40),
            description: "corrected".to_string(),
            date: date(2025, 3, 11),
            account_id: second.clone(),
            destination_account_id: None,
            category_id: None,
            is_ant_expense: false,
            line_items: vec![],
        })
        .await
        .unwrap();

    assert_eq!(updated.amount, dec!(40));
    assert_eq!(account_balance(&db.pool, &first), dec!(0));
    assert_eq!(account_balance(&db.pool, &second), dec!(-40));
}

#[tokio::test]
async fn test_delete_restores_balance() {
    let db = setup_test_db();
    let service = make_service(&db.pool);
    let account_id = seed_account(&db.pool, "user-1", "Checking");

    let created = service
        .create_entry(new_entry("user-1", &account_id, EntryKind::Income, dec!(500)))
        .await
        .unwrap();
    assert_eq!(account_balance(&db.pool, &account_id), dec!(500));

    service.delete_entry("user-1", &created.id).await.unwrap();
    assert_eq!(account_balance(&db.pool, &account_id), dec!(0));
    assert!(service.get_entry(&created.id).is_err());
}

#[tokio::test]
async fn test_foreign_user_cannot_delete_entry() {
    let db = setup_test_db();
    let service = make_service(&db.pool);
    let account_id = seed_account(&db.pool, "user-1", "Checking");

    let created = service
        .create_entry(new_entry("user-1", &account_id, EntryKind::Income, dec!(500)))
        .await
        .unwrap();

    let result = service.delete_entry("user-2", &created.id).await;
    assert!(matches!(result, Err(Error::Ledger(LedgerError::NotFound(_)))));

    // The entry and its balance effect survive untouched.
    assert!(service.get_entry(&created.id).is_ok());
    assert_eq!(account_balance(&db.pool, &account_id), dec!(500));
}

#[tokio::test]
async fn test_category_kind_mismatch_leaves_balance_untouched() {
    let db = setup_test_db();
    let service = make_service(&db.pool);
    let account_id = seed_account(&db.pool, "user-1", "Checking");
    let income_category = seed_category(&db.pool, Some("user-1"), "Salary", CategoryKind::Income);

    let mut entry = new_entry("user-1", &account_id, EntryKind::Expense, dec!(50));
    entry.category_id = Some(income_category);

    let result = service.create_entry(entry).await;
    assert!(matches!(
        result,
        Err(Error::Ledger(LedgerError::CategoryMismatch(_)))
    ));
    assert_eq!(account_balance(&db.pool, &account_id), dec!(0));
}

#[tokio::test]
async fn test_foreign_user_category_is_rejected() {
    let db = setup_test_db();
    let service = make_service(&db.pool);
    let account_id = seed_account(&db.pool, "user-1", "Checking");
    let other_category = seed_category(&db.pool, Some("user-2"), "Private", CategoryKind::Expense);

    let mut entry = new_entry("user-1", &account_id, EntryKind::Expense, dec!(50));
    entry.category_id = Some(other_category);

    let result = service.create_entry(entry).await;
    assert!(matches!(
        result,
        Err(Error::Ledger(LedgerError::CategoryNotVisible(_)))
    ));
}

#[tokio::test]
async fn test_line_items_are_persisted_with_the_entry() {
    let db = setup_test_db();
    let service = make_service(&db.pool);
    let account_id = seed_account(&db.pool, "user-1", "Checking");
    let groceries = seed_category(&db.pool, None, "Groceries", CategoryKind::Expense);

    let mut entry = new_entry("user-1", &account_id, EntryKind::Expense, dec!(35));
    entry.category_id = Some(groceries.clone());
    entry.line_items = vec![
        NewLineItem {
            name: "bread".to_string(),
            amount: dec!(5),
            quantity: 3,
            category_id: Some(groceries.clone()),
            is_ant_expense: true,
        },
        NewLineItem {
            name: "coffee".to_string(),
            amount: dec!(20),
            quantity: 1,
            category_id: None,
            is_ant_expense: false,
        },
    ];

    let created = service.create_entry(entry).await.unwrap();
    let reloaded = service.get_entry(&created.id).unwrap();

    assert_eq!(reloaded.line_items.len(), 2);
    assert_eq!(reloaded.line_items[0].total(), dec!(15));
    assert!(reloaded.line_items[0].is_ant_expense);
    assert_eq!(account_balance(&db.pool, &account_id), dec!(-35));
}

#[tokio::test]
async fn test_wager_managed_entries_reject_direct_edits() {
    let db = setup_test_db();
    let service = make_service(&db.pool);
    let account_id = seed_account(&db.pool, "user-1", "Checking");

    let mut entry = new_entry("user-1", &account_id, EntryKind::Expense, dec!(100));
    entry.wager_id = Some("wager-1".to_string());
    let created = service.create_entry(entry).await.unwrap();

    let result = service
        .update_entry(EntryUpdate {
            id: created.id.clone(),
            user_id: "user-1".to_string(),
            kind: EntryKind::Expense,
            amount: dec!(1),
            description: "tamper".to_string(),
            date: date(2025, 3, 10),
            account_id: account_id.clone(),
            destination_account_id: None,
            category_id: None,
            is_ant_expense: false,
            line_items: vec![],
        })
        .await;

    assert!(matches!(
        result,
        Err(Error::Ledger(LedgerError::WagerManaged(_)))
    ));
    assert_eq!(account_balance(&db.pool, &account_id), dec!(-100));
}

#[tokio::test]
async fn test_reconcile_balance_records_signed_adjustment() {
    let db = setup_test_db();
    let service = make_service(&db.pool);
    let account_id = seed_account(&db.pool, "user-1", "Checking");

    service
        .create_entry(new_entry("user-1", &account_id, EntryKind::Income, dec!(800)))
        .await
        .unwrap();

    let adjustment = service
        .reconcile_balance("user-1", &account_id, dec!(750))
        .await
        .unwrap()
        .expect("delta expected");

    assert_eq!(adjustment.kind, EntryKind::Adjustment);
    assert_eq!(adjustment.amount, dec!(-50));
    assert_eq!(account_balance(&db.pool, &account_id), dec!(750));

    // Already at target: nothing to record.
    let none = service
        .reconcile_balance("user-1", &account_id, dec!(750))
        .await
        .unwrap();
    assert!(none.is_none());
}

#[tokio::test]
async fn test_entries_in_range_are_date_filtered() {
    let db = setup_test_db();
    let service = make_service(&db.pool);
    let account_id = seed_account(&db.pool, "user-1", "Checking");

    for (day, amount) in [(1, dec!(10)), (15, dec!(20)), (28, dec!(30))] {
        let mut entry = new_entry("user-1", &account_id, EntryKind::Income, amount);
        entry.date = date(2025, 3, day);
        service.create_entry(entry).await.unwrap();
    }

    let entries = service
        .get_entries_in_range("user-1", date(2025, 3, 10), date(2025, 3, 20))
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount, dec!(20));
}
