use std::sync::Arc;

use rust_decimal_macros::dec;

use crate::db::DbPool;
use crate::test_utils::{date, setup_test_db};

use super::{Debt, DebtRepository, DebtService, DebtServiceTrait, NewDebt, NewDebtPayment};

fn make_service(pool: &Arc<DbPool>) -> DebtService<Arc<DbPool>> {
    DebtService::new(
        Arc::new(DebtRepository::new(Arc::clone(pool))),
        Arc::clone(pool),
    )
}

async fn seed_debt(service: &DebtService<Arc<DbPool>>, total: rust_decimal::Decimal) -> Debt {
    service
        .create_debt(NewDebt {
            id: None,
            user_id: "user-1".to_string(),
            name: "car loan".to_string(),
            total_amount: total,
            start_date: date(2025, 1, 1),
            due_date: None,
        })
        .await
        .unwrap()
}

fn payment(debt_id: &str, amount: rust_decimal::Decimal) -> NewDebtPayment {
    NewDebtPayment {
        debt_id: debt_id.to_string(),
        amount,
        payment_date: date(2025, 2, 1),
    }
}

#[tokio::test]
async fn test_payments_accumulate_and_flip_paid_flag() {
    let db = setup_test_db();
    let service = make_service(&db.pool);
    let debt = seed_debt(&service, dec!(500000)).await;

    let debt_after_first = service
        .record_payment("user-1", payment(&debt.id, dec!(200000)))
        .await
        .unwrap();
    assert_eq!(debt_after_first.paid_amount, dec!(200000));
    assert!(!debt_after_first.is_paid);

    let debt_after_second = service
        .record_payment("user-1", payment(&debt.id, dec!(300000)))
        .await
        .unwrap();
    assert_eq!(debt_after_second.paid_amount, dec!(500000));
    assert!(debt_after_second.is_paid);
}

#[tokio::test]
async fn test_removing_payment_reopens_the_debt() {
    let db = setup_test_db();
    let service = make_service(&db.pool);
    let debt = seed_debt(&service, dec!(500000)).await;

    service
        .record_payment("user-1", payment(&debt.id, dec!(200000)))
        .await
        .unwrap();
    service
        .record_payment("user-1", payment(&debt.id, dec!(300000)))
        .await
        .unwrap();

    let payments = service.get_payments(&debt.id).unwrap();
    let last = payments
        .iter()
        .find(|p| p.amount == dec!(300000))
        .expect("payment expected");

    let reopened = service.remove_payment("user-1", &last.id).await.unwrap();
    assert_eq!(reopened.paid_amount, dec!(200000));
    assert!(!reopened.is_paid);
}

#[tokio::test]
async fn test_paid_amount_always_equals_payment_sum() {
    let db = setup_test_db();
    let service = make_service(&db.pool);
    let debt = seed_debt(&service, dec!(100000)).await;

    for amount in [dec!(10000), dec!(25000), dec!(5000)] {
        service
            .record_payment("user-1", payment(&debt.id, amount))
            .await
            .unwrap();
    }

    let payments = service.get_payments(&debt.id).unwrap();
    let sum: rust_decimal::Decimal = payments.iter().map(|p| p.amount).sum();
    assert_eq!(service.get_debt(&debt.id).unwrap().paid_amount, sum);
}

#[tokio::test]
async fn test_non_positive_payment_is_rejected() {
    let db = setup_test_db();
    let service = make_service(&db.pool);
    let debt = seed_debt(&service, dec!(100000)).await;

    assert!(service
        .record_payment("user-1", payment(&debt.id, dec!(0)))
        .await
        .is_err());
    assert_eq!(service.get_debt(&debt.id).unwrap().paid_amount, dec!(0));
}

#[tokio::test]
async fn test_shrinking_total_below_paid_marks_debt_paid() {
    let db = setup_test_db();
    let service = make_service(&db.pool);
    let debt = seed_debt(&service, dec!(500000)).await;

    service
        .record_payment("user-1", payment(&debt.id, dec!(400000)))
        .await
        .unwrap();

    let updated = service
        .update_debt(super::DebtUpdate {
            id: debt.id.clone(),
            user_id: "user-1".to_string(),
            name: "car loan".to_string(),
            total_amount: dec!(350000),
            start_date: date(2025, 1, 1),
            due_date: None,
        })
        .await
        .unwrap();

    assert!(updated.is_paid);
}

#[tokio::test]
async fn test_foreign_user_cannot_record_payment() {
    let db = setup_test_db();
    let service = make_service(&db.pool);
    let debt = seed_debt(&service, dec!(100000)).await;

    assert!(service
        .record_payment("user-2", payment(&debt.id, dec!(1000)))
        .await
        .is_err());
}
