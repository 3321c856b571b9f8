//! End-to-end order workflow tests against an in-memory store and a
//! scripted payment gateway.

mod common;

use common::*;
use menu_server::db::models::OrderStatus;
use menu_server::orders::{MenuSource, PaymentOutcome, ProcessError};
use shared::week;
use std::sync::atomic::Ordering;

#[tokio::test]
async fn staff_week_processes_and_hands_off_payment() {
    let env = test_env().await;
    let week_start = future_week();
    seed_week(&env, week_start, false, true).await;

    let user = staff_user();
    let days = week::work_days(week_start);
    let items = inputs_for_days(&env, week_start, &days, None, false).await;

    let receipt = env
        .processor
        .process_order(&user, &items, week_start)
        .await
        .expect("order should process");

    assert!(receipt.redirect_url.contains(&receipt.order_id));

    let order = fetch_order(&env, &receipt.order_id).await;
    assert_eq!(order.status, OrderStatus::ProcessingPayment);
    assert_eq!(order.payment_id.as_deref(), Some(receipt.payment_id.as_str()));
    assert_eq!(order.line_items.len(), 5);
    // 5 staff lunches at the default price, no sides
    assert_eq!(order.total, 5.0 * 4875.0);
}

#[tokio::test]
async fn second_order_for_same_week_conflicts() {
    let env = test_env().await;
    let week_start = future_week();
    seed_week(&env, week_start, false, true).await;

    let user = staff_user();
    let days = week::work_days(week_start);
    let items = inputs_for_days(&env, week_start, &days, None, false).await;

    let first = env
        .processor
        .process_order(&user, &items, week_start)
        .await
        .expect("first order");

    let err = env
        .processor
        .process_order(&user, &items, week_start)
        .await
        .expect_err("second order must conflict");
    match err {
        ProcessError::DuplicateActive { order_id, .. } => {
            assert_eq!(order_id, first.order_id);
        }
        other => panic!("expected DuplicateActive, got {other:?}"),
    }
}

#[tokio::test]
async fn gateway_failure_leaves_order_pending_and_resumable() {
    let env = test_env().await;
    let week_start = future_week();
    seed_week(&env, week_start, false, true).await;

    let user = staff_user();
    let days = week::work_days(week_start);
    let items = inputs_for_days(&env, week_start, &days, None, false).await;

    env.gateway.fail_create.store(true, Ordering::SeqCst);
    let err = env
        .processor
        .process_order(&user, &items, week_start)
        .await
        .expect_err("gateway is down");

    let order_id = match err {
        ProcessError::Payment { order_id, message } => {
            assert!(message.contains("timed out"));
            order_id
        }
        other => panic!("expected Payment error, got {other:?}"),
    };

    // The priced order survived the failure in a resumable state
    let order = fetch_order(&env, &order_id).await;
    assert_eq!(order.status, OrderStatus::Pending);
    assert!(order.payment_id.is_none());

    // Retry repeats only the payment step
    env.gateway.fail_create.store(false, Ordering::SeqCst);
    let receipt = env
        .processor
        .retry_payment(&order_id)
        .await
        .expect("retry should succeed");
    assert_eq!(receipt.order_id, order_id);

    let order = fetch_order(&env, &order_id).await;
    assert_eq!(order.status, OrderStatus::ProcessingPayment);
    assert_eq!(env.gateway.create_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn retry_is_rejected_once_payment_is_in_flight() {
    let env = test_env().await;
    let week_start = future_week();
    seed_week(&env, week_start, false, true).await;

    let user = staff_user();
    let days = week::work_days(week_start);
    let items = inputs_for_days(&env, week_start, &days, None, false).await;
    let receipt = env
        .processor
        .process_order(&user, &items, week_start)
        .await
        .expect("order");

    let err = env
        .processor
        .retry_payment(&receipt.order_id)
        .await
        .expect_err("already processing payment");
    assert!(matches!(err, ProcessError::NotResumable { .. }));
}

#[tokio::test]
async fn unpublished_week_is_served_from_the_admin_view() {
    let env = test_env().await;
    let week_start = future_week();
    // Items exist but the publish flag never propagated
    seed_week(&env, week_start, false, false).await;

    let availability = env
        .processor
        .week_availability(week_start)
        .await
        .expect("availability");
    assert_eq!(availability.source, MenuSource::Admin);

    let user = staff_user();
    let days = week::work_days(week_start);
    let items = inputs_for_days(&env, week_start, &days, None, false).await;
    env.processor
        .process_order(&user, &items, week_start)
        .await
        .expect("admin content is orderable");
}

#[tokio::test]
async fn empty_week_cannot_be_ordered() {
    let env = test_env().await;
    let week_start = future_week();

    let user = staff_user();
    let items = vec![menu_server::orders::SelectionInput {
        date: week_start,
        child_id: None,
        lunch_id: Some("menu:missing".into()),
        side_id: None,
    }];
    let err = env
        .processor
        .process_order(&user, &items, week_start)
        .await
        .expect_err("no menu at all");
    assert!(matches!(err, ProcessError::NoMenu(_)));
}

#[tokio::test]
async fn guardian_missing_a_day_is_blocked_before_any_write() {
    let env = test_env().await;
    let week_start = future_week();
    seed_week(&env, week_start, true, true).await;

    let user = guardian_user();
    let days = week::work_days(week_start);
    // Skip Wednesday
    let partial: Vec<_> = days
        .iter()
        .copied()
        .filter(|d| *d != days[2])
        .collect();
    let items = inputs_for_days(&env, week_start, &partial, Some("child-1"), true).await;

    let err = env
        .processor
        .process_order(&user, &items, week_start)
        .await
        .expect_err("incomplete week");
    match err {
        ProcessError::Invalid(validation) => {
            assert_eq!(validation.missing_days, vec![days[2]]);
        }
        other => panic!("expected Invalid, got {other:?}"),
    }

    // Nothing was persisted
    let active = env
        .store
        .active_order(&user.id, week_start)
        .await
        .expect("query");
    assert!(active.is_none());
}

#[tokio::test]
async fn webhook_confirmation_settles_the_order() {
    let env = test_env().await;
    let week_start = future_week();
    seed_week(&env, week_start, false, true).await;

    let user = staff_user();
    let days = week::work_days(week_start);
    let items = inputs_for_days(&env, week_start, &days, None, false).await;
    let receipt = env
        .processor
        .process_order(&user, &items, week_start)
        .await
        .expect("order");

    // Gateway cannot verify yet: order must stay processing_payment
    env.gateway.verify_result.store(false, Ordering::SeqCst);
    let err = env
        .processor
        .confirm_payment(&receipt.order_id, PaymentOutcome::Paid)
        .await
        .expect_err("unverifiable payment");
    assert!(matches!(err, ProcessError::NotVerified { .. }));
    let order = fetch_order(&env, &receipt.order_id).await;
    assert_eq!(order.status, OrderStatus::ProcessingPayment);

    // Gateway verifies: order settles, paid_at is stamped
    env.gateway.verify_result.store(true, Ordering::SeqCst);
    let order = env
        .processor
        .confirm_payment(&receipt.order_id, PaymentOutcome::Paid)
        .await
        .expect("verified payment");
    assert_eq!(order.status, OrderStatus::Paid);
    assert!(order.paid_at.is_some());

    // Repeated webhook delivery is idempotent
    let again = env
        .processor
        .confirm_payment(&receipt.order_id, PaymentOutcome::Paid)
        .await
        .expect("idempotent re-entry");
    assert_eq!(again.status, OrderStatus::Paid);
}

#[tokio::test]
async fn webhook_rejection_cancels_the_order() {
    let env = test_env().await;
    let week_start = future_week();
    seed_week(&env, week_start, false, true).await;

    let user = staff_user();
    let days = week::work_days(week_start);
    let items = inputs_for_days(&env, week_start, &days, None, false).await;
    let receipt = env
        .processor
        .process_order(&user, &items, week_start)
        .await
        .expect("order");

    let order = env
        .processor
        .confirm_payment(&receipt.order_id, PaymentOutcome::Rejected)
        .await
        .expect("rejection cancels");
    assert_eq!(order.status, OrderStatus::Cancelled);

    // A cancelled order no longer blocks a new one for the same week
    let receipt2 = env
        .processor
        .process_order(&user, &items, week_start)
        .await
        .expect("week is free again");
    assert_ne!(receipt2.order_id, receipt.order_id);
}

#[tokio::test]
async fn cancel_requires_the_owning_user() {
    let env = test_env().await;
    let week_start = future_week();
    seed_week(&env, week_start, false, true).await;

    let user = staff_user();
    let days = week::work_days(week_start);
    let items = inputs_for_days(&env, week_start, &days, None, false).await;
    let receipt = env
        .processor
        .process_order(&user, &items, week_start)
        .await
        .expect("order");

    let err = env
        .processor
        .cancel_order(&receipt.order_id, "someone-else")
        .await
        .expect_err("not the owner");
    assert!(matches!(err, ProcessError::Store(_)));

    let order = env
        .processor
        .cancel_order(&receipt.order_id, &user.id)
        .await
        .expect("owner cancels");
    assert_eq!(order.status, OrderStatus::Cancelled);
}
