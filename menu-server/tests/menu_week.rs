//! Menu catalog tests: publish gate, default sides, week duplication.

mod common;

use common::*;
use menu_server::db::models::{MenuItemCreate, MenuItemUpdate};
use menu_server::services::menu_catalog::CatalogError;
use shared::models::{MenuItemKind, UserCategory};
use shared::week;

#[tokio::test]
async fn publish_gate_separates_public_and_admin_views() {
    let env = test_env().await;
    let week_start = future_week();
    seed_week(&env, week_start, true, true).await;

    // One more item created after the publish pass stays hidden
    let late = env
        .catalog
        .create_item(MenuItemCreate {
            code: "A9".into(),
            description: "Almuerzo especial".into(),
            kind: MenuItemKind::Lunch,
            date: week_start,
            price: Some(5200.0),
            active: None,
        })
        .await
        .expect("late item");
    assert!(!late.published);

    let public = env.catalog.published_week(week_start).await.expect("public");
    let admin = env.catalog.admin_week(week_start).await.expect("admin");

    assert_eq!(public.item_count(), 10);
    assert_eq!(admin.item_count(), 11);
    assert!(public.items().all(|i| i.active && i.published));

    // Deactivating a published item removes it from the public view only
    let first_lunch = admin.days[0].lunches[0].clone();
    env.catalog
        .update_item(
            &first_lunch.id_string(),
            MenuItemUpdate {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .expect("deactivate");

    let public = env.catalog.published_week(week_start).await.expect("public");
    let admin = env.catalog.admin_week(week_start).await.expect("admin");
    assert_eq!(public.item_count(), 9);
    assert_eq!(admin.item_count(), 11);
}

#[tokio::test]
async fn publishing_an_empty_week_fails() {
    let env = test_env().await;
    let err = env
        .catalog
        .publish_week(future_week(), true)
        .await
        .expect_err("nothing to publish");
    assert!(matches!(err, CatalogError::WeekEmpty(_)));
}

#[tokio::test]
async fn a_week_of_only_sides_can_be_published() {
    let env = test_env().await;
    let week_start = future_week();
    for (i, date) in week::work_days(week_start).into_iter().take(3).enumerate() {
        env.catalog
            .create_item(MenuItemCreate {
                code: format!("S{}", i + 1),
                description: "Ensalada".into(),
                kind: MenuItemKind::Side,
                date,
                price: None,
                active: None,
            })
            .await
            .expect("side");
    }

    let updated = env
        .catalog
        .publish_week(week_start, true)
        .await
        .expect("sides alone are publishable");
    assert_eq!(updated, 3);

    let public = env.catalog.published_week(week_start).await.expect("public");
    assert_eq!(public.item_count(), 3);
}

#[tokio::test]
async fn default_sides_apply_once_and_land_published() {
    let env = test_env().await;
    let week_start = future_week();

    let created = env
        .catalog
        .apply_default_sides(week_start)
        .await
        .expect("first application");
    // 3 defaults x 5 work days, instantly visible
    assert_eq!(created.len(), 15);
    assert!(created.iter().all(|i| i.active && i.published));

    let err = env
        .catalog
        .apply_default_sides(week_start)
        .await
        .expect_err("no overwrite");
    assert!(matches!(err, CatalogError::SidesAlreadyApplied(_)));

    // First application untouched
    let admin = env.catalog.admin_week(week_start).await.expect("admin");
    assert_eq!(admin.item_count(), 15);
}

#[tokio::test]
async fn default_sides_for_one_day_only() {
    let env = test_env().await;
    let week_start = future_week();
    let wednesday = week::work_days(week_start)[2];

    let created = env
        .catalog
        .apply_default_sides_for_day(week_start, wednesday)
        .await
        .expect("single day");
    assert_eq!(created.len(), 3);
    assert!(created.iter().all(|i| i.date == wednesday));

    // The whole-week application now conflicts on that day
    let err = env
        .catalog
        .apply_default_sides(week_start)
        .await
        .expect_err("wednesday already has sides");
    assert!(matches!(err, CatalogError::SidesAlreadyApplied(d) if d == wednesday));
}

#[tokio::test]
async fn duplication_copies_everything_unpublished() {
    let env = test_env().await;
    let source = future_week();
    let target = source + chrono::Duration::days(7);
    seed_week(&env, source, true, true).await;

    let created = env
        .catalog
        .duplicate_week(source, target)
        .await
        .expect("duplicate");
    assert_eq!(created, 10);

    let copy = env.catalog.admin_week(target).await.expect("target week");
    assert_eq!(copy.item_count(), 10);
    // Source was published; copies never are
    assert!(copy.items().all(|i| !i.published));
    assert!(copy.items().all(|i| i.week_start == target));

    // The published view of the target stays empty until an explicit publish
    let public = env.catalog.published_week(target).await.expect("public");
    assert!(public.is_empty());
}

#[tokio::test]
async fn duplication_refuses_a_populated_target() {
    let env = test_env().await;
    let source = future_week();
    let target = source + chrono::Duration::days(7);
    seed_week(&env, source, false, false).await;
    seed_week(&env, target, false, false).await;

    let err = env
        .catalog
        .duplicate_week(source, target)
        .await
        .expect_err("no merge");
    assert!(matches!(err, CatalogError::TargetOccupied(_)));
}

#[tokio::test]
async fn duplicate_codes_within_a_week_conflict() {
    let env = test_env().await;
    let week_start = future_week();
    seed_week(&env, week_start, false, false).await;

    let err = env
        .catalog
        .create_item(MenuItemCreate {
            // A1 was seeded on Monday; same code, same kind, same week
            code: "A1".into(),
            description: "Otro almuerzo".into(),
            kind: MenuItemKind::Lunch,
            date: week::work_days(week_start)[3],
            price: None,
            active: None,
        })
        .await
        .expect_err("code is taken");
    assert!(matches!(err, CatalogError::CodeTaken { .. }));
}

#[tokio::test]
async fn price_resolution_prefers_positive_overrides() {
    let env = test_env().await;
    let week_start = future_week();

    let item = env
        .catalog
        .create_item(MenuItemCreate {
            code: "A1".into(),
            description: "Almuerzo".into(),
            kind: MenuItemKind::Lunch,
            date: week_start,
            price: Some(5200.0),
            active: None,
        })
        .await
        .expect("item");
    assert_eq!(env.catalog.resolve_price(&item, UserCategory::Staff), 5200.0);

    let plain = env
        .catalog
        .create_item(MenuItemCreate {
            code: "A2".into(),
            description: "Almuerzo".into(),
            kind: MenuItemKind::Lunch,
            date: week_start,
            price: None,
            active: None,
        })
        .await
        .expect("item");
    assert_eq!(env.catalog.resolve_price(&plain, UserCategory::Staff), 4875.0);
    assert_eq!(
        env.catalog.resolve_price(&plain, UserCategory::Guardian),
        4500.0
    );
}
