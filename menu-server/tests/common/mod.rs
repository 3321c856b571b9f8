//! Shared test fixtures: in-memory store, scripted payment gateway, seed data
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use menu_server::core::DefaultSide;
use menu_server::db;
use menu_server::orders::{OrderProcessor, OrderStore, SelectionInput};
use menu_server::services::menu_catalog::MenuCatalog;
use menu_server::services::payment::{
    GatewayError, PaymentGateway, PaymentIntent, PaymentRequest,
};
use menu_server::db::models::{MenuItemCreate, Order};
use shared::models::{Child, MenuItemKind, PriceTable, User, UserCategory};
use shared::week;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Scripted gateway: flip the switches to simulate outages and verdicts
pub struct FakeGateway {
    pub fail_create: AtomicBool,
    pub verify_result: AtomicBool,
    pub create_calls: AtomicUsize,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            fail_create: AtomicBool::new(false),
            verify_result: AtomicBool::new(true),
            create_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_payment(&self, request: PaymentRequest) -> Result<PaymentIntent, GatewayError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport("connection timed out".to_string()));
        }
        Ok(PaymentIntent {
            payment_id: format!("pay-{}", request.order_id),
            redirect_url: format!("https://pay.example/checkout/{}", request.order_id),
        })
    }

    async fn verify_payment(&self, _payment_id: &str) -> bool {
        self.verify_result.load(Ordering::SeqCst)
    }
}

pub struct TestEnv {
    pub catalog: Arc<MenuCatalog>,
    pub store: OrderStore,
    pub processor: OrderProcessor,
    pub gateway: Arc<FakeGateway>,
}

pub fn test_prices() -> PriceTable {
    PriceTable {
        guardian_lunch: 4500.0,
        staff_lunch: 4875.0,
        guardian_side: 900.0,
        staff_side: 1100.0,
        currency: "CLP".into(),
    }
}

pub async fn test_env() -> TestEnv {
    let database = db::open_memory().await.expect("in-memory db");
    let catalog = Arc::new(MenuCatalog::new(
        database.clone(),
        test_prices(),
        vec![
            DefaultSide {
                code: "ENS".into(),
                description: "Ensalada surtida".into(),
            },
            DefaultSide {
                code: "SOP".into(),
                description: "Sopa del día".into(),
            },
            DefaultSide {
                code: "FRU".into(),
                description: "Fruta de estación".into(),
            },
        ],
    ));
    let store = OrderStore::new(database.clone());
    let gateway = Arc::new(FakeGateway::new());
    let processor = OrderProcessor::new(
        catalog.clone(),
        store.clone(),
        gateway.clone(),
        chrono_tz::America::Santiago,
    );
    TestEnv {
        catalog,
        store,
        processor,
        gateway,
    }
}

/// A Monday far enough ahead that the ordering cutoff never interferes
pub fn future_week() -> NaiveDate {
    week::monday_of(Utc::now().date_naive()) + Duration::days(21)
}

/// Create Mon-Fri lunches (and optionally sides), then publish when asked
pub async fn seed_week(env: &TestEnv, week_start: NaiveDate, sides: bool, publish: bool) {
    for (i, date) in week::work_days(week_start).into_iter().enumerate() {
        env.catalog
            .create_item(MenuItemCreate {
                code: format!("A{}", i + 1),
                description: format!("Almuerzo {}", i + 1),
                kind: MenuItemKind::Lunch,
                date,
                price: None,
                active: None,
            })
            .await
            .expect("seed lunch");
        if sides {
            env.catalog
                .create_item(MenuItemCreate {
                    code: format!("S{}", i + 1),
                    description: format!("Ensalada {}", i + 1),
                    kind: MenuItemKind::Side,
                    date,
                    price: None,
                    active: None,
                })
                .await
                .expect("seed side");
        }
    }
    if publish {
        env.catalog
            .publish_week(week_start, true)
            .await
            .expect("publish week");
    }
}

/// Selection inputs covering the given work days, taken from the admin view
pub async fn inputs_for_days(
    env: &TestEnv,
    week_start: NaiveDate,
    days: &[NaiveDate],
    child_id: Option<&str>,
    with_sides: bool,
) -> Vec<SelectionInput> {
    let menu = env.catalog.admin_week(week_start).await.expect("admin week");
    let mut inputs = Vec::new();
    for day in &menu.days {
        if !days.contains(&day.date) {
            continue;
        }
        inputs.push(SelectionInput {
            date: day.date,
            child_id: child_id.map(str::to_string),
            lunch_id: day.lunches.first().map(|i| i.id_string()),
            side_id: if with_sides {
                day.sides.first().map(|i| i.id_string())
            } else {
                None
            },
        });
    }
    inputs
}

pub fn staff_user() -> User {
    User {
        id: "staff-7".into(),
        name: "Jorge Soto".into(),
        email: "jsoto@example.com".into(),
        category: UserCategory::Staff,
        children: vec![],
    }
}

pub fn guardian_user() -> User {
    User {
        id: "guardian-3".into(),
        name: "Ana Rojas".into(),
        email: "ana.rojas@example.com".into(),
        category: UserCategory::Guardian,
        children: vec![Child {
            id: "child-1".into(),
            name: "Pedro Rojas".into(),
        }],
    }
}

/// Fetch an order back by id
pub async fn fetch_order(env: &TestEnv, order_id: &str) -> Order {
    env.store.find(order_id).await.expect("order exists")
}
