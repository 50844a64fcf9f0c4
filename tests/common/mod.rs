//! Test utilities and fixtures for signal-checkout integration tests

#![allow(dead_code)]

use axum::routing::post;
use axum::Router;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

pub use signal_checkout::db::{init_db, queries, AppState, DbPool};
pub use signal_checkout::handlers::{
    create_booking, create_checkout, handle_stripe_webhook, submit_intake, verify_payment,
};
pub use signal_checkout::models::*;
pub use signal_checkout::payments::{PriceTable, StripeClient, StripeConfig};

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test123secret456";

pub fn test_stripe_config() -> StripeConfig {
    StripeConfig {
        secret_key: "sk_test_xxx".to_string(),
        webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
    }
}

pub fn test_stripe_client() -> StripeClient {
    StripeClient::new(&test_stripe_config())
}

/// Create an in-memory test database with schema initialized
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

/// Create an AppState backed by a single-connection in-memory pool.
/// A single connection keeps fixtures and handlers on the same database.
pub fn create_test_app_state() -> AppState {
    let manager = SqliteConnectionManager::memory();
    let pool: DbPool = Pool::builder().max_size(1).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
    }

    AppState {
        db: pool,
        stripe: test_stripe_client(),
        calendar: None,
        prices: PriceTable::default(),
        frontend_url: "http://localhost:5173".to_string(),
    }
}

/// AppState with price ids configured for both product types.
pub fn create_test_app_state_with_prices() -> AppState {
    let mut state = create_test_app_state();
    state.prices = PriceTable {
        resume_text: Some("price_test_resume".to_string()),
        premium_coaching: Some("price_test_coaching".to_string()),
    };
    state
}

/// Router with all endpoints (without rate limiting for tests)
pub fn test_app(state: AppState) -> Router {
    Router::new()
        .route("/checkout", post(create_checkout))
        .route("/verify", post(verify_payment))
        .route("/intake", post(submit_intake))
        .route("/booking", post(create_booking))
        .route("/webhook/stripe", post(handle_stripe_webhook))
        .with_state(state)
}

/// Create a pending test order
pub fn create_test_order(conn: &Connection, tier: Tier) -> Order {
    queries::create_order(
        conn,
        &CreateOrder {
            email: "customer@example.com".to_string(),
            full_name: "Test Customer".to_string(),
            tier,
        },
    )
    .expect("Failed to create test order")
}

/// Create an order already transitioned to `paid` with a payment intent
pub fn create_paid_test_order(conn: &Connection, tier: Tier, payment_intent: &str) -> Order {
    let order = create_test_order(conn, tier);
    let updated = queries::mark_order_paid(
        conn,
        &order.request_id,
        Some(payment_intent),
        tier.product_type().paid_label(),
    )
    .expect("Failed to mark test order paid");
    assert!(updated, "Marking a fresh order paid should succeed");
    queries::get_order_by_request_id(conn, &order.request_id)
        .expect("Failed to reload test order")
        .expect("Test order should exist")
}

/// Get the current timestamp
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
