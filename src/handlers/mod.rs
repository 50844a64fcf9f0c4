mod booking;
mod checkout;
mod intake;
mod verify;
pub mod webhooks;

pub use booking::*;
pub use checkout::*;
pub use intake::*;
pub use verify::*;
pub use webhooks::handle_stripe_webhook;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::config::RateLimits;
use crate::db::AppState;
use crate::rate_limit;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Public API router with per-tier rate limits.
pub fn router(limits: RateLimits) -> Router<AppState> {
    let strict = Router::new()
        .route("/checkout", post(create_checkout))
        .layer(rate_limit::per_ip_layer(limits.strict_rpm));

    let standard = Router::new()
        .route("/verify", post(verify_payment))
        .route("/intake", post(submit_intake))
        .route("/booking", post(create_booking))
        .layer(rate_limit::per_ip_layer(limits.standard_rpm));

    let relaxed = Router::new()
        .route("/health", get(health))
        .layer(rate_limit::per_ip_layer(limits.relaxed_rpm));

    Router::new().merge(strict).merge(standard).merge(relaxed)
}

/// Webhook router (provider-authenticated, not rate limited).
pub fn webhook_router() -> Router<AppState> {
    Router::new().route("/webhook/stripe", post(handle_stripe_webhook))
}
