use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::db::{queries, AppState};
use crate::error::{msg, AppError, Result};
use crate::extractors::Json;
use crate::models::{CreateOrder, Tier};

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub tier: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
    pub request_id: String,
}

/// Start a checkout: create the order, then open a hosted payment session
/// for it. The order row must exist first - the session's redirect URLs
/// and metadata embed its request id.
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    if request.tier.trim().is_empty()
        || request.email.trim().is_empty()
        || request.full_name.trim().is_empty()
    {
        return Err(AppError::BadRequest(msg::MISSING_CHECKOUT_FIELDS.into()));
    }

    let tier: Tier = request
        .tier
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Unknown tier: {}", request.tier)))?;

    let product_type = tier.product_type();
    let price_id = state
        .prices
        .for_product(product_type)
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "No payment plan configured for product type: {}",
                product_type
            ))
        })?
        .to_string();

    let conn = state.db.get()?;
    let order = queries::create_order(
        &conn,
        &CreateOrder {
            email: request.email,
            full_name: request.full_name,
            tier,
        },
    )?;

    let success_url = format!(
        "{}/success?session_id={{CHECKOUT_SESSION_ID}}&request_id={}",
        state.frontend_url, order.request_id
    );
    let cancel_url = format!("{}/checkout?canceled=true", state.frontend_url);

    let (session_id, checkout_url) = state
        .stripe
        .create_checkout_session(&order, &price_id, &success_url, &cancel_url)
        .await?;

    queries::set_order_session(&conn, &order.request_id, &session_id)?;

    tracing::info!(
        "checkout started: request_id={}, tier={}, session={}",
        order.request_id,
        tier,
        session_id
    );

    Ok(Json(CheckoutResponse {
        url: checkout_url,
        request_id: order.request_id,
    }))
}
