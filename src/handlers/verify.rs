use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::db::{queries, AppState};
use crate::error::{msg, AppError, Result};
use crate::extractors::Json;
use crate::models::{Order, PaymentStatus};

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub payment_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Client-triggered payment check. The order store is consulted first as
/// the source of truth; the provider is only queried as a fallback for the
/// window before the webhook has arrived. This path never writes `paid` -
/// that would race the webhook, which is the sole writer.
pub async fn verify_payment(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>> {
    if request.request_id.is_none() && request.session_id.is_none() {
        return Err(AppError::BadRequest(msg::MISSING_VERIFY_FIELDS.into()));
    }

    let conn = state.db.get()?;

    let mut order = match &request.request_id {
        Some(request_id) => queries::get_order_by_request_id(&conn, request_id)?,
        None => None,
    };
    if order.is_none() {
        if let Some(session_id) = &request.session_id {
            order = queries::get_order_by_session_id(&conn, session_id)?;
        }
    }

    if let Some(order) = &order {
        if order.payment_status == PaymentStatus::Paid {
            return Ok(Json(VerifyResponse {
                success: true,
                payment_status: order.payment_status.to_string(),
                order: Some(order.clone()),
                message: None,
            }));
        }
    }

    if let Some(session_id) = &request.session_id {
        let session = state.stripe.retrieve_checkout_session(session_id).await?;

        if session.payment_status == "paid" {
            // The provider confirms payment before our webhook lands; report
            // it, but leave the store untouched for the webhook to update.
            return Ok(Json(VerifyResponse {
                success: true,
                payment_status: session.payment_status,
                order,
                message: Some(msg::AWAITING_WEBHOOK.into()),
            }));
        }

        return Ok(Json(VerifyResponse {
            success: false,
            payment_status: session.payment_status,
            order,
            message: Some(msg::PAYMENT_NOT_COMPLETED.into()),
        }));
    }

    // No session to fall back to: report the order's current status, or
    // pending when no order has been seen for the identifier yet.
    let payment_status = order
        .as_ref()
        .map(|o| o.payment_status.to_string())
        .unwrap_or_else(|| PaymentStatus::Pending.to_string());

    Ok(Json(VerifyResponse {
        success: false,
        payment_status,
        order,
        message: Some(msg::PAYMENT_NOT_COMPLETED.into()),
    }))
}
