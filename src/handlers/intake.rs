use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::db::{queries, AppState};
use crate::error::{msg, AppError, Result};
use crate::extractors::Json;
use crate::models::{CreateIntake, FulfillmentStatus, IntakeResponse, PaymentStatus};

#[derive(Debug, Deserialize)]
pub struct IntakeRequest {
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub current_status: String,
    #[serde(default)]
    pub target_roles: String,
    #[serde(default)]
    pub biggest_challenge: String,
    #[serde(default)]
    pub resume_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IntakeSubmitResponse {
    pub success: bool,
    pub intake: IntakeResponse,
    /// Where the customer goes next: "booking" for coaching, "complete"
    /// otherwise.
    pub next_step: &'static str,
}

/// Record the questionnaire for a paid order and advance its workflow.
pub async fn submit_intake(
    State(state): State<AppState>,
    Json(request): Json<IntakeRequest>,
) -> Result<Json<IntakeSubmitResponse>> {
    let required = [
        &request.order_id,
        &request.full_name,
        &request.email,
        &request.current_status,
        &request.target_roles,
        &request.biggest_challenge,
    ];
    if required.iter().any(|f| f.trim().is_empty()) {
        return Err(AppError::BadRequest(msg::MISSING_INTAKE_FIELDS.into()));
    }

    let conn = state.db.get()?;

    let order = queries::get_order_by_request_id(&conn, &request.order_id)?
        .ok_or_else(|| AppError::NotFound(msg::ORDER_NOT_FOUND.into()))?;

    if order.payment_status != PaymentStatus::Paid {
        return Err(AppError::Conflict(msg::ORDER_NOT_PAID.into()));
    }

    let intake = queries::create_intake(
        &conn,
        &CreateIntake {
            order_request_id: order.request_id.clone(),
            full_name: request.full_name,
            email: request.email,
            current_status: request.current_status,
            target_roles: request.target_roles,
            biggest_challenge: request.biggest_challenge,
            resume_url: request.resume_url,
        },
    )?;

    queries::set_order_fulfillment(&conn, &order.request_id, FulfillmentStatus::IntakeComplete)?;

    let next_step = if order.tier.includes_booking() {
        "booking"
    } else {
        "complete"
    };

    tracing::info!(
        "intake submitted: request_id={}, intake_id={}, next_step={}",
        order.request_id,
        intake.id,
        next_step
    );

    Ok(Json(IntakeSubmitResponse {
        success: true,
        intake,
        next_step,
    }))
}
