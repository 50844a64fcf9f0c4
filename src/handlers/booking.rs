use axum::extract::State;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::EventRequest;
use crate::db::{queries, AppState};
use crate::error::{msg, AppError, Result};
use crate::extractors::Json;
use crate::models::{Booking, CreateBooking, FulfillmentStatus, PaymentStatus};

#[derive(Debug, Deserialize)]
pub struct BookingRequest {
    pub order_id: String,
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub success: bool,
    pub booking: Booking,
    /// Whether the external calendar invite was created. The booking itself
    /// persists either way.
    pub calendar_integration: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_error: Option<String>,
}

/// Book a session for a paid coaching order, with a best-effort calendar
/// invite. Calendar faults are reported in the response, never propagated.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<BookingRequest>,
) -> Result<Json<BookingResponse>> {
    let conn = state.db.get()?;

    let order = queries::get_order_by_request_id(&conn, &request.order_id)?
        .ok_or_else(|| AppError::NotFound(msg::ORDER_NOT_FOUND.into()))?;

    // Tier check comes first: a text-review order can never book, paid or not.
    if !order.tier.includes_booking() {
        return Err(AppError::BadRequest(msg::BOOKING_NOT_AVAILABLE.into()));
    }

    if order.payment_status != PaymentStatus::Paid {
        return Err(AppError::Conflict(msg::ORDER_NOT_PAID.into()));
    }

    let mut booking = queries::create_booking(
        &conn,
        &CreateBooking {
            order_request_id: order.request_id.clone(),
            scheduled_at: request.scheduled_at.timestamp(),
        },
    )?;

    let calendar_error = match &state.calendar {
        Some(calendar) => {
            let event = EventRequest {
                summary: format!("Signal Coaching Session - {}", order.full_name),
                description: format!(
                    "Coaching session with {} ({})",
                    order.full_name, order.email
                ),
                start: request.scheduled_at,
                end: request.scheduled_at + Duration::hours(1),
                attendee_email: &order.email,
            };

            match calendar.create_event(&event).await {
                Ok(created) => {
                    queries::confirm_booking_calendar(&conn, &booking.id, &created.id)?;
                    booking.google_event_id = Some(created.id);
                    booking.confirmed = true;
                    None
                }
                Err(e) => {
                    tracing::warn!(
                        "calendar event failed for booking {}: {}",
                        booking.id,
                        e
                    );
                    Some(e.to_string())
                }
            }
        }
        None => Some(msg::CALENDAR_NOT_CONFIGURED.to_string()),
    };

    queries::set_order_fulfillment(&conn, &order.request_id, FulfillmentStatus::Booked)?;

    tracing::info!(
        "booking created: request_id={}, booking_id={}, calendar={}",
        order.request_id,
        booking.id,
        calendar_error.is_none()
    );

    Ok(Json(BookingResponse {
        success: true,
        booking,
        calendar_integration: calendar_error.is_none(),
        calendar_error,
    }))
}
