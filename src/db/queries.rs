use chrono::Utc;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

use super::from_row::{query_one, BOOKING_COLS, INTAKE_COLS, ORDER_COLS};

fn now() -> i64 {
    Utc::now().timestamp()
}

fn gen_id() -> String {
    Uuid::new_v4().to_string()
}

// ============ Orders ============

/// Create an order in `pending` state with no provider references.
/// The request id is assigned here and never changes.
pub fn create_order(conn: &Connection, input: &CreateOrder) -> Result<Order> {
    let request_id = gen_id();
    let now = now();
    let email = input.email.trim().to_lowercase();
    let full_name = input.full_name.trim().to_string();
    let product_type = input.tier.product_type();

    conn.execute(
        "INSERT INTO orders (request_id, email, full_name, tier, product_type, amount_cents,
                             payment_status, fulfillment_status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'pending', 'new', ?7, ?7)",
        params![
            &request_id,
            &email,
            &full_name,
            input.tier.to_string(),
            product_type.to_string(),
            product_type.amount_cents(),
            now
        ],
    )?;

    Ok(Order {
        request_id,
        email,
        full_name,
        tier: input.tier,
        product_type,
        amount_cents: product_type.amount_cents(),
        stripe_session_id: None,
        stripe_payment_intent_id: None,
        payment_status: PaymentStatus::Pending,
        fulfillment_status: FulfillmentStatus::New,
        created_at: now,
        updated_at: now,
    })
}

pub fn get_order_by_request_id(conn: &Connection, request_id: &str) -> Result<Option<Order>> {
    query_one(
        conn,
        &format!("SELECT {} FROM orders WHERE request_id = ?1", ORDER_COLS),
        &[&request_id],
    )
}

pub fn get_order_by_session_id(conn: &Connection, session_id: &str) -> Result<Option<Order>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM orders WHERE stripe_session_id = ?1",
            ORDER_COLS
        ),
        &[&session_id],
    )
}

pub fn get_order_by_payment_intent(
    conn: &Connection,
    payment_intent_id: &str,
) -> Result<Option<Order>> {
    query_one(
        conn,
        &format!(
            "SELECT {} FROM orders WHERE stripe_payment_intent_id = ?1",
            ORDER_COLS
        ),
        &[&payment_intent_id],
    )
}

/// Attach the hosted checkout session reference after session creation.
pub fn set_order_session(conn: &Connection, request_id: &str, session_id: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE orders SET stripe_session_id = ?2, updated_at = ?3 WHERE request_id = ?1",
        params![request_id, session_id, now()],
    )?;
    Ok(affected > 0)
}

/// Transition an order to `paid`, recording the payment intent and the
/// fulfillment label. Guarded on the current status so redelivered or
/// out-of-order completion events are no-ops: returns false when the order
/// is not in `pending`, and the payment intent reference is only ever
/// written by the first effective call.
pub fn mark_order_paid(
    conn: &Connection,
    request_id: &str,
    payment_intent_id: Option<&str>,
    fulfillment: FulfillmentStatus,
) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE orders
         SET payment_status = 'paid', stripe_payment_intent_id = ?2,
             fulfillment_status = ?3, updated_at = ?4
         WHERE request_id = ?1 AND payment_status = 'pending'",
        params![request_id, payment_intent_id, fulfillment.to_string(), now()],
    )?;
    Ok(affected > 0)
}

/// Transition an order to `failed`. Guarded so a failure event for a stale
/// attempt never regresses an order that already reached `paid`.
pub fn mark_order_failed(conn: &Connection, request_id: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE orders SET payment_status = 'failed', updated_at = ?2
         WHERE request_id = ?1 AND payment_status = 'pending'",
        params![request_id, now()],
    )?;
    Ok(affected > 0)
}

/// Transition an order to `refunded`, located by its stored payment intent
/// reference (refund events do not carry checkout metadata).
pub fn mark_order_refunded(conn: &Connection, payment_intent_id: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE orders SET payment_status = 'refunded', updated_at = ?2
         WHERE stripe_payment_intent_id = ?1 AND payment_status = 'paid'",
        params![payment_intent_id, now()],
    )?;
    Ok(affected > 0)
}

/// Advance the post-payment workflow label.
pub fn set_order_fulfillment(
    conn: &Connection,
    request_id: &str,
    status: FulfillmentStatus,
) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE orders SET fulfillment_status = ?2, updated_at = ?3 WHERE request_id = ?1",
        params![request_id, status.to_string(), now()],
    )?;
    Ok(affected > 0)
}

// ============ Bookings ============

pub fn create_booking(conn: &Connection, input: &CreateBooking) -> Result<Booking> {
    let id = gen_id();
    let now = now();

    conn.execute(
        "INSERT INTO bookings (id, order_request_id, scheduled_at, confirmed, created_at)
         VALUES (?1, ?2, ?3, 0, ?4)",
        params![&id, &input.order_request_id, input.scheduled_at, now],
    )?;

    Ok(Booking {
        id,
        order_request_id: input.order_request_id.clone(),
        scheduled_at: input.scheduled_at,
        confirmed: false,
        google_event_id: None,
        created_at: now,
    })
}

/// Stamp the external calendar event onto a booking and confirm it.
pub fn confirm_booking_calendar(
    conn: &Connection,
    booking_id: &str,
    google_event_id: &str,
) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE bookings SET google_event_id = ?2, confirmed = 1 WHERE id = ?1",
        params![booking_id, google_event_id],
    )?;
    Ok(affected > 0)
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> Result<Option<Booking>> {
    query_one(
        conn,
        &format!("SELECT {} FROM bookings WHERE id = ?1", BOOKING_COLS),
        &[&id],
    )
}

// ============ Intake responses ============

pub fn create_intake(conn: &Connection, input: &CreateIntake) -> Result<IntakeResponse> {
    let id = gen_id();
    let now = now();
    let email = input.email.trim().to_lowercase();

    conn.execute(
        "INSERT INTO intake_responses (id, order_request_id, full_name, email, current_status,
                                       target_roles, biggest_challenge, resume_url, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            &id,
            &input.order_request_id,
            input.full_name.trim(),
            &email,
            &input.current_status,
            &input.target_roles,
            &input.biggest_challenge,
            &input.resume_url,
            now
        ],
    )?;

    Ok(IntakeResponse {
        id,
        order_request_id: input.order_request_id.clone(),
        full_name: input.full_name.trim().to_string(),
        email,
        current_status: input.current_status.clone(),
        target_roles: input.target_roles.clone(),
        biggest_challenge: input.biggest_challenge.clone(),
        resume_url: input.resume_url.clone(),
        created_at: now,
    })
}

pub fn get_intake_by_id(conn: &Connection, id: &str) -> Result<Option<IntakeResponse>> {
    query_one(
        conn,
        &format!("SELECT {} FROM intake_responses WHERE id = ?1", INTAKE_COLS),
        &[&id],
    )
}
