//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Parse a string column into an enum type, converting parse errors to
/// rusqlite errors instead of panicking on corrupted values.
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Trait for constructing a type from a database row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

// ============ SQL SELECT Constants ============

pub const ORDER_COLS: &str = "request_id, email, full_name, tier, product_type, amount_cents, stripe_session_id, stripe_payment_intent_id, payment_status, fulfillment_status, created_at, updated_at";

pub const BOOKING_COLS: &str =
    "id, order_request_id, scheduled_at, confirmed, google_event_id, created_at";

pub const INTAKE_COLS: &str = "id, order_request_id, full_name, email, current_status, target_roles, biggest_challenge, resume_url, created_at";

// ============ FromRow Implementations ============

impl FromRow for Order {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Order {
            request_id: row.get(0)?,
            email: row.get(1)?,
            full_name: row.get(2)?,
            tier: parse_enum(row, 3, "tier")?,
            product_type: parse_enum(row, 4, "product_type")?,
            amount_cents: row.get(5)?,
            stripe_session_id: row.get(6)?,
            stripe_payment_intent_id: row.get(7)?,
            payment_status: parse_enum(row, 8, "payment_status")?,
            fulfillment_status: parse_enum(row, 9, "fulfillment_status")?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }
}

impl FromRow for Booking {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Booking {
            id: row.get(0)?,
            order_request_id: row.get(1)?,
            scheduled_at: row.get(2)?,
            confirmed: row.get(3)?,
            google_event_id: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

impl FromRow for IntakeResponse {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(IntakeResponse {
            id: row.get(0)?,
            order_request_id: row.get(1)?,
            full_name: row.get(2)?,
            email: row.get(3)?,
            current_status: row.get(4)?,
            target_roles: row.get(5)?,
            biggest_challenge: row.get(6)?,
            resume_url: row.get(7)?,
            created_at: row.get(8)?,
        })
    }
}
