use serde::{Deserialize, Serialize};

/// A scheduled coaching session for a paid order. Append-only once created;
/// the only later mutation is stamping the calendar event on confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub order_request_id: String,
    /// Session start, unix seconds.
    pub scheduled_at: i64,
    pub confirmed: bool,
    /// External calendar event id, present when the invite was created.
    pub google_event_id: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateBooking {
    pub order_request_id: String,
    pub scheduled_at: i64,
}
