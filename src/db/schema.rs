use rusqlite::Connection;

/// Initialize the database schema.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Orders (the central record; request_id is externally shareable)
        CREATE TABLE IF NOT EXISTS orders (
            request_id TEXT PRIMARY KEY,
            email TEXT NOT NULL,
            full_name TEXT NOT NULL,
            tier TEXT NOT NULL CHECK (tier IN ('text_review', 'coaching')),
            product_type TEXT NOT NULL CHECK (product_type IN ('resume_text', 'premium_coaching')),
            amount_cents INTEGER NOT NULL,
            stripe_session_id TEXT,
            stripe_payment_intent_id TEXT,
            payment_status TEXT NOT NULL DEFAULT 'pending'
                CHECK (payment_status IN ('pending', 'paid', 'failed', 'refunded')),
            fulfillment_status TEXT NOT NULL DEFAULT 'new'
                CHECK (fulfillment_status IN ('new', 'paid_resume_text', 'paid_coaching', 'intake_complete', 'booked')),
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_orders_session ON orders(stripe_session_id);
        -- Refund events carry only the payment intent, not our metadata
        CREATE INDEX IF NOT EXISTS idx_orders_payment_intent ON orders(stripe_payment_intent_id);

        -- Bookings (one-to-many from orders, append-only)
        CREATE TABLE IF NOT EXISTS bookings (
            id TEXT PRIMARY KEY,
            order_request_id TEXT NOT NULL REFERENCES orders(request_id),
            scheduled_at INTEGER NOT NULL,
            confirmed INTEGER NOT NULL DEFAULT 0,
            google_event_id TEXT,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_bookings_order ON bookings(order_request_id);

        -- Intake responses (one-to-many from orders, append-only)
        CREATE TABLE IF NOT EXISTS intake_responses (
            id TEXT PRIMARY KEY,
            order_request_id TEXT NOT NULL REFERENCES orders(request_id),
            full_name TEXT NOT NULL,
            email TEXT NOT NULL,
            current_status TEXT NOT NULL,
            target_roles TEXT NOT NULL,
            biggest_challenge TEXT NOT NULL,
            resume_url TEXT,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_intake_order ON intake_responses(order_request_id);
        "#,
    )
}
