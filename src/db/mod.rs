mod from_row;
mod schema;
pub mod queries;

pub use schema::init_db;

use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::calendar::GoogleCalendarClient;
use crate::payments::{PriceTable, StripeClient};

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state holding the database pool and the injected external
/// clients. Handlers receive everything through here; there are no
/// module-level singletons, so tests can substitute fakes freely.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub stripe: StripeClient,
    /// Absent when calendar credentials are not configured; booking then
    /// reports the integration as unavailable instead of failing.
    pub calendar: Option<Arc<GoogleCalendarClient>>,
    /// Stripe price ids per product type.
    pub prices: PriceTable,
    /// Origin of the customer-facing pages (success/cancel redirects).
    pub frontend_url: String,
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path);
    Pool::builder().max_size(10).build(manager)
}
