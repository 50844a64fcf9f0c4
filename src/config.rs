use std::env;

use crate::payments::{PriceTable, StripeConfig};

/// Per-tier request-per-minute limits for the public endpoints.
#[derive(Debug, Clone, Copy)]
pub struct RateLimits {
    pub strict_rpm: u32,
    pub standard_rpm: u32,
    pub relaxed_rpm: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Origin of the customer-facing pages; success/cancel URLs point here.
    pub frontend_url: String,
    pub stripe: StripeConfig,
    pub prices: PriceTable,
    /// Service account JSON for calendar invites; absent disables the
    /// integration without affecting bookings.
    pub google_calendar_credentials: Option<String>,
    pub google_calendar_id: Option<String>,
    pub rate_limits: RateLimits,
    pub dev_mode: bool,
}

fn env_rpm(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("SIGNAL_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "signal.db".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            stripe: StripeConfig {
                secret_key: env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
                webhook_secret: env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default(),
            },
            prices: PriceTable {
                resume_text: env::var("STRIPE_PRICE_RESUME_TEXT").ok(),
                premium_coaching: env::var("STRIPE_PRICE_PREMIUM_COACHING").ok(),
            },
            google_calendar_credentials: env::var("GOOGLE_CALENDAR_CREDENTIALS").ok(),
            google_calendar_id: env::var("GOOGLE_CALENDAR_ID").ok(),
            rate_limits: RateLimits {
                strict_rpm: env_rpm("RATE_LIMIT_STRICT_RPM", 10),
                standard_rpm: env_rpm("RATE_LIMIT_STANDARD_RPM", 30),
                relaxed_rpm: env_rpm("RATE_LIMIT_RELAXED_RPM", 60),
            },
            dev_mode,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
