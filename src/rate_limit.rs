//! Per-IP rate limiting for the public router.
//!
//! Limits are expressed in requests per minute and come from `RateLimits`
//! in the config: a strict budget for /checkout (it opens provider-side
//! sessions), a standard one for the store-backed endpoints, and a relaxed
//! one for /health. The webhook endpoint is provider-authenticated and not
//! limited.

use std::sync::Arc;
use std::time::Duration;

use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::GovernorLayer;

pub type RateLimitLayer = GovernorLayer<
    tower_governor::key_extractor::PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    axum::body::Body,
>;

/// Build a per-IP limiter allowing `rpm` requests per minute, with a burst
/// allowance of the full minute's budget.
pub fn per_ip_layer(rpm: u32) -> RateLimitLayer {
    assert!(rpm > 0, "rate limit must be greater than 0");

    let config = GovernorConfigBuilder::default()
        .period(Duration::from_secs((60 / rpm as u64).max(1)))
        .burst_size(rpm)
        .finish()
        .expect("Failed to build rate limiter config");

    GovernorLayer::new(Arc::new(config))
}
