//! Signal - checkout and fulfillment backend for a coaching/review service.
//!
//! A customer picks a tier, pays on a Stripe-hosted page, fills an intake
//! form, and (for coaching) books a session. Order state is reconciled
//! through webhook notifications with a polling fallback.

pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod payments;
pub mod rate_limit;
