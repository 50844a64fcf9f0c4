use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Purchasable tier, as selected on the pricing page.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Tier {
    TextReview,
    Coaching,
}

impl Tier {
    /// The billable product behind the tier. Fixed mapping; a tier never
    /// resolves to more than one product.
    pub fn product_type(self) -> ProductType {
        match self {
            Tier::TextReview => ProductType::ResumeText,
            Tier::Coaching => ProductType::PremiumCoaching,
        }
    }

    /// Whether the tier entitles the customer to book a live session.
    pub fn includes_booking(self) -> bool {
        matches!(self, Tier::Coaching)
    }
}

/// Billable product type, embedded in provider metadata so webhook events
/// can derive the fulfillment label without a second lookup.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProductType {
    ResumeText,
    PremiumCoaching,
}

impl ProductType {
    pub fn amount_cents(self) -> i64 {
        match self {
            ProductType::ResumeText => 9900,
            ProductType::PremiumCoaching => 29900,
        }
    }

    /// Fulfillment label applied when a payment for this product completes.
    pub fn paid_label(self) -> FulfillmentStatus {
        match self {
            ProductType::ResumeText => FulfillmentStatus::PaidResumeText,
            ProductType::PremiumCoaching => FulfillmentStatus::PaidCoaching,
        }
    }
}

/// Payment state of an order. Transitions are monotone:
/// `pending -> paid`, `pending -> failed`, `paid -> refunded`.
/// Enforced by conditional updates in `db::queries`, never by callers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

/// Post-payment workflow label. Closed vocabulary, validated at the
/// boundary - there is no free-form status text in the store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FulfillmentStatus {
    New,
    PaidResumeText,
    PaidCoaching,
    IntakeComplete,
    Booked,
}

/// An order tracks a purchase from checkout through fulfillment.
/// `request_id` is assigned once at creation and safe to embed in URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub request_id: String,
    pub email: String,
    pub full_name: String,
    pub tier: Tier,
    pub product_type: ProductType,
    pub amount_cents: i64,
    /// Hosted checkout session reference, set once after session creation.
    pub stripe_session_id: Option<String>,
    /// Payment intent reference, set once by the webhook on the first
    /// successful completion event. Refund events are matched against it.
    pub stripe_payment_intent_id: Option<String>,
    pub payment_status: PaymentStatus,
    pub fulfillment_status: FulfillmentStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrder {
    pub email: String,
    pub full_name: String,
    pub tier: Tier,
}
