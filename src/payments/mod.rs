mod stripe;

pub use stripe::*;

use crate::models::ProductType;

/// Payment-plan mapping: the provider price id configured for each product
/// type. A missing entry means the product cannot be checked out.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    pub resume_text: Option<String>,
    pub premium_coaching: Option<String>,
}

impl PriceTable {
    pub fn for_product(&self, product_type: ProductType) -> Option<&str> {
        match product_type {
            ProductType::ResumeText => self.resume_text.as_deref(),
            ProductType::PremiumCoaching => self.premium_coaching.as_deref(),
        }
    }
}
