use serde::{Deserialize, Serialize};

/// Questionnaire response for a paid order. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeResponse {
    pub id: String,
    pub order_request_id: String,
    pub full_name: String,
    pub email: String,
    pub current_status: String,
    pub target_roles: String,
    pub biggest_challenge: String,
    pub resume_url: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateIntake {
    pub order_request_id: String,
    pub full_name: String,
    pub email: String,
    pub current_status: String,
    pub target_roles: String,
    pub biggest_challenge: String,
    #[serde(default)]
    pub resume_url: Option<String>,
}
