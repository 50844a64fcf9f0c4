use chrono::{DateTime, Utc};
use jwt_simple::prelude::*;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

/// Service account credentials as exported from the Google Cloud console.
/// Only the fields needed for the JWT-bearer exchange are kept.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
}

#[derive(Serialize, Deserialize)]
struct TokenScopeClaims {
    scope: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// A created calendar event, as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    #[serde(rename = "htmlLink")]
    pub html_link: Option<String>,
}

/// Invite to create: a one-hour session with the customer as attendee.
#[derive(Debug)]
pub struct EventRequest<'a> {
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub attendee_email: &'a str,
}

/// Google Calendar client using the service-account JWT-bearer flow:
/// sign an RS256 assertion with the account's private key, exchange it at
/// the OAuth token endpoint, then call the Calendar API with the
/// short-lived access token.
#[derive(Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    key: ServiceAccountKey,
    calendar_id: String,
}

impl GoogleCalendarClient {
    pub fn new(key: ServiceAccountKey, calendar_id: String) -> Self {
        Self {
            client: Client::new(),
            key,
            calendar_id,
        }
    }

    /// Build a client from the raw service account JSON blob.
    pub fn from_json(credentials_json: &str, calendar_id: String) -> Result<Self> {
        let key: ServiceAccountKey = serde_json::from_str(credentials_json)
            .map_err(|e| AppError::Internal(format!("Invalid calendar credentials: {}", e)))?;
        Ok(Self::new(key, calendar_id))
    }

    async fn fetch_access_token(&self) -> Result<String> {
        let key_pair = RS256KeyPair::from_pem(&self.key.private_key)
            .map_err(|e| AppError::Internal(format!("Invalid calendar private key: {}", e)))?;

        let claims = Claims::with_custom_claims(
            TokenScopeClaims {
                scope: CALENDAR_SCOPE.to_string(),
            },
            Duration::from_hours(1),
        )
        .with_issuer(&self.key.client_email)
        .with_audience(TOKEN_URL);

        let assertion = key_pair
            .sign(claims)
            .map_err(|e| AppError::Internal(format!("Failed to sign calendar assertion: {}", e)))?;

        let response = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Google token exchange error: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!(
                "Google token exchange error: {}",
                error_text
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse token response: {}", e)))?;

        Ok(token.access_token)
    }

    /// Create the event and send invites. Callers treat failures as
    /// best-effort: a calendar fault must never fail the parent operation.
    pub async fn create_event(&self, event: &EventRequest<'_>) -> Result<CalendarEvent> {
        let access_token = self.fetch_access_token().await?;

        let url = format!(
            "https://www.googleapis.com/calendar/v3/calendars/{}/events?sendUpdates=all&conferenceDataVersion=1",
            urlencoding::encode(&self.calendar_id)
        );

        let body = serde_json::json!({
            "summary": event.summary,
            "description": event.description,
            "start": { "dateTime": event.start.to_rfc3339(), "timeZone": "UTC" },
            "end": { "dateTime": event.end.to_rfc3339(), "timeZone": "UTC" },
            "attendees": [ { "email": event.attendee_email } ],
            "conferenceData": {
                "createRequest": {
                    "requestId": uuid::Uuid::new_v4().to_string(),
                    "conferenceSolutionKey": { "type": "hangoutsMeet" },
                },
            },
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Calendar API error: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!(
                "Calendar API error: {}",
                error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse calendar response: {}", e)))
    }
}
