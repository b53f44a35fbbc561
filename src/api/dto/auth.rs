//! DTOs for the authentication endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::auth_service::Session;
use crate::domain::entities::Identity;
use crate::domain::reconciliation::ReconciliationSummary;

/// Request to register a new account.
///
/// `guest_token` optionally carries the access token of the guest session the
/// caller was browsing with, so the guest's links follow them into the new
/// account.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 30))]
    pub username: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    pub guest_token: Option<String>,
}

/// Request to sign in with email and password.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    pub guest_token: Option<String>,
}

/// Request to exchange a refresh token for a new pair.
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh: String,
}

/// Public view of an identity.
#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub kind: &'static str,
}

impl From<&Identity> for IdentityResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            id: identity.id,
            username: identity.username.clone(),
            email: identity.email.clone(),
            kind: identity.kind.as_str(),
        }
    }
}

/// What a guest-to-account migration did, when one ran.
#[derive(Debug, Serialize)]
pub struct ReconciliationResponse {
    pub links_transferred: u64,
    pub links_merged: u64,
    pub clicks_rewritten: u64,
}

impl From<ReconciliationSummary> for ReconciliationResponse {
    fn from(summary: ReconciliationSummary) -> Self {
        Self {
            links_transferred: summary.links_transferred,
            links_merged: summary.links_merged,
            clicks_rewritten: summary.clicks_rewritten,
        }
    }
}

/// Response for all session-creating endpoints.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub identity: IdentityResponse,
    pub access: String,
    pub refresh: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconciliation: Option<ReconciliationResponse>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            identity: IdentityResponse::from(&session.identity),
            access: session.tokens.access,
            refresh: session.tokens.refresh,
            reconciliation: session.reconciliation.map(Into::into),
        }
    }
}

/// Response for the token refresh endpoint.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
}
