//! JWT issuance and validation.
//!
//! Bearer credentials are HS256 JWTs carrying the identity id, its kind tag,
//! and a token type discriminator so a refresh token cannot be replayed as an
//! access token. Guest tokens are ordinary access tokens; after reconciliation
//! deletes the guest identity they fail the existence check in the auth
//! middleware even though the signature still verifies.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::entities::Identity;
use crate::error::AppError;

/// Claims carried by every issued token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Identity id, stringified.
    pub sub: String,
    /// Identity kind tag at issuance time.
    pub kind: String,
    /// `"access"` or `"refresh"`.
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Parses the subject back into an identity id.
    pub fn identity_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// Access + refresh token pair returned by the auth endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Issues and validates bearer tokens.
pub struct JwtIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtIssuer {
    pub fn new(secret: &str, access_ttl_secs: u64, refresh_ttl_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::seconds(access_ttl_secs as i64),
            refresh_ttl: Duration::seconds(refresh_ttl_secs as i64),
        }
    }

    /// Issues an access/refresh pair for an identity.
    pub fn issue_pair(&self, identity: &Identity) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access: self.issue(identity, "access", self.access_ttl)?,
            refresh: self.issue(identity, "refresh", self.refresh_ttl)?,
        })
    }

    fn issue(
        &self,
        identity: &Identity,
        token_type: &str,
        ttl: Duration,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity.id.to_string(),
            kind: identity.kind.as_str().to_string(),
            token_type: token_type.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal("Failed to issue token", json!({ "reason": e.to_string() })))
    }

    /// Validates an access token and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for bad signatures, expired tokens,
    /// or a refresh token presented where an access token is expected.
    pub fn decode_access(&self, token: &str) -> Result<Claims, AppError> {
        self.decode_typed(token, "access")
    }

    /// Validates a refresh token and returns its claims.
    pub fn decode_refresh(&self, token: &str) -> Result<Claims, AppError> {
        self.decode_typed(token, "refresh")
    }

    fn decode_typed(&self, token: &str, expected_type: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|_| {
                AppError::unauthorized(
                    "Invalid or expired token",
                    json!({ "reason": "token validation failed" }),
                )
            })?;

        if data.claims.token_type != expected_type {
            return Err(AppError::unauthorized(
                "Invalid or expired token",
                json!({ "reason": "wrong token type" }),
            ));
        }

        Ok(data.claims)
    }

    /// Best-effort identity id from an access token.
    ///
    /// Used by the reconciler, where an absent or invalid token means "nothing
    /// to reconcile" rather than an error.
    pub fn identity_id_if_valid(&self, token: &str) -> Option<i64> {
        self.decode_access(token).ok().and_then(|c| c.identity_id())
    }
}
