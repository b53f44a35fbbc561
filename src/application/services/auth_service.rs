//! Authentication, registration, and guest reconciliation.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde_json::json;
use tracing::warn;

use crate::domain::entities::{Identity, NewIdentity};
use crate::domain::reconciliation::ReconciliationSummary;
use crate::domain::repositories::IdentityRepository;
use crate::error::AppError;
use crate::infrastructure::jwt::{JwtIssuer, TokenPair};

/// An authenticated session: the identity plus its freshly issued tokens.
#[derive(Debug)]
pub struct Session {
    pub identity: Identity,
    pub tokens: TokenPair,
    /// Present when a guest identity was folded into this session's identity.
    pub reconciliation: Option<ReconciliationSummary>,
}

/// Service for sessions: guest provisioning, registration, login, token
/// refresh, and folding a guest identity into a registered one.
pub struct AuthService {
    identity_repository: Arc<dyn IdentityRepository>,
    jwt: Arc<JwtIssuer>,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(identity_repository: Arc<dyn IdentityRepository>, jwt: Arc<JwtIssuer>) -> Self {
        Self {
            identity_repository,
            jwt,
        }
    }

    /// Provisions an anonymous guest identity and issues tokens for it.
    pub async fn guest_session(&self) -> Result<Session, AppError> {
        let identity = self.identity_repository.create_guest().await?;
        let tokens = self.jwt.issue_pair(&identity)?;

        Ok(Session {
            identity,
            tokens,
            reconciliation: None,
        })
    }

    /// Registers a new account and signs it in.
    ///
    /// If the caller was browsing as a guest, passing that guest's token
    /// migrates the guest's links into the new account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the username or email is taken.
    pub async fn register(
        &self,
        username: String,
        email: String,
        password: &str,
        guest_token: Option<&str>,
    ) -> Result<Session, AppError> {
        let password_hash = hash_password(password)?;

        let identity = self
            .identity_repository
            .create_registered(NewIdentity {
                username,
                email,
                password_hash,
            })
            .await?;

        let reconciliation = self.reconcile_guest(guest_token, &identity).await?;
        let tokens = self.jwt.issue_pair(&identity)?;

        Ok(Session {
            identity,
            tokens,
            reconciliation,
        })
    }

    /// Authenticates by email and password.
    ///
    /// A guest token carried alongside the credentials migrates that guest's
    /// links into the signed-in account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for an unknown email or wrong
    /// password, without distinguishing the two.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        guest_token: Option<&str>,
    ) -> Result<Session, AppError> {
        let invalid = || AppError::unauthorized("Invalid email or password", json!({}));

        let credentials = self
            .identity_repository
            .find_credentials(email)
            .await?
            .ok_or_else(invalid)?;

        let hash = credentials.password_hash.as_deref().ok_or_else(invalid)?;
        verify_password(password, hash).map_err(|_| invalid())?;

        if !credentials.identity.is_active {
            return Err(AppError::forbidden("Account is disabled", json!({})));
        }

        let identity = credentials.identity;
        let reconciliation = self.reconcile_guest(guest_token, &identity).await?;
        let tokens = self.jwt.issue_pair(&identity)?;

        Ok(Session {
            identity,
            tokens,
            reconciliation,
        })
    }

    /// Exchanges a refresh token for a new token pair.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for an invalid or expired token or
    /// a missing/disabled identity.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let claims = self.jwt.decode_refresh(refresh_token)?;
        let identity_id = claims
            .identity_id()
            .ok_or_else(|| AppError::unauthorized("Invalid token subject", json!({})))?;

        let identity = self.active_identity(identity_id).await?;

        self.jwt.issue_pair(&identity)
    }

    /// Resolves the identity behind an access token, for request middleware.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for an invalid token or a
    /// missing/disabled identity.
    pub async fn current_identity(&self, access_token: &str) -> Result<Identity, AppError> {
        let claims = self.jwt.decode_access(access_token)?;
        let identity_id = claims
            .identity_id()
            .ok_or_else(|| AppError::unauthorized("Invalid token subject", json!({})))?;

        self.active_identity(identity_id).await
    }

    async fn active_identity(&self, identity_id: i64) -> Result<Identity, AppError> {
        let identity = self
            .identity_repository
            .find_by_id(identity_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Unknown identity", json!({})))?;

        if !identity.is_active {
            return Err(AppError::unauthorized("Account is disabled", json!({})));
        }

        Ok(identity)
    }

    /// Folds the guest behind `guest_token` into `target`, when applicable.
    ///
    /// Does nothing when the token is absent or invalid, names the target
    /// itself, or names an identity that is missing or not a guest. An actual
    /// reconciliation failure aborts the sign-in that triggered it: a token
    /// pair must never be issued on top of a half-migrated guest.
    async fn reconcile_guest(
        &self,
        guest_token: Option<&str>,
        target: &Identity,
    ) -> Result<Option<ReconciliationSummary>, AppError> {
        let Some(guest_id) = guest_token.and_then(|t| self.jwt.identity_id_if_valid(t)) else {
            return Ok(None);
        };
        if guest_id == target.id {
            return Ok(None);
        }

        let guest = match self.identity_repository.find_by_id(guest_id).await? {
            Some(identity) if identity.kind.is_guest() => identity,
            _ => return Ok(None),
        };

        self.identity_repository
            .adopt_guest(guest.id, target.id)
            .await
            .map(Some)
            .map_err(|e| {
                warn!(
                    guest_id = guest.id,
                    target_id = target.id,
                    error = %e,
                    "guest reconciliation failed"
                );
                AppError::internal(
                    "Guest reconciliation failed",
                    json!({ "guest_id": guest.id }),
                )
            })
    }
}

/// Hashes a password with Argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal("Password hashing failed", json!({ "reason": e.to_string() })))
}

fn verify_password(password: &str, hash: &str) -> Result<(), argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    Argon2::default().verify_password(password.as_bytes(), &parsed)
}
