//! Repository trait for identity storage and guest reconciliation.

use crate::domain::entities::{Identity, NewIdentity, StoredCredentials};
use crate::domain::reconciliation::ReconciliationSummary;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for identities and their profiles.
///
/// Identity and profile creation are a single transaction: there is no
/// signal-style hook that creates the profile later.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgIdentityRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Provisions a guest identity (plus its empty profile) with a generated
    /// username and no credentials.
    async fn create_guest(&self) -> Result<Identity, AppError>;

    /// Creates a registered identity and its profile in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the username or email is taken.
    async fn create_registered(&self, new_identity: NewIdentity) -> Result<Identity, AppError>;

    /// Finds an identity by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Identity>, AppError>;

    /// Finds an identity and its password hash by email, for login.
    async fn find_credentials(&self, email: &str) -> Result<Option<StoredCredentials>, AppError>;

    /// Consolidates a guest's links and click history into the target
    /// identity, then deletes the guest.
    ///
    /// The whole operation is one transaction: on any failure none of the
    /// mutation is visible. Merge rewrites click foreign keys onto the
    /// target's existing link and deletes the orphaned guest link; transfer
    /// reassigns link (and denormalized click) ownership.
    async fn adopt_guest(
        &self,
        guest_id: i64,
        target_id: i64,
    ) -> Result<ReconciliationSummary, AppError>;
}
