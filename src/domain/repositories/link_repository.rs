//! Repository trait for short link data access.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing short links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new short link.
    ///
    /// Slug uniqueness is enforced by the store; a concurrent insert of the
    /// same slug loses with [`AppError::SlugInUse`]. Callers retry (generated
    /// slugs) or surface the error (custom slugs).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SlugInUse`] on a slug unique violation and
    /// [`AppError::Internal`] on other database errors.
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its globally unique slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, AppError>;

    /// Finds a link by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError>;

    /// Finds the caller's existing link for a normalized destination URL.
    ///
    /// Used for idempotent submission: resubmitting the same destination
    /// returns the existing link instead of minting a new slug.
    async fn find_by_owner_and_url(
        &self,
        owner_id: i64,
        original_url: &str,
    ) -> Result<Option<Link>, AppError>;

    /// Replaces the slug on an existing link and marks it customized.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SlugInUse`] if the new slug is taken and
    /// [`AppError::NotFound`] if the link no longer exists.
    async fn replace_slug(&self, link_id: i64, slug: &str) -> Result<Link, AppError>;

    /// Lists all links owned by an identity, newest first.
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Link>, AppError>;

    /// Deletes a link by id, cascading its click history.
    ///
    /// Returns `Ok(true)` if a row was deleted.
    async fn delete(&self, link_id: i64) -> Result<bool, AppError>;
}
