//! Repository trait for click recording and analytics.

use crate::domain::entities::{Click, ClickDimensions, DimensionIds, NewClick};
use crate::error::AppError;
use async_trait::async_trait;

/// Aggregated analytics for a single link.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkAnalytics {
    pub total_clicks: i64,
    pub successful_redirects: i64,
    pub failed_redirects: i64,
    pub countries: Vec<String>,
    pub browsers: Vec<String>,
    pub platforms: Vec<String>,
    pub devices: Vec<String>,
}

/// Repository interface for click tracking.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Upserts the four dimension rows for one observation.
    ///
    /// Each upsert is an atomic get-or-create-then-increment from the store's
    /// perspective: concurrent identical observations must neither create
    /// duplicate rows nor lose increments.
    async fn observe_dimensions(
        &self,
        dimensions: &ClickDimensions,
    ) -> Result<DimensionIds, AppError>;

    /// Inserts a click row with `redirected = false`.
    async fn insert(&self, new_click: NewClick) -> Result<Click, AppError>;

    /// Flips `redirected` to true on a recorded click.
    async fn mark_redirected(&self, click_id: i64) -> Result<(), AppError>;

    /// Aggregates click analytics for one link: totals plus the distinct
    /// dimension names observed.
    async fn summarize(&self, link_id: i64) -> Result<LinkAnalytics, AppError>;
}
