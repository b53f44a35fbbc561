//! Per-link click analytics for registered owners.

use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::Identity;
use crate::domain::repositories::{ClickRepository, LinkAnalytics, LinkRepository};
use crate::error::AppError;

/// Service aggregating click analytics for a single link.
///
/// Analytics are owner-only and closed to guests: a guest sees 403, a
/// registered user asking about someone else's link sees the same 404 as for
/// an unknown id.
pub struct AnalyticsService {
    link_repository: Arc<dyn LinkRepository>,
    click_repository: Arc<dyn ClickRepository>,
}

impl AnalyticsService {
    /// Creates a new analytics service.
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        click_repository: Arc<dyn ClickRepository>,
    ) -> Self {
        Self {
            link_repository,
            click_repository,
        }
    }

    /// Returns click totals and distinct dimension values for one link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] for guests and [`AppError::NotFound`]
    /// for an unknown or foreign link id.
    pub async fn link_analytics(
        &self,
        identity: &Identity,
        link_id: i64,
    ) -> Result<LinkAnalytics, AppError> {
        if identity.kind.is_guest() {
            return Err(AppError::forbidden(
                "Analytics require a registered account",
                json!({}),
            ));
        }

        let link = self
            .link_repository
            .find_by_id(link_id)
            .await?
            .filter(|l| l.owner_id == Some(identity.id))
            .ok_or_else(|| AppError::not_found("Link not found", json!({ "id": link_id })))?;

        self.click_repository.summarize(link.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{IdentityKind, Link};
    use crate::domain::repositories::{MockClickRepository, MockLinkRepository};
    use chrono::Utc;

    fn user(id: i64, kind: IdentityKind) -> Identity {
        Identity {
            id,
            username: format!("user{id}"),
            email: None,
            kind,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn link(id: i64, owner_id: i64) -> Link {
        Link {
            id,
            owner_id: Some(owner_id),
            original_url: "https://example.com/".to_string(),
            slug: "aB3xZ9".to_string(),
            customized: false,
            is_active: true,
            expires_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_owner_gets_analytics() {
        let mut links = MockLinkRepository::new();
        let mut clicks = MockClickRepository::new();

        links
            .expect_find_by_id()
            .times(1)
            .returning(|id| Ok(Some(link(id, 7))));
        clicks.expect_summarize().times(1).returning(|_| {
            Ok(LinkAnalytics {
                total_clicks: 10,
                successful_redirects: 8,
                failed_redirects: 2,
                countries: vec!["Germany".to_string()],
                browsers: vec!["Chrome".to_string()],
                platforms: vec!["Mac OSX".to_string()],
                devices: vec!["PC".to_string()],
            })
        });

        let service = AnalyticsService::new(Arc::new(links), Arc::new(clicks));
        let analytics = service
            .link_analytics(&user(7, IdentityKind::Free), 5)
            .await
            .unwrap();

        assert_eq!(analytics.total_clicks, 10);
        assert_eq!(analytics.failed_redirects, 2);
    }

    #[tokio::test]
    async fn test_guest_is_forbidden() {
        let links = MockLinkRepository::new();
        let clicks = MockClickRepository::new();

        let service = AnalyticsService::new(Arc::new(links), Arc::new(clicks));
        let result = service.link_analytics(&user(3, IdentityKind::Guest), 5).await;

        assert!(matches!(result, Err(AppError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_foreign_link_looks_like_missing() {
        let mut links = MockLinkRepository::new();
        let mut clicks = MockClickRepository::new();

        links
            .expect_find_by_id()
            .times(1)
            .returning(|id| Ok(Some(link(id, 99))));
        clicks.expect_summarize().times(0);

        let service = AnalyticsService::new(Arc::new(links), Arc::new(clicks));
        let result = service.link_analytics(&user(7, IdentityKind::Free), 5).await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }
}
