//! Redirect resolution with synchronous click recording.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::debug;

use crate::domain::entities::NewClick;
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::error::AppError;
use crate::infrastructure::geoip::{GeoResolver, UNKNOWN};
use crate::infrastructure::user_agent::parse_user_agent;

/// Service backing the redirect endpoint.
///
/// Every hit on a known slug is recorded, whether or not the redirect is then
/// served: the click row is inserted with `redirected = false` before the
/// accessibility check and flipped only when the link is live. Geolocation is
/// best-effort and bounded by a timeout; a slow or missing database yields
/// the `"Unknown"` country, never a failed redirect.
pub struct RedirectService {
    link_repository: Arc<dyn LinkRepository>,
    click_repository: Arc<dyn ClickRepository>,
    geo_resolver: Arc<dyn GeoResolver>,
    geo_timeout: Duration,
}

impl RedirectService {
    /// Creates a new redirect service.
    pub fn new(
        link_repository: Arc<dyn LinkRepository>,
        click_repository: Arc<dyn ClickRepository>,
        geo_resolver: Arc<dyn GeoResolver>,
        geo_timeout: Duration,
    ) -> Self {
        Self {
            link_repository,
            click_repository,
            geo_resolver,
            geo_timeout,
        }
    }

    /// Resolves a slug to its destination, recording the click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown slug and
    /// [`AppError::NotAccessible`] for an inactive or expired link. The
    /// latter is returned only after the click has been recorded.
    pub async fn resolve_and_record(
        &self,
        slug: &str,
        ip: IpAddr,
        user_agent: Option<&str>,
    ) -> Result<String, AppError> {
        let link = self
            .link_repository
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "slug": slug })))?;

        let country = self.resolve_country(ip).await;
        let dimensions = parse_user_agent(user_agent).into_dimensions(country);
        let dimension_ids = self.click_repository.observe_dimensions(&dimensions).await?;

        let click = self
            .click_repository
            .insert(NewClick {
                link_id: link.id,
                owner_id: link.owner_id,
                ip: ip.to_string(),
                dimensions: dimension_ids,
            })
            .await?;

        if !link.is_accessible() {
            return Err(AppError::not_accessible(
                "Short link is no longer available",
                json!({ "slug": slug }),
            ));
        }

        self.click_repository.mark_redirected(click.id).await?;

        Ok(link.original_url)
    }

    async fn resolve_country(&self, ip: IpAddr) -> String {
        match tokio::time::timeout(self.geo_timeout, self.geo_resolver.resolve_country(ip)).await {
            Ok(Ok(country)) => country,
            Ok(Err(e)) => {
                debug!(ip = %ip, error = %e, "geolocation lookup failed");
                UNKNOWN.to_string()
            }
            Err(_) => {
                debug!(ip = %ip, "geolocation lookup timed out");
                UNKNOWN.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Click, DimensionIds, Link};
    use crate::domain::repositories::{MockClickRepository, MockLinkRepository};
    use crate::infrastructure::geoip::{GeoResolveError, MockGeoResolver, NullResolver};
    use chrono::{Duration as ChronoDuration, Utc};

    const UA_CHROME_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
        AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

    fn live_link() -> Link {
        Link {
            id: 1,
            owner_id: Some(7),
            original_url: "https://example.com/".to_string(),
            slug: "aB3xZ9".to_string(),
            customized: false,
            is_active: true,
            expires_at: None,
            created_at: Utc::now(),
        }
    }

    fn expired_link() -> Link {
        Link {
            expires_at: Some(Utc::now() - ChronoDuration::hours(1)),
            ..live_link()
        }
    }

    fn dimension_ids() -> DimensionIds {
        DimensionIds {
            country_id: 1,
            browser_id: 2,
            platform_id: 3,
            device_id: 4,
        }
    }

    fn recorded_click(id: i64, link_id: i64) -> Click {
        Click {
            id,
            link_id,
            owner_id: Some(7),
            clicked_at: Utc::now(),
            ip: "203.0.113.7".to_string(),
            redirected: false,
        }
    }

    fn service(
        links: MockLinkRepository,
        clicks: MockClickRepository,
        geo: Arc<dyn GeoResolver>,
    ) -> RedirectService {
        RedirectService::new(
            Arc::new(links),
            Arc::new(clicks),
            geo,
            Duration::from_millis(100),
        )
    }

    #[tokio::test]
    async fn test_redirect_records_click_and_marks_redirected() {
        let mut links = MockLinkRepository::new();
        let mut clicks = MockClickRepository::new();
        let mut geo = MockGeoResolver::new();

        links
            .expect_find_by_slug()
            .withf(|slug| slug == "aB3xZ9")
            .times(1)
            .returning(|_| Ok(Some(live_link())));
        geo.expect_resolve_country()
            .times(1)
            .returning(|_| Ok("Germany".to_string()));
        clicks
            .expect_observe_dimensions()
            .withf(|dims| dims.country == "Germany" && dims.browser == "Chrome")
            .times(1)
            .returning(|_| Ok(dimension_ids()));
        clicks
            .expect_insert()
            .withf(|c| c.link_id == 1 && c.owner_id == Some(7))
            .times(1)
            .returning(|c| Ok(recorded_click(42, c.link_id)));
        clicks
            .expect_mark_redirected()
            .withf(|id| *id == 42)
            .times(1)
            .returning(|_| Ok(()));

        let service = service(links, clicks, Arc::new(geo));
        let destination = service
            .resolve_and_record("aB3xZ9", "203.0.113.7".parse().unwrap(), Some(UA_CHROME_MAC))
            .await
            .unwrap();

        assert_eq!(destination, "https://example.com/");
    }

    #[tokio::test]
    async fn test_unknown_slug_records_nothing() {
        let mut links = MockLinkRepository::new();
        let mut clicks = MockClickRepository::new();

        links.expect_find_by_slug().times(1).returning(|_| Ok(None));
        clicks.expect_observe_dimensions().times(0);
        clicks.expect_insert().times(0);

        let service = service(links, clicks, Arc::new(NullResolver));
        let result = service
            .resolve_and_record("nope", "203.0.113.7".parse().unwrap(), None)
            .await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_expired_link_records_click_but_refuses_redirect() {
        let mut links = MockLinkRepository::new();
        let mut clicks = MockClickRepository::new();

        links
            .expect_find_by_slug()
            .times(1)
            .returning(|_| Ok(Some(expired_link())));
        clicks
            .expect_observe_dimensions()
            .times(1)
            .returning(|_| Ok(dimension_ids()));
        clicks
            .expect_insert()
            .times(1)
            .returning(|c| Ok(recorded_click(42, c.link_id)));
        clicks.expect_mark_redirected().times(0);

        let service = service(links, clicks, Arc::new(NullResolver));
        let result = service
            .resolve_and_record("aB3xZ9", "203.0.113.7".parse().unwrap(), None)
            .await;

        assert!(matches!(result, Err(AppError::NotAccessible { .. })));
    }

    #[tokio::test]
    async fn test_geolocation_failure_degrades_to_unknown() {
        let mut links = MockLinkRepository::new();
        let mut clicks = MockClickRepository::new();
        let mut geo = MockGeoResolver::new();

        links
            .expect_find_by_slug()
            .times(1)
            .returning(|_| Ok(Some(live_link())));
        geo.expect_resolve_country()
            .times(1)
            .returning(|_| Err(GeoResolveError::Lookup("corrupt database".to_string())));
        clicks
            .expect_observe_dimensions()
            .withf(|dims| dims.country == UNKNOWN)
            .times(1)
            .returning(|_| Ok(dimension_ids()));
        clicks
            .expect_insert()
            .times(1)
            .returning(|c| Ok(recorded_click(42, c.link_id)));
        clicks
            .expect_mark_redirected()
            .times(1)
            .returning(|_| Ok(()));

        let service = service(links, clicks, Arc::new(geo));
        let destination = service
            .resolve_and_record("aB3xZ9", "203.0.113.7".parse().unwrap(), None)
            .await
            .unwrap();

        assert_eq!(destination, "https://example.com/");
    }

    #[tokio::test]
    async fn test_missing_user_agent_degrades_to_unknown_dimensions() {
        let mut links = MockLinkRepository::new();
        let mut clicks = MockClickRepository::new();

        links
            .expect_find_by_slug()
            .times(1)
            .returning(|_| Ok(Some(live_link())));
        clicks
            .expect_observe_dimensions()
            .withf(|dims| {
                dims.browser == UNKNOWN && dims.platform == UNKNOWN && dims.device == UNKNOWN
            })
            .times(1)
            .returning(|_| Ok(dimension_ids()));
        clicks
            .expect_insert()
            .times(1)
            .returning(|c| Ok(recorded_click(42, c.link_id)));
        clicks
            .expect_mark_redirected()
            .times(1)
            .returning(|_| Ok(()));

        let service = service(links, clicks, Arc::new(NullResolver));
        let destination = service
            .resolve_and_record("aB3xZ9", "203.0.113.7".parse().unwrap(), None)
            .await
            .unwrap();

        assert_eq!(destination, "https://example.com/");
    }
}
