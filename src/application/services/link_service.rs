//! Link creation and management service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::entities::{Identity, Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::slug::{generate_slug, validate_custom_slug};
use crate::utils::url_normalizer::normalize_url;

/// Result of a shorten call, distinguishing a fresh link from a reused one so
/// the handler can pick between 201 and 200.
#[derive(Debug, Clone)]
pub struct ShortenOutcome {
    pub link: Link,
    pub created: bool,
}

/// Service for creating, listing and deleting short links.
///
/// Handles URL normalization, slug allocation (generated or custom) and
/// per-owner deduplication. Slug uniqueness is ultimately enforced by the
/// store; this service only decides how to react to a collision.
pub struct LinkService {
    link_repository: Arc<dyn LinkRepository>,
    slug_length: usize,
}

impl LinkService {
    /// Creates a new link service. `slug_length` controls generated slugs;
    /// custom slugs carry their own length rules.
    pub fn new(link_repository: Arc<dyn LinkRepository>, slug_length: usize) -> Self {
        Self {
            link_repository,
            slug_length,
        }
    }

    /// Creates (or reuses) a short link for the caller.
    ///
    /// # Deduplication
    ///
    /// Resubmitting a destination the caller already shortened returns the
    /// existing link instead of minting a new slug. With a custom slug the
    /// existing link is re-pointed to the requested slug instead.
    ///
    /// # Slug allocation
    ///
    /// Generated slugs are allocated insert-first: the insert either wins or
    /// loses to a concurrent claim of the same slug, in which case a fresh
    /// slug is drawn. Custom slug collisions are surfaced to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a malformed URL or custom slug,
    /// [`AppError::Forbidden`] when a guest requests a custom slug, and
    /// [`AppError::SlugInUse`] when a custom slug is already taken.
    pub async fn shorten(
        &self,
        identity: &Identity,
        original_url: String,
        custom_slug: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ShortenOutcome, AppError> {
        let normalized_url = normalize_url(&original_url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        if let Some(custom) = custom_slug {
            return self
                .shorten_with_custom_slug(identity, normalized_url, custom, expires_at)
                .await;
        }

        if let Some(existing) = self
            .link_repository
            .find_by_owner_and_url(identity.id, &normalized_url)
            .await?
        {
            return Ok(ShortenOutcome {
                link: existing,
                created: false,
            });
        }

        let link = self
            .insert_with_generated_slug(identity.id, normalized_url, expires_at)
            .await?;

        Ok(ShortenOutcome {
            link,
            created: true,
        })
    }

    async fn shorten_with_custom_slug(
        &self,
        identity: &Identity,
        normalized_url: String,
        custom: String,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ShortenOutcome, AppError> {
        if identity.kind.is_guest() {
            return Err(AppError::forbidden(
                "Custom slugs require a registered account",
                json!({ "slug": custom }),
            ));
        }

        validate_custom_slug(&custom)?;

        if let Some(existing) = self
            .link_repository
            .find_by_owner_and_url(identity.id, &normalized_url)
            .await?
        {
            if existing.slug == custom {
                return Ok(ShortenOutcome {
                    link: existing,
                    created: false,
                });
            }

            let link = self
                .link_repository
                .replace_slug(existing.id, &custom)
                .await?;

            return Ok(ShortenOutcome {
                link,
                created: false,
            });
        }

        let link = self
            .link_repository
            .insert(NewLink {
                owner_id: identity.id,
                original_url: normalized_url,
                slug: custom,
                customized: true,
                expires_at,
            })
            .await?;

        Ok(ShortenOutcome {
            link,
            created: true,
        })
    }

    /// Draws generated slugs until an insert wins, up to 10 attempts.
    async fn insert_with_generated_slug(
        &self,
        owner_id: i64,
        normalized_url: String,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Link, AppError> {
        const MAX_ATTEMPTS: usize = 10;

        for _ in 0..MAX_ATTEMPTS {
            let slug = generate_slug(self.slug_length);

            match self
                .link_repository
                .insert(NewLink {
                    owner_id,
                    original_url: normalized_url.clone(),
                    slug,
                    customized: false,
                    expires_at,
                })
                .await
            {
                Ok(link) => return Ok(link),
                Err(AppError::SlugInUse { .. }) => continue,
                Err(other) => return Err(other),
            }
        }

        Err(AppError::internal(
            "Failed to allocate a unique slug",
            json!({ "reason": "Too many collisions" }),
        ))
    }

    /// Retrieves a link by id, visible only to its owner.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown id and, identically, for
    /// a link owned by someone else.
    pub async fn get_owned(&self, owner_id: i64, link_id: i64) -> Result<Link, AppError> {
        let link = self
            .link_repository
            .find_by_id(link_id)
            .await?
            .filter(|l| l.owner_id == Some(owner_id));

        link.ok_or_else(|| AppError::not_found("Link not found", json!({ "id": link_id })))
    }

    /// Lists the caller's links, newest first.
    pub async fn list(&self, owner_id: i64) -> Result<Vec<Link>, AppError> {
        self.link_repository.list_by_owner(owner_id).await
    }

    /// Deletes one of the caller's links, cascading its click history.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown or foreign link.
    pub async fn delete(&self, owner_id: i64, link_id: i64) -> Result<(), AppError> {
        let link = self.get_owned(owner_id, link_id).await?;

        if !self.link_repository.delete(link.id).await? {
            return Err(AppError::not_found(
                "Link not found",
                json!({ "id": link_id }),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::IdentityKind;
    use crate::domain::repositories::MockLinkRepository;

    fn free_user(id: i64) -> Identity {
        Identity {
            id,
            username: format!("user{id}"),
            email: Some(format!("user{id}@example.com")),
            kind: IdentityKind::Free,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn guest_user(id: i64) -> Identity {
        Identity {
            id,
            username: format!("guest_{id}"),
            email: None,
            kind: IdentityKind::Guest,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn link(id: i64, owner_id: i64, url: &str, slug: &str) -> Link {
        Link {
            id,
            owner_id: Some(owner_id),
            original_url: url.to_string(),
            slug: slug.to_string(),
            customized: false,
            is_active: true,
            expires_at: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_shorten_creates_new_link() {
        let mut repo = MockLinkRepository::new();

        repo.expect_find_by_owner_and_url()
            .withf(|owner, url| *owner == 7 && url == "https://example.com/")
            .times(1)
            .returning(|_, _| Ok(None));

        repo.expect_insert()
            .withf(|new_link| {
                new_link.owner_id == 7 && !new_link.customized && new_link.slug.len() == 6
            })
            .times(1)
            .returning(|new_link| Ok(link(10, 7, &new_link.original_url, &new_link.slug)));

        let service = LinkService::new(Arc::new(repo), 6);
        let outcome = service
            .shorten(&free_user(7), "https://EXAMPLE.com".to_string(), None, None)
            .await
            .unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.link.original_url, "https://example.com/");
    }

    #[tokio::test]
    async fn test_shorten_accepts_schemeless_destination() {
        let mut repo = MockLinkRepository::new();

        repo.expect_find_by_owner_and_url()
            .withf(|_, url| url == "https://example.com/some/page")
            .times(1)
            .returning(|_, _| Ok(None));
        repo.expect_insert()
            .withf(|new_link| new_link.original_url == "https://example.com/some/page")
            .times(1)
            .returning(|new_link| Ok(link(10, 7, &new_link.original_url, &new_link.slug)));

        let service = LinkService::new(Arc::new(repo), 6);
        let outcome = service
            .shorten(&free_user(7), "example.com/some/page".to_string(), None, None)
            .await
            .unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.link.original_url, "https://example.com/some/page");
    }

    #[tokio::test]
    async fn test_shorten_reuses_existing_link() {
        let mut repo = MockLinkRepository::new();

        repo.expect_find_by_owner_and_url()
            .times(1)
            .returning(|_, _| Ok(Some(link(5, 7, "https://example.com/", "aB3xZ9"))));
        repo.expect_insert().times(0);

        let service = LinkService::new(Arc::new(repo), 6);
        let outcome = service
            .shorten(&free_user(7), "https://example.com".to_string(), None, None)
            .await
            .unwrap();

        assert!(!outcome.created);
        assert_eq!(outcome.link.id, 5);
    }

    #[tokio::test]
    async fn test_shorten_rejects_invalid_url() {
        let repo = MockLinkRepository::new();
        let service = LinkService::new(Arc::new(repo), 6);

        let result = service
            .shorten(&free_user(7), "ftp://example.com".to_string(), None, None)
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_shorten_guest_cannot_use_custom_slug() {
        let repo = MockLinkRepository::new();
        let service = LinkService::new(Arc::new(repo), 6);

        let result = service
            .shorten(
                &guest_user(3),
                "https://example.com".to_string(),
                Some("my-page".to_string()),
                None,
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_shorten_custom_slug_creates_customized_link() {
        let mut repo = MockLinkRepository::new();

        repo.expect_find_by_owner_and_url()
            .times(1)
            .returning(|_, _| Ok(None));
        repo.expect_insert()
            .withf(|new_link| new_link.customized && new_link.slug == "my-page")
            .times(1)
            .returning(|new_link| {
                let mut l = link(11, 7, &new_link.original_url, &new_link.slug);
                l.customized = true;
                Ok(l)
            });

        let service = LinkService::new(Arc::new(repo), 6);
        let outcome = service
            .shorten(
                &free_user(7),
                "https://example.com".to_string(),
                Some("my-page".to_string()),
                None,
            )
            .await
            .unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.link.slug, "my-page");
    }

    #[tokio::test]
    async fn test_shorten_custom_slug_repoints_existing_link() {
        let mut repo = MockLinkRepository::new();

        repo.expect_find_by_owner_and_url()
            .times(1)
            .returning(|_, _| Ok(Some(link(5, 7, "https://example.com/", "aB3xZ9"))));
        repo.expect_replace_slug()
            .withf(|id, slug| *id == 5 && slug == "my-page")
            .times(1)
            .returning(|id, slug| {
                let mut l = link(id, 7, "https://example.com/", slug);
                l.customized = true;
                Ok(l)
            });
        repo.expect_insert().times(0);

        let service = LinkService::new(Arc::new(repo), 6);
        let outcome = service
            .shorten(
                &free_user(7),
                "https://example.com".to_string(),
                Some("my-page".to_string()),
                None,
            )
            .await
            .unwrap();

        assert!(!outcome.created);
        assert_eq!(outcome.link.slug, "my-page");
    }

    #[tokio::test]
    async fn test_shorten_custom_slug_conflict_surfaces() {
        let mut repo = MockLinkRepository::new();

        repo.expect_find_by_owner_and_url()
            .times(1)
            .returning(|_, _| Ok(None));
        repo.expect_insert()
            .times(1)
            .returning(|_| Err(AppError::slug_in_use("Slug already taken", json!({}))));

        let service = LinkService::new(Arc::new(repo), 6);
        let result = service
            .shorten(
                &free_user(7),
                "https://example.com".to_string(),
                Some("my-page".to_string()),
                None,
            )
            .await;

        assert!(matches!(result, Err(AppError::SlugInUse { .. })));
    }

    #[tokio::test]
    async fn test_generated_slug_retries_on_collision() {
        let mut repo = MockLinkRepository::new();
        let mut calls = 0;

        repo.expect_find_by_owner_and_url()
            .times(1)
            .returning(|_, _| Ok(None));
        repo.expect_insert().times(3).returning(move |new_link| {
            calls += 1;
            if calls < 3 {
                Err(AppError::slug_in_use("Slug already taken", json!({})))
            } else {
                Ok(link(20, 7, &new_link.original_url, &new_link.slug))
            }
        });

        let service = LinkService::new(Arc::new(repo), 6);
        let outcome = service
            .shorten(&free_user(7), "https://example.com".to_string(), None, None)
            .await
            .unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.link.id, 20);
    }

    #[tokio::test]
    async fn test_generated_slug_gives_up_after_exhausting_attempts() {
        let mut repo = MockLinkRepository::new();

        repo.expect_find_by_owner_and_url()
            .times(1)
            .returning(|_, _| Ok(None));
        repo.expect_insert()
            .times(10)
            .returning(|_| Err(AppError::slug_in_use("Slug already taken", json!({}))));

        let service = LinkService::new(Arc::new(repo), 6);
        let result = service
            .shorten(&free_user(7), "https://example.com".to_string(), None, None)
            .await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_get_owned_hides_foreign_links() {
        let mut repo = MockLinkRepository::new();

        repo.expect_find_by_id()
            .times(1)
            .returning(|id| Ok(Some(link(id, 99, "https://example.com/", "aB3xZ9"))));

        let service = LinkService::new(Arc::new(repo), 6);
        let result = service.get_owned(7, 5).await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_checks_ownership_before_deleting() {
        let mut repo = MockLinkRepository::new();

        repo.expect_find_by_id()
            .times(1)
            .returning(|id| Ok(Some(link(id, 7, "https://example.com/", "aB3xZ9"))));
        repo.expect_delete()
            .withf(|id| *id == 5)
            .times(1)
            .returning(|_| Ok(true));

        let service = LinkService::new(Arc::new(repo), 6);
        assert!(service.delete(7, 5).await.is_ok());
    }
}
