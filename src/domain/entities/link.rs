//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// A shortened URL link with metadata.
///
/// The slug is globally unique across all links; the database constraint is
/// authoritative. `owner_id` is `None` only for rows created before ownership
/// was introduced; every API path attaches an owner (possibly a guest).
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    pub owner_id: Option<i64>,
    pub original_url: String,
    pub slug: String,
    pub customized: bool,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Returns true if the link has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|e| Utc::now() >= e)
    }

    /// A link is redirectable iff it is active and not expired.
    pub fn is_accessible(&self) -> bool {
        self.is_active && !self.is_expired()
    }
}

/// Input data for creating a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub owner_id: i64,
    pub original_url: String,
    pub slug: String,
    pub customized: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn link() -> Link {
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

    #[test]
    fn test_active_unexpired_link_is_accessible() {
        assert!(link().is_accessible());
    }

    #[test]
    fn test_inactive_link_is_not_accessible() {
        let mut l = link();
        l.is_active = false;
        assert!(!l.is_accessible());
    }

    #[test]
    fn test_expired_link_is_not_accessible() {
        let mut l = link();
        l.expires_at = Some(Utc::now() - Duration::seconds(1));
        assert!(l.is_expired());
        assert!(!l.is_accessible());
    }

    #[test]
    fn test_future_expiry_is_accessible() {
        let mut l = link();
        l.expires_at = Some(Utc::now() + Duration::hours(1));
        assert!(!l.is_expired());
        assert!(l.is_accessible());
    }
}
