//! Identity entity: the owning account of links and clicks.

use chrono::{DateTime, Utc};

/// Account type tag.
///
/// A flat sum type instead of layered user subclassing: a guest is a transient
/// identity provisioned on first anonymous interaction; the only transition is
/// `Guest -> Free` when its content is reconciled into a registered account.
/// `Staff` elevation is an operator action (see the admin binary).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityKind {
    Guest,
    Free,
    Staff,
}

impl IdentityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityKind::Guest => "guest",
            IdentityKind::Free => "free",
            IdentityKind::Staff => "staff",
        }
    }

    /// Parses the database tag. Unknown tags fall back to `Guest`, the least
    /// privileged kind.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "free" => IdentityKind::Free,
            "staff" => IdentityKind::Staff,
            _ => IdentityKind::Guest,
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, IdentityKind::Guest)
    }
}

/// An account that owns short links and their click history.
///
/// `email` and `password_hash` are absent for guests; both are required for
/// registered identities.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub kind: IdentityKind,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input data for registering a new identity.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// An identity paired with its stored password hash, for login verification.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    pub identity: Identity,
    pub password_hash: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_kind_tag_roundtrip() {
        for kind in [IdentityKind::Guest, IdentityKind::Free, IdentityKind::Staff] {
            assert_eq!(IdentityKind::from_tag(kind.as_str()), kind);
        }
    }

    #[test]
    fn test_unknown_tag_degrades_to_guest() {
        assert_eq!(IdentityKind::from_tag("superuser"), IdentityKind::Guest);
        assert_eq!(IdentityKind::from_tag(""), IdentityKind::Guest);
    }

    #[test]
    fn test_guest_identity() {
        let identity = Identity {
            id: 1,
            username: "guest_a1b2c3".to_string(),
            email: None,
            kind: IdentityKind::Guest,
            is_active: true,
            created_at: Utc::now(),
        };

        assert!(identity.kind.is_guest());
        assert!(identity.email.is_none());
    }
}
