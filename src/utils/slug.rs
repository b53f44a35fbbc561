//! Slug generation and custom-slug validation.
//!
//! Generated slugs are fixed-length alphanumeric draws. Uniqueness is owned by
//! the database constraint, not by this module: the allocator inserts and
//! retries on a unique violation rather than trusting a pre-check.

use crate::error::AppError;
use rand::distr::{Alphanumeric, SampleString};
use serde_json::json;

/// Default length of generated slugs. 62^6 values keeps the collision-retry
/// loop at O(1) expected draws for any realistic table size.
pub const DEFAULT_SLUG_LENGTH: usize = 6;

/// Slugs that would shadow service routes.
const RESERVED_SLUGS: &[&str] = &["api", "auth", "health", "urls", "admin", "static"];

/// Draws a random alphanumeric slug of the given length.
pub fn generate_slug(length: usize) -> String {
    Alphanumeric.sample_string(&mut rand::rng(), length)
}

/// Validates a caller-supplied custom slug.
///
/// # Rules
///
/// - Length: 4-30 characters
/// - Allowed characters: lowercase letters, digits, hyphens
/// - Cannot start or end with a hyphen
/// - Cannot be a reserved route word
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any rule is violated.
pub fn validate_custom_slug(slug: &str) -> Result<(), AppError> {
    if slug.len() < 4 || slug.len() > 30 {
        return Err(AppError::bad_request(
            "Custom slug must be 4-30 characters",
            json!({ "provided_length": slug.len() }),
        ));
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(AppError::bad_request(
            "Custom slug can only contain lowercase letters, digits, and hyphens",
            json!({ "slug": slug }),
        ));
    }

    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(AppError::bad_request(
            "Custom slug cannot start or end with a hyphen",
            json!({ "slug": slug }),
        ));
    }

    if RESERVED_SLUGS.contains(&slug) {
        return Err(AppError::bad_request(
            "This slug is reserved",
            json!({ "slug": slug }),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_slug_length() {
        assert_eq!(generate_slug(6).len(), 6);
        assert_eq!(generate_slug(10).len(), 10);
    }

    #[test]
    fn test_generate_slug_alphanumeric_only() {
        let slug = generate_slug(64);
        assert!(slug.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_slug_is_random() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            seen.insert(generate_slug(DEFAULT_SLUG_LENGTH));
        }
        // With 62^6 possible values, 1000 draws colliding would mean a broken RNG.
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn test_validate_accepts_simple_slug() {
        assert!(validate_custom_slug("promo-2026").is_ok());
        assert!(validate_custom_slug("abcd").is_ok());
        assert!(validate_custom_slug("1234").is_ok());
    }

    #[test]
    fn test_validate_rejects_too_short() {
        assert!(validate_custom_slug("abc").is_err());
    }

    #[test]
    fn test_validate_rejects_too_long() {
        assert!(validate_custom_slug(&"a".repeat(31)).is_err());
    }

    #[test]
    fn test_validate_rejects_uppercase() {
        assert!(validate_custom_slug("MySlug").is_err());
    }

    #[test]
    fn test_validate_rejects_special_characters() {
        assert!(validate_custom_slug("my_slug").is_err());
        assert!(validate_custom_slug("my slug").is_err());
        assert!(validate_custom_slug("slug@1").is_err());
    }

    #[test]
    fn test_validate_rejects_edge_hyphens() {
        assert!(validate_custom_slug("-slug").is_err());
        assert!(validate_custom_slug("slug-").is_err());
    }

    #[test]
    fn test_validate_rejects_reserved_words() {
        for &reserved in RESERVED_SLUGS {
            assert!(
                validate_custom_slug(reserved).is_err(),
                "reserved slug '{reserved}' should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert!(validate_custom_slug("").is_err());
    }
}
