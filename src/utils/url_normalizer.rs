//! Destination URL normalization.
//!
//! Submitted URLs are stored in a canonical form so that deduplication by
//! (owner, destination) works regardless of how the caller spelled the URL.

use url::Url;

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error)]
pub enum UrlNormalizationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("Failed to normalize URL: {0}")]
    NormalizationFailed(String),
}

/// Normalizes a destination URL to a canonical form.
///
/// # Normalization Rules
///
/// 1. **Scheme-less input**: retried with an `https://` prefix, so `example.com`
///    becomes `https://example.com/`
/// 2. **Protocol**: only HTTP and HTTPS are allowed
/// 3. **Hostname**: converted to lowercase
/// 4. **Default ports**: removed (80 for HTTP, 443 for HTTPS)
/// 5. **Fragments**: removed
/// 6. **Query parameters and path**: preserved as-is
///
/// Dangerous schemes (`javascript:`, `data:`, `file:`, ...) are rejected.
///
/// # Errors
///
/// Returns [`UrlNormalizationError::InvalidFormat`] for malformed input and
/// [`UrlNormalizationError::UnsupportedProtocol`] for non-HTTP(S) schemes.
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(UrlNormalizationError::InvalidFormat(
            "empty URL".to_string(),
        ));
    }

    let mut url = match Url::parse(trimmed) {
        Ok(url) => url,
        // A bare hostname parses as a relative URL; assume https.
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{trimmed}"))
                .map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?
        }
        Err(e) => return Err(UrlNormalizationError::InvalidFormat(e.to_string())),
    };

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlNormalizationError::UnsupportedProtocol),
    }

    if let Some(host) = url.host_str() {
        let host_lowercase = host.to_ascii_lowercase();
        url.set_host(Some(&host_lowercase)).map_err(|_| {
            UrlNormalizationError::NormalizationFailed("Failed to set normalized host".to_string())
        })?;
    } else {
        return Err(UrlNormalizationError::InvalidFormat(
            "URL has no host".to_string(),
        ));
    }

    url.set_fragment(None);

    let is_default_port = matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    );
    if is_default_port {
        url.set_port(None).map_err(|_| {
            UrlNormalizationError::NormalizationFailed("Failed to remove default port".to_string())
        })?;
    }

    Ok(url.to_string())
}
