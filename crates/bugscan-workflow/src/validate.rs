//! Pre-network validation of scan targets

use bugscan_core::{canonicalize_url, Error, Result};
use url::Url;

/// Validate and canonicalize a target URL for the general submission
/// flow. Rejects empty input before any network call.
pub fn validate_target_url(input: &str) -> Result<String> {
    let canonical = canonicalize_url(input);
    if canonical.is_empty() {
        return Err(Error::Validation("Please enter a target URL".into()));
    }
    Ok(canonical)
}

/// Validate and canonicalize a URL for the localhost-testing flow.
///
/// Only `http(s)://localhost[:port]` and `http(s)://127.0.0.1[:port]`
/// are accepted, and the application's own origin is rejected outright:
/// scanning the page that drives the scan is a trivial misuse loop.
pub fn validate_local_url(input: &str, app_origin: Option<&str>) -> Result<String> {
    let canonical = validate_target_url(input)?;

    let parsed = Url::parse(&canonical)
        .map_err(|_| Error::Validation("Please provide a valid http(s) URL".into()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Validation("Please provide a valid http(s) URL".into()));
    }

    if !matches!(parsed.host_str(), Some("localhost") | Some("127.0.0.1")) {
        return Err(Error::Validation(
            "Only localhost or 127.0.0.1 URLs are allowed".into(),
        ));
    }

    if let Some(origin) = app_origin {
        if canonicalize_url(origin) == canonical {
            return Err(Error::SelfScan { url: canonical });
        }
    }

    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_url_rejected() {
        assert!(matches!(
            validate_target_url("   "),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_canonical_form_returned() {
        assert_eq!(
            validate_target_url(" https://example.com/ ").unwrap(),
            "https://example.com"
        );
    }

    #[test]
    fn test_localhost_variants_accepted() {
        for url in [
            "http://localhost",
            "http://localhost:3000",
            "https://localhost:8443/",
            "http://127.0.0.1",
            "http://127.0.0.1:8080/login",
            "http://localhost:3001/product?id=1",
        ] {
            assert!(validate_local_url(url, None).is_ok(), "rejected {}", url);
        }
    }

    #[test]
    fn test_non_localhost_rejected() {
        for url in [
            "http://example.com",
            "https://10.0.0.5:8080",
            "http://localhost.evil.com",
            "ftp://localhost",
        ] {
            assert!(validate_local_url(url, None).is_err(), "accepted {}", url);
        }
    }

    #[test]
    fn test_self_scan_rejected() {
        let err = validate_local_url("http://localhost:3001", Some("http://localhost:3001/"))
            .unwrap_err();
        assert!(matches!(err, Error::SelfScan { .. }));
        assert!(err.to_string().contains("http://localhost:3001"));
    }

    #[test]
    fn test_path_under_own_origin_allowed() {
        // Only the origin itself is off-limits, not routes served behind it
        assert!(
            validate_local_url("http://localhost:3001/product?id=1", Some("http://localhost:3001"))
                .is_ok()
        );
    }
}
