//! URL resolution for page-originated requests.

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a request URL the way a page would.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Resolve root-relative and relative paths against `origin`
/// 3. Lowercase the host
/// 4. Remove fragment (#...), which never reaches the network
/// 5. Keep query string intact (it is part of the request identity)
pub fn resolve(input: &str, origin: &url::Url) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str().map(str::to_lowercase) {
        parsed
            .set_host(Some(&host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> url::Url {
        url::Url::parse("https://site.example").unwrap()
    }

    #[test]
    fn test_resolve_root_relative() {
        let url = resolve("/icon.png", &origin()).unwrap();
        assert_eq!(url.as_str(), "https://site.example/icon.png");
    }

    #[test]
    fn test_resolve_absolute_kept() {
        let url = resolve("http://localhost:3000/api/data", &origin()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/data");
    }

    #[test]
    fn test_resolve_lowercase_host() {
        let url = resolve("https://SITE.EXAMPLE/About", &origin()).unwrap();
        assert_eq!(url.host_str(), Some("site.example"));
        assert_eq!(url.path(), "/About");
    }

    #[test]
    fn test_resolve_remove_fragment() {
        let url = resolve("/#services", &origin()).unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.as_str(), "https://site.example/");
    }

    #[test]
    fn test_resolve_preserve_query() {
        let url = resolve("/api/data?page=2&sort=asc", &origin()).unwrap();
        assert_eq!(url.query(), Some("page=2&sort=asc"));
    }

    #[test]
    fn test_resolve_trim_whitespace() {
        let url = resolve("  /manifest.json  ", &origin()).unwrap();
        assert_eq!(url.as_str(), "https://site.example/manifest.json");
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let result = resolve("chrome-extension://abc/script.js", &origin());
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve("", &origin()), Err(UrlError::Empty)));
        assert!(matches!(resolve("   ", &origin()), Err(UrlError::Empty)));
    }
}
