//! Request classification.
//!
//! Decides whether an intercepted request is cached at all, and if so under
//! which role. Image extensions win over static directories, which win over
//! the dynamic default.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::http::Request;
use crate::namespace::Role;

static IMAGE_EXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|gif|svg|webp|avif|ico)$").expect("valid image regex"));

static STATIC_EXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(js|css|woff|woff2|ttf|eot)$").expect("valid static regex"));

/// Built-asset and generic static directories.
const STATIC_DIRS: &[&str] = &["/_next/static/", "/static/"];

/// Outcome of classifying a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Not intercepted; default handling applies.
    Skip,
    Cache(Role),
}

/// Classifies requests relative to the site's own origin.
#[derive(Debug, Clone)]
pub struct Classifier {
    site: Url,
}

impl Classifier {
    pub fn new(site: Url) -> Self {
        Self { site }
    }

    pub fn classify(&self, request: &Request) -> Classification {
        if !request.is_get() || !self.in_scope(&request.url) {
            return Classification::Skip;
        }
        Classification::Cache(role_for_path(request.url.path()))
    }

    /// Same origin as the site, or any localhost origin.
    fn in_scope(&self, url: &Url) -> bool {
        url.origin() == self.site.origin() || url.host_str() == Some("localhost")
    }
}

/// Role for an in-scope path.
pub fn role_for_path(path: &str) -> Role {
    if IMAGE_EXT.is_match(path) {
        Role::Image
    } else if STATIC_DIRS.iter().any(|dir| path.starts_with(dir)) || STATIC_EXT.is_match(path) {
        Role::Static
    } else {
        Role::Dynamic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::new(Url::parse("https://site.example").unwrap())
    }

    fn get(url: &str) -> Request {
        Request::get(url).unwrap()
    }

    #[test]
    fn test_image_extensions() {
        let c = classifier();
        for path in ["/icon.png", "/a/b.JPG", "/x.jpeg", "/y.gif", "/z.svg", "/w.webp", "/v.avif", "/favicon.ico"] {
            let req = get(&format!("https://site.example{path}"));
            assert_eq!(c.classify(&req), Classification::Cache(Role::Image), "{path}");
        }
    }

    #[test]
    fn test_static_assets() {
        let c = classifier();
        for path in [
            "/_next/static/chunks/main",
            "/static/data.json",
            "/app.js",
            "/style.CSS",
            "/font.woff2",
            "/font.woff",
            "/font.ttf",
            "/font.eot",
        ] {
            let req = get(&format!("https://site.example{path}"));
            assert_eq!(c.classify(&req), Classification::Cache(Role::Static), "{path}");
        }
    }

    #[test]
    fn test_image_under_static_dir_is_image() {
        let req = get("https://site.example/_next/static/media/hero.webp");
        assert_eq!(classifier().classify(&req), Classification::Cache(Role::Image));
    }

    #[test]
    fn test_dynamic_default() {
        let c = classifier();
        for path in ["/", "/about", "/api/data", "/manifest.json", "/app.js.map"] {
            let req = get(&format!("https://site.example{path}"));
            assert_eq!(c.classify(&req), Classification::Cache(Role::Dynamic), "{path}");
        }
    }

    #[test]
    fn test_extension_matches_path_not_query() {
        let req = get("https://site.example/api/thumb?format=.png");
        assert_eq!(classifier().classify(&req), Classification::Cache(Role::Dynamic));
    }

    #[test]
    fn test_non_get_skipped() {
        let url = Url::parse("https://site.example/api/data").unwrap();
        for method in ["POST", "PUT", "DELETE", "HEAD"] {
            let req = Request::new(method, url.clone());
            assert_eq!(classifier().classify(&req), Classification::Skip, "{method}");
        }
    }

    #[test]
    fn test_cross_origin_skipped() {
        let c = classifier();
        assert_eq!(c.classify(&get("https://cdn.other.example/lib.js")), Classification::Skip);
        assert_eq!(c.classify(&get("http://site.example/")), Classification::Skip);
        assert_eq!(c.classify(&get("https://site.example:8443/")), Classification::Skip);
    }

    #[test]
    fn test_localhost_in_scope() {
        let c = classifier();
        assert_eq!(c.classify(&get("http://localhost:3000/logo.png")), Classification::Cache(Role::Image));
        assert_eq!(c.classify(&get("http://localhost/")), Classification::Cache(Role::Dynamic));
    }
}
