//! Blocked-path matching logic.
//!
//! # Responsibilities
//! - Build the request target a blocked prefix is tested against
//! - Test the target against a stand's prefix list
//!
//! # Design Decisions
//! - Plain string prefix test, not path-segment aware ("/a" matches "/abc")
//! - Query string takes part in the match ("/x?debug" can be blocked)
//! - Case-sensitive, no regex
//! - First configured prefix wins

use axum::http::Uri;

/// Path plus `?`-joined raw query, when the query is non-empty.
pub fn request_target(uri: &Uri) -> String {
    match uri.query() {
        Some(query) if !query.is_empty() => format!("{}?{}", uri.path(), query),
        _ => uri.path().to_string(),
    }
}

/// Matches a request target against a list of prefixes.
#[derive(Debug, Clone, Default)]
pub struct PathPrefixMatcher {
    prefixes: Vec<String>,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefixes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the first prefix the target starts with.
    pub fn first_match(&self, target: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .map(String::as_str)
            .find(|prefix| target.starts_with(prefix))
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_target() {
        let uri: Uri = "http://example.com/api/v1?x=1&y=2".parse().unwrap();
        assert_eq!(request_target(&uri), "/api/v1?x=1&y=2");

        let uri: Uri = "/images".parse().unwrap();
        assert_eq!(request_target(&uri), "/images");

        let uri: Uri = "/images?".parse().unwrap();
        assert_eq!(request_target(&uri), "/images");
    }

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new(["/logout", "/api"]);

        assert_eq!(matcher.first_match("/api/v1"), Some("/api"));
        assert_eq!(matcher.first_match("/logout.php?x=1"), Some("/logout"));
        assert_eq!(matcher.first_match("/images"), None);
    }

    #[test]
    fn test_prefix_is_not_segment_aware() {
        let matcher = PathPrefixMatcher::new(["/api"]);
        assert_eq!(matcher.first_match("/apiextra"), Some("/api"));
    }

    #[test]
    fn test_prefix_covers_query() {
        let matcher = PathPrefixMatcher::new(["/index.php?page=logout"]);
        assert!(matcher.first_match("/index.php?page=logout&x=1").is_some());
        assert!(matcher.first_match("/index.php?page=home").is_none());
    }
}
