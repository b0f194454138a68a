//! Prefix-based redirects.
//!
//! A [`RedirectHandler`] redirects requests matching a path component prefix
//! to a destination base URL, forwarding any path suffix and query string.
//! Given prefix `x` and destination `http://example/`:
//!
//! ```text
//! /x          =>  http://example/
//! /x/         =>  http://example/
//! /x/a/b?c=d  =>  http://example/a/b?c=d
//! ```
//!
//! `/x123` is not handled. Pure string/URL rewriting; no state.

use anyhow::{Context, Result};
use url::Url;

use crate::config::RedirectRule;

/// Default HTTP status for prefix redirects.
pub const DEFAULT_STATUS: u16 = 301;

#[derive(Debug, Clone)]
pub struct RedirectHandler {
    /// Path component prefix, without surrounding slashes.
    prefix: String,
    /// Base URL requests are rewritten onto.
    destination: Url,
    status: u16,
}

impl RedirectHandler {
    /// Build a handler from a configured rule.
    ///
    /// Fails if the destination is not a valid base URL; this is a
    /// setup-time error.
    pub fn from_rule(rule: &RedirectRule) -> Result<Self> {
        let destination = Url::parse(&rule.destination).with_context(|| {
            format!("invalid redirect destination {:?}", rule.destination)
        })?;

        Ok(Self {
            prefix: rule.prefix.trim_matches('/').to_string(),
            destination,
            status: rule.status.unwrap_or(DEFAULT_STATUS),
        })
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Does `path` fall under this handler's prefix?
    pub fn matches(&self, path: &str) -> bool {
        match path
            .strip_prefix('/')
            .and_then(|p| p.strip_prefix(&self.prefix))
        {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Rewrite `path` (plus an optional raw query string) onto the
    /// destination URL.
    pub fn resolve(&self, path: &str, query: Option<&str>) -> Result<String> {
        let rest = path
            .strip_prefix('/')
            .and_then(|p| p.strip_prefix(&self.prefix))
            .unwrap_or("")
            .trim_start_matches('/');

        let reference = match query {
            Some(query) => format!("{rest}?{query}"),
            None => rest.to_string(),
        };

        let resolved = self.destination.join(&reference).with_context(|| {
            format!("cannot resolve {:?} against {}", reference, self.destination)
        })?;

        Ok(resolved.to_string())
    }
}

/// Build handlers for every configured rule. Any invalid rule fails setup.
pub fn build_handlers(rules: &[RedirectRule]) -> Result<Vec<RedirectHandler>> {
    rules.iter().map(RedirectHandler::from_rule).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler(prefix: &str, destination: &str) -> RedirectHandler {
        RedirectHandler::from_rule(&RedirectRule {
            prefix: prefix.into(),
            destination: destination.into(),
            status: None,
        })
        .unwrap()
    }

    #[test]
    fn test_matches_prefix_boundary() {
        let h = handler("x", "http://example/");
        assert!(h.matches("/x"));
        assert!(h.matches("/x/"));
        assert!(h.matches("/x/a/b"));
        assert!(!h.matches("/x123"));
        assert!(!h.matches("/y"));
        assert!(!h.matches("/"));
    }

    #[test]
    fn test_resolve_bare_prefix() {
        let h = handler("x", "http://example/");
        assert_eq!(h.resolve("/x", None).unwrap(), "http://example/");
        assert_eq!(h.resolve("/x/", None).unwrap(), "http://example/");
    }

    #[test]
    fn test_resolve_forwards_suffix_and_query() {
        let h = handler("x", "http://example/");
        assert_eq!(
            h.resolve("/x/a/b", Some("c=d")).unwrap(),
            "http://example/a/b?c=d"
        );
    }

    #[test]
    fn test_resolve_query_without_suffix() {
        let h = handler("x", "http://example/");
        assert_eq!(h.resolve("/x", Some("c=d")).unwrap(), "http://example/?c=d");
    }

    #[test]
    fn test_destination_with_path_keeps_trailing_slash_semantics() {
        let h = handler("w", "https://example.com/wiki/");
        assert_eq!(
            h.resolve("/w/Page", None).unwrap(),
            "https://example.com/wiki/Page"
        );
    }

    #[test]
    fn test_status_default_and_override() {
        let h = handler("x", "http://example/");
        assert_eq!(h.status(), DEFAULT_STATUS);

        let custom = RedirectHandler::from_rule(&RedirectRule {
            prefix: "x".into(),
            destination: "http://example/".into(),
            status: Some(302),
        })
        .unwrap();
        assert_eq!(custom.status(), 302);
    }

    #[test]
    fn test_invalid_destination_is_setup_error() {
        let result = RedirectHandler::from_rule(&RedirectRule {
            prefix: "x".into(),
            destination: "not a url".into(),
            status: None,
        });
        assert!(result.is_err());
    }
}
