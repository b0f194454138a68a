//! `[[redirect]]` section configuration.

use serde::Deserialize;

/// A static prefix redirect.
///
/// ```toml
/// [[redirect]]
/// prefix = "x"
/// destination = "https://example.com/"
/// status = 301   # optional, 301 when omitted
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RedirectRule {
    /// Path component prefix, without surrounding slashes.
    pub prefix: String,

    /// Base URL requests are rewritten onto. If it includes a path, it
    /// should typically end with a trailing slash.
    pub destination: String,

    /// Response status; defaults to 301 (Moved Permanently).
    pub status: Option<u16>,
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_redirect_rules() {
        let config = test_parse_config(
            "[[redirect]]\nprefix = \"x\"\ndestination = \"https://example.com/\"\n\n\
             [[redirect]]\nprefix = \"w\"\ndestination = \"https://example.com/wiki/\"\nstatus = 302",
        );

        assert_eq!(config.redirect.len(), 2);
        assert_eq!(config.redirect[0].prefix, "x");
        assert_eq!(config.redirect[0].status, None);
        assert_eq!(config.redirect[1].status, Some(302));
    }

    #[test]
    fn test_no_redirects_by_default() {
        assert!(test_parse_config("").redirect.is_empty());
    }
}
