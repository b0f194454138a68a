//! `[content]` section configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Content tree settings.
///
/// ```toml
/// [content]
/// base = "public"   # directory of HTML files, relative to the config file
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Directory of HTML files to scan for short-link metadata.
    pub base: PathBuf,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            base: PathBuf::from("public"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use std::path::PathBuf;

    #[test]
    fn test_content_config() {
        let config = test_parse_config("[content]\nbase = \"www\"");
        assert_eq!(config.content.base, PathBuf::from("www"));
    }

    #[test]
    fn test_content_config_default() {
        let config = test_parse_config("");
        assert_eq!(config.content.base, PathBuf::from("public"));
    }
}
