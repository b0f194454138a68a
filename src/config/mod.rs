//! Configuration management for `relink.toml`.
//!
//! | Section        | Purpose                                    |
//! |----------------|--------------------------------------------|
//! | `[content]`    | HTML tree scanned for short-link metadata  |
//! | `[serve]`      | HTTP server (interface, port, watch)       |
//! | `[[redirect]]` | Static prefix redirects                    |
//!
//! A missing config file is not an error; every field has a default and the
//! CLI can override the interesting ones.

pub mod section;

pub use section::{ContentConfig, RedirectRule, ServeConfig};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cli::{Cli, Commands};

/// Root configuration structure representing relink.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project root directory - parent of the config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Content tree settings
    pub content: ContentConfig,

    /// HTTP server settings
    pub serve: ServeConfig,

    /// Static prefix redirects
    pub redirect: Vec<RedirectRule>,
}

impl Config {
    /// Load configuration for the given CLI invocation.
    ///
    /// File values come first, CLI options override them. The project root
    /// is the config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = if cli.config.is_file() {
            Self::from_path(&cli.config)?
        } else {
            Self::default()
        };

        config.root = cli
            .config
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        config.apply_cli(cli);
        Ok(config)
    }

    fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Apply command-line overrides on top of file values.
    fn apply_cli(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Serve {
                base,
                interface,
                port,
                watch,
                ..
            } => {
                if let Some(base) = base {
                    self.content.base = base.clone();
                }
                if let Some(interface) = interface {
                    self.serve.interface = *interface;
                }
                if let Some(port) = port {
                    self.serve.port = *port;
                }
                if let Some(watch) = watch {
                    self.serve.watch = *watch;
                }
            }
            Commands::Scan { .. } => {}
        }
    }

    /// Content base directory, resolved against the project root.
    pub fn base_dir(&self) -> PathBuf {
        if self.content.base.is_absolute() {
            self.content.base.clone()
        } else {
            self.root.join(&self.content.base)
        }
    }
}

/// Parse a config snippet for tests.
#[cfg(test)]
pub(crate) fn test_parse_config(raw: &str) -> Config {
    toml::from_str(raw).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults_without_config_file() {
        let cli = Cli::parse_from(["relink", "-C", "/nonexistent/relink.toml", "serve"]);
        let config = Config::load(&cli).unwrap();

        assert_eq!(config.content.base, PathBuf::from("public"));
        assert_eq!(config.serve.port, 5378);
        assert!(config.redirect.is_empty());
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let cli = Cli::parse_from([
            "relink", "serve", "--base", "site", "--port", "9999", "--watch", "false",
        ]);
        let config = Config::load(&cli).unwrap();

        assert_eq!(config.content.base, PathBuf::from("site"));
        assert_eq!(config.serve.port, 9999);
        assert!(!config.serve.watch);
    }

    #[test]
    fn test_base_dir_resolves_against_root() {
        let mut config = Config::default();
        config.root = PathBuf::from("/srv/site");
        config.content.base = PathBuf::from("public");
        assert_eq!(config.base_dir(), PathBuf::from("/srv/site/public"));

        config.content.base = PathBuf::from("/var/www");
        assert_eq!(config.base_dir(), PathBuf::from("/var/www"));
    }
}
