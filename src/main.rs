//! Relink - a short-link redirect server.
//!
//! Discovers (short path -> permalink) mappings from `rel="shortlink"` and
//! `rel="canonical"` links in a directory tree of HTML files, keeps them
//! fresh by watching the tree for changes, and answers matching HTTP
//! requests with redirects.

#![allow(dead_code)]

mod cli;
mod config;
mod core;
mod extract;
mod logger;
mod redirect;
mod registry;
mod scan;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::Config;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = Config::load(&cli)?;

    match &cli.command {
        Commands::Serve { verbose, .. } => {
            logger::set_verbose(*verbose);
            cli::serve::run_serve(config)
        }
        Commands::Scan {
            paths,
            json,
            pretty,
            verbose,
        } => {
            logger::set_verbose(*verbose);
            cli::scan::run_scan(paths, *json, *pretty, &config)
        }
    }
}
