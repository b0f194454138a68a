//! One-shot mapping discovery (`relink scan`).
//!
//! Walks the given paths (or the configured content base), prints every
//! discovered mapping, and exits. Useful for checking what a content tree
//! declares without starting the server.

use std::path::PathBuf;

use anyhow::Result;
use crossbeam::channel;

use crate::config::Config;
use crate::core::Mapping;
use crate::log;
use crate::scan::scan_tree;

pub fn run_scan(paths: &[PathBuf], json: bool, pretty: bool, config: &Config) -> Result<()> {
    let targets: Vec<PathBuf> = if paths.is_empty() {
        vec![config.base_dir()]
    } else {
        paths.to_vec()
    };

    let (tx, rx) = channel::unbounded();
    for target in &targets {
        scan_tree(target, &tx);
    }
    drop(tx);

    let mappings: Vec<Mapping> = rx.iter().collect();

    if json {
        let out = if pretty {
            serde_json::to_string_pretty(&mappings)?
        } else {
            serde_json::to_string(&mappings)?
        };
        println!("{out}");
        return Ok(());
    }

    for mapping in &mappings {
        println!("{} -> {}", mapping.short_path, mapping.permalink);
    }
    log!(
        "scan";
        "{} mapping{}",
        mappings.len(),
        if mappings.len() == 1 { "" } else { "s" }
    );

    Ok(())
}
