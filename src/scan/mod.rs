//! Recursive mapping discovery over a directory tree.
//!
//! Walks a tree (or visits a single file), runs the link extractor on every
//! HTML document found, and pushes the results onto the mapping stream.
//!
//! Failure policy: a bad entry never aborts the rest of the tree. Walk
//! errors, unreadable files, malformed documents, and invalid short-link
//! candidates are logged and skipped; the scan itself cannot fail.

use std::fs;
use std::path::Path;

use crossbeam::channel::Sender;
use jwalk::WalkDir;

use crate::core::Mapping;
use crate::extract::extract_mappings;
use crate::log;

/// Extension of files treated as HTML documents.
const HTML_EXT: &str = "html";

/// Scan `base` (a file or a directory, recursively) and send every
/// discovered mapping. Returns the number of mappings emitted.
pub fn scan_tree(base: &Path, mappings: &Sender<Mapping>) -> usize {
    let mut emitted = 0;

    for entry in WalkDir::new(base).sort(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log!("scan"; "walk error under {}: {}", base.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(HTML_EXT) {
            continue;
        }

        emitted += scan_file(&path, mappings);
    }

    emitted
}

/// Scan a single HTML document.
fn scan_file(path: &Path, mappings: &Sender<Mapping>) -> usize {
    let html = match fs::read_to_string(path) {
        Ok(html) => html,
        Err(e) => {
            log!("scan"; "error reading {}: {}", path.display(), e);
            return 0;
        }
    };

    let extraction = match extract_mappings(&html) {
        Ok(extraction) => extraction,
        Err(e) => {
            log!("scan"; "error parsing {}: {}", path.display(), e);
            return 0;
        }
    };

    for skipped in &extraction.skipped {
        log!("scan"; "invalid shortlink {:?} in {}: {}", skipped.href, path.display(), skipped.error);
    }

    let mut emitted = 0;
    for mapping in extraction.mappings {
        // A closed receiver means the consumer is gone; stop quietly.
        if mappings.send(mapping).is_err() {
            return emitted;
        }
        emitted += 1;
    }
    emitted
}
