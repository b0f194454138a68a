//! Filesystem watcher driving incremental rescans.
//!
//! Observes change notifications for the content tree over the lifetime of
//! the process and feeds the mapping stream:
//!
//! - removals and renames are ignored entirely: mappings are superseded by
//!   later emissions for the same short path, never retracted,
//! - a newly created directory is put under watch immediately, then scanned
//!   recursively, so files that landed between mkdir and the watch
//!   registration are still picked up,
//! - created or modified files are rescanned in place.
//!
//! The watcher starts buffering events from construction, so changes made
//! while the initial full scan runs are not lost.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, bail};
use crossbeam::channel::Sender;
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use rustc_hash::FxHashSet;

use crate::core::Mapping;
use crate::scan::scan_tree;
use crate::{debug, log, logger};

/// How often the event loop wakes to check the shutdown flag.
const SHUTDOWN_POLL_MS: u64 = 200;

/// Filesystem watcher rooted at the content base directory.
pub struct Watcher {
    /// Channel fed by notify's callback (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    /// Directories currently under watch. Owned exclusively by the event
    /// loop once `run` starts; no other task touches it.
    watched: FxHashSet<PathBuf>,
    /// Producer side of the mapping stream
    mappings: Sender<Mapping>,
}

impl Watcher {
    /// Create a watcher rooted at `base` and register a watch on every
    /// existing directory underneath it.
    ///
    /// Fails if `base` is missing or not a directory, or if the platform
    /// watch subscription cannot be created. Per-directory registration
    /// failures are logged and skipped.
    pub fn new(base: &Path, mappings: Sender<Mapping>) -> Result<Self> {
        if !base.is_dir() {
            bail!("watch base {:?} is not a directory", base);
        }

        let (notify_tx, notify_rx) = std::sync::mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let mut watched = FxHashSet::default();
        watch_tree(&mut watcher, &mut watched, base);

        // Events are now buffering in notify_rx while the caller runs the
        // initial scan.

        Ok(Self {
            notify_rx,
            watcher,
            watched,
            mappings,
        })
    }

    /// Run the event loop until shutdown.
    ///
    /// Runtime errors never end the loop; only the shutdown flag (or the
    /// bridge hanging up) does.
    pub async fn run(self) {
        let Self {
            notify_rx,
            watcher,
            watched,
            mappings,
        } = self;

        let (async_tx, mut async_rx) = tokio::sync::mpsc::channel::<notify::Result<Event>>(64);

        // Spawn a thread to poll notify events and forward to the async loop
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                if async_tx.blocking_send(result).is_err() {
                    break; // event loop ended
                }
            }
        });

        let mut state = EventLoop {
            watcher,
            watched,
            mappings,
        };

        loop {
            tokio::select! {
                result = async_rx.recv() => match result {
                    Some(Ok(event)) => state.handle_event(&event),
                    Some(Err(e)) => logger::status_error("watcher error", &e.to_string()),
                    None => break, // bridge thread gone
                },
                _ = tokio::time::sleep(Duration::from_millis(SHUTDOWN_POLL_MS)) => {
                    if crate::core::is_shutdown() {
                        break;
                    }
                }
            }
        }

        debug!("watch"; "stopped");
    }
}

/// Event-loop state: the watcher handle, the watched-directory set, and the
/// producer side of the mapping stream.
struct EventLoop {
    watcher: RecommendedWatcher,
    watched: FxHashSet<PathBuf>,
    mappings: Sender<Mapping>,
}

impl EventLoop {
    fn handle_event(&mut self, event: &Event) {
        match event.kind {
            // Removals and renames never retract mappings; stale entries
            // are overwritten by later emissions for the same short path.
            EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_)) => return,
            // mtime/atime/chmod noise
            EventKind::Modify(ModifyKind::Metadata(_)) => return,
            EventKind::Create(_) | EventKind::Modify(_) => {}
            _ => return,
        }

        let created = matches!(event.kind, EventKind::Create(_));
        for path in &event.paths {
            self.handle_path(path, created);
        }
    }

    fn handle_path(&mut self, path: &Path, created: bool) {
        // Watch a new directory before scanning it, so files landing between
        // mkdir and the registration are caught by the scan below.
        if created && path.is_dir() {
            watch_tree(&mut self.watcher, &mut self.watched, path);
        }

        let emitted = scan_tree(path, &self.mappings);
        if emitted > 0 {
            logger::status_success(&format!(
                "{}: {} mapping{}",
                path.display(),
                emitted,
                if emitted == 1 { "" } else { "s" }
            ));
        } else {
            logger::status_unchanged(&path.display().to_string());
        }
    }
}

/// Register a non-recursive watch on `dir` and every directory below it.
fn watch_tree(watcher: &mut RecommendedWatcher, watched: &mut FxHashSet<PathBuf>, dir: &Path) {
    for entry in jwalk::WalkDir::new(dir).sort(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log!("watch"; "walk error under {}: {}", dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        watch_dir(watcher, watched, &entry.path());
    }
}

fn watch_dir(watcher: &mut RecommendedWatcher, watched: &mut FxHashSet<PathBuf>, dir: &Path) {
    if watched.contains(dir) {
        return;
    }
    match watcher.watch(dir, RecursiveMode::NonRecursive) {
        Ok(()) => {
            watched.insert(dir.to_path_buf());
            debug!("watch"; "watching {}", dir.display());
        }
        Err(e) => log!("watch"; "error watching {}: {}", dir.display(), e),
    }
}
