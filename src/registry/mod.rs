//! Short-link registry: the live lookup table behind the HTTP handlers.
//!
//! The registry is the sole consumer of the mapping stream. One drain thread
//! writes; request handlers read concurrently. Inserts overwrite by short
//! path (last write wins), which makes duplicate and out-of-order delivery
//! from concurrent producers harmless.

use std::sync::LazyLock;

use crossbeam::channel::Receiver;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::core::Mapping;
use crate::debug;

/// Global short-link registry.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Lookup table from decoded short path to permalink.
#[derive(Debug, Default)]
pub struct Registry {
    routes: RwLock<FxHashMap<String, String>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a mapping, overwriting any previous permalink for the path.
    pub fn insert(&self, mapping: Mapping) {
        self.routes
            .write()
            .insert(mapping.short_path, mapping.permalink);
    }

    /// Look up the permalink for a decoded request path.
    pub fn lookup(&self, short_path: &str) -> Option<String> {
        self.routes.read().get(short_path).cloned()
    }

    /// Number of registered short paths.
    pub fn len(&self) -> usize {
        self.routes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.read().is_empty()
    }

    /// Drain the mapping stream until every producer has hung up.
    pub fn drain(&self, mappings: Receiver<Mapping>) {
        for mapping in mappings {
            debug!("route"; "{} -> {}", mapping.short_path, mapping.permalink);
            self.insert(mapping);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel;

    #[test]
    fn test_insert_and_lookup() {
        let registry = Registry::new();
        registry.insert(Mapping::new("/x", "https://example.com/a"));

        assert_eq!(
            registry.lookup("/x").as_deref(),
            Some("https://example.com/a")
        );
        assert_eq!(registry.lookup("/y"), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_last_write_wins() {
        let registry = Registry::new();
        registry.insert(Mapping::new("/x", "https://example.com/old"));
        registry.insert(Mapping::new("/x", "https://example.com/new"));

        assert_eq!(
            registry.lookup("/x").as_deref(),
            Some("https://example.com/new")
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_drain_consumes_until_producers_close() {
        let registry = Registry::new();
        let (tx, rx) = channel::unbounded();
        tx.send(Mapping::new("/a", "https://example.com/one")).unwrap();
        tx.send(Mapping::new("/a", "https://example.com/two")).unwrap();
        tx.send(Mapping::new("/b", "https://example.com/b")).unwrap();
        drop(tx);

        registry.drain(rx);

        assert_eq!(
            registry.lookup("/a").as_deref(),
            Some("https://example.com/two")
        );
        assert_eq!(registry.len(), 2);
    }
}
