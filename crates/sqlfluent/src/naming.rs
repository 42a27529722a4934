//! Unique placeholder names.
//!
//! Every auto-bound value needs a placeholder name that no other value in the
//! same statement uses. [`NameGenerator`] hands out `"<prefix>_<n>"` names from
//! a per-prefix counter.
//!
//! The process-wide instance ([`NameGenerator::global`]) is created on first
//! use and never reset, so names stay unique across every query built by the
//! process. Only uniqueness is guaranteed: the concrete numbers depend on what
//! ran before and must not be asserted. Tests that need stable names inject
//! their own instance.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};

/// Prefix used when the caller does not supply one.
pub const DEFAULT_PREFIX: &str = "param";

static GLOBAL: LazyLock<Arc<NameGenerator>> = LazyLock::new(|| Arc::new(NameGenerator::new()));

/// Prefix-keyed monotonic counters producing unique placeholder names.
#[derive(Debug)]
pub struct NameGenerator {
    default_prefix: String,
    counters: Mutex<HashMap<String, u64>>,
}

impl NameGenerator {
    /// Create an independent generator with the `"param"` default prefix.
    pub fn new() -> Self {
        Self::with_default_prefix(DEFAULT_PREFIX)
    }

    /// Create an independent generator with a custom default prefix.
    pub fn with_default_prefix(prefix: impl Into<String>) -> Self {
        Self {
            default_prefix: prefix.into(),
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// The shared process-wide generator.
    pub fn global() -> Arc<NameGenerator> {
        Arc::clone(&*GLOBAL)
    }

    pub fn default_prefix(&self) -> &str {
        &self.default_prefix
    }

    /// Increment the counter for `prefix` (or the default prefix) and return
    /// `"<prefix>_<counter>"`.
    pub fn next_name(&self, prefix: Option<&str>) -> String {
        let prefix = prefix.unwrap_or(&self.default_prefix);
        // A panic while holding the lock cannot leave a counter half-written.
        let mut counters = self
            .counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let counter = counters.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        format!("{}_{}", prefix, counter)
    }
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Next name from the process-wide generator.
pub fn next_name(prefix: Option<&str>) -> String {
    GLOBAL.next_name(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn counts_per_prefix() {
        let names = NameGenerator::new();
        assert_eq!(names.next_name(None), "param_1");
        assert_eq!(names.next_name(None), "param_2");
        assert_eq!(names.next_name(Some("status")), "status_1");
        assert_eq!(names.next_name(None), "param_3");
    }

    #[test]
    fn custom_default_prefix() {
        let names = NameGenerator::with_default_prefix("p");
        assert_eq!(names.default_prefix(), "p");
        assert_eq!(names.next_name(None), "p_1");
    }

    #[test]
    fn global_names_are_unique() {
        let a = next_name(None);
        let b = next_name(None);
        assert_ne!(a, b);
        assert!(a.starts_with("param_"));
    }

    #[test]
    fn unique_across_threads() {
        let names = Arc::new(NameGenerator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let names = Arc::clone(&names);
                thread::spawn(move || (0..100).map(|_| names.next_name(Some("t"))).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for h in handles {
            for name in h.join().unwrap() {
                assert!(seen.insert(name));
            }
        }
        assert_eq!(seen.len(), 800);
    }
}
