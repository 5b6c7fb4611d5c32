//! # Configuration
//!
//! A minimal string key/value store, set with `app.set()` and read back with
//! `app.get()` or a typed [`ReelConfigSnapshot`]. Applications layer it
//! however they like; the usual layering is "defaults, then environment".
//!
//! ```rust
//! use reel_core::ReelApp;
//! let app = ReelApp::new();
//!
//! app.set("gateway.signed_url_ttl_secs", "3600");
//! assert_eq!(app.config_snapshot().get_u64("gateway.signed_url_ttl_secs"), Some(3600));
//! ```
//!
//! Environment overrides go through [`load_env_config`]:
//!
//! ```bash
//! export REEL__HTTP__PORT=8080   # -> http.port = 8080
//! ```

use std::collections::HashMap;
use std::time::Duration;

use crate::ReelApp;

#[derive(Debug, Default)]
pub struct ReelConfig {
    values: HashMap<String, String>,
}

impl ReelConfig {
    /// Create an empty config store.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set a configuration key to a string value.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Get a configuration value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// Check whether a key is present.
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn snapshot(&self) -> ReelConfigSnapshot {
        ReelConfigSnapshot::new(self.values.clone())
    }
}

/// Immutable copy of the config, with typed getters.
#[derive(Debug, Clone, Default)]
pub struct ReelConfigSnapshot {
    map: HashMap<String, String>,
}

impl ReelConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.trim().parse::<bool>().ok())
    }

    /// Reads a whole number of seconds.
    pub fn get_duration_secs(&self, key: &str) -> Option<Duration> {
        self.get_u64(key).map(Duration::from_secs)
    }
}

/// Copy every `{prefix}A__B` environment variable into the app as `a.b`.
///
/// Returns how many keys were applied.
pub fn load_env_config(app: &ReelApp, prefix: &str) -> usize {
    apply_env_vars(app, prefix, std::env::vars())
}

fn apply_env_vars<I>(app: &ReelApp, prefix: &str, vars: I) -> usize
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut applied = 0;
    for (key, value) in vars {
        if let Some(stripped) = key.strip_prefix(prefix) {
            let normalized = stripped.to_lowercase().replace("__", ".");
            if normalized.is_empty() {
                continue;
            }
            app.set(normalized, value);
            applied += 1;
        }
    }
    applied
}
