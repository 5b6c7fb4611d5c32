use std::sync::{Arc, RwLock};

use crate::{ReelConfig, ReelConfigSnapshot};

/// ReelApp is the application container shared by the HTTP layer.
///
/// It only owns configuration. Long-lived collaborators such as the media
/// gateway are built from a snapshot at startup and handed to the routers
/// that need them.
pub struct ReelApp {
    config: Arc<RwLock<ReelConfig>>,
}

impl Default for ReelApp {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ReelApp {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
        }
    }
}

impl ReelApp {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(ReelConfig::new())),
        }
    }

    /// `app.set(key, value)`
    pub fn set<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .set(key, value);
    }

    /// Only sets `key` when nothing has set it yet.
    pub fn set_default<K, V>(&self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let key = key.into();
        let mut cfg = self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !cfg.has(&key) {
            cfg.set(key, value);
        }
    }

    /// `app.get(key)`
    pub fn get(&self, key: &str) -> Option<String> {
        let cfg = self
            .config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cfg.get(key).map(|v| v.to_string())
    }

    pub fn config_snapshot(&self) -> ReelConfigSnapshot {
        let cfg = self
            .config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        cfg.snapshot()
    }
}
