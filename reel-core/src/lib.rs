//! reel-core: framework-agnostic core for the reel media gateway.
//!
//! Holds the pieces every other reel crate leans on: structured errors that
//! travel inside `anyhow::Error`, a string key/value configuration store and
//! the `ReelApp` container that owns it.

pub mod app;
pub mod config;
pub mod errors;

pub use app::ReelApp;
pub use config::{load_env_config, ReelConfig, ReelConfigSnapshot};
pub use errors::{ErrorKind, ReelError, ReelResult};
