//! reel-axum: Axum adapter for the reel media gateway.
//!
//! Builds Axum routers around a `MediaGateway` and maps gateway and core
//! errors onto HTTP responses.

pub mod app;
mod error;
pub mod params;
pub mod state;
pub mod stream;

pub use app::{axum, AxumApp};
pub use error::ReelAxumError;
pub use state::StreamState;
pub use stream::stream_router;
