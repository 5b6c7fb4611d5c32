//! # reel-blob: range-aware media delivery from object storage
//!
//! `reel-blob` turns "give me this object, maybe this byte range" into a
//! live byte stream plus everything an HTTP layer needs to answer with a 200
//! or a 206, and can hand out signed direct-access URLs instead of proxying.
//!
//! ## Key Features
//!
//! - **Streaming-first**: bodies are forwarded chunk by chunk, never buffered whole
//! - **Range requests**: single-range RFC 7233 parsing with explicit 416 outcomes
//! - **Signed URLs**: time-limited read URLs from the store's signer
//! - **Storage agnostic**: S3-compatible backends (R2, MinIO, AWS) or in-memory
//! - **Server agnostic**: no HTTP types in the API
//!
//! ## Quick Start
//!
//! ```rust
//! use reel_blob::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), GatewayError> {
//! let store = MemoryBlobStore::new();
//! let locator = ObjectLocator::from_path("course-media", "lessons", "intro.mp4");
//! store.insert(locator.clone(), &b"not really a video"[..], Some("video/mp4")).await;
//!
//! let gateway = MediaGateway::new(store, GatewayConfig::default());
//!
//! let served = gateway.serve_object(&locator, Some("bytes=0-3")).await?;
//! assert_eq!(served.status_code(), 206);
//! assert_eq!(served.content_range().as_deref(), Some("bytes 0-3/18"));
//!
//! let signed = gateway.issue_signed_url(&locator, None).await?;
//! assert_eq!(signed.expires_in, 3600);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  HTTP handler   │  ← route dispatch, header mapping
//! ├─────────────────┤
//! │  MediaGateway   │  ← metadata, range decision, stream guard
//! ├─────────────────┤
//! │  BlobStore      │  ← head / get / sign primitives
//! └─────────────────┘
//! ```

mod config;
mod error;
mod gateway;
mod memory_store;
mod pipe;
pub mod range;
mod s3_store;
mod served;
pub mod store;
mod types;

// Re-export main types for clean API
pub use config::GatewayConfig;
pub use error::{BlobError, BlobResult, GatewayError};
pub use gateway::MediaGateway;
pub use memory_store::MemoryBlobStore;
pub use range::{parse_range_header, unsatisfied_content_range, ByteRange, ResolvedRange};
pub use s3_store::{S3CompatibleStore, S3Config};
pub use served::{ServedHead, ServedObject, SignedUrl};
pub use store::{BlobStore, GetResult, ObjectHead, SignedUrlBlobStore, StoreCapabilities};
pub use types::{ByteStream, ObjectLocator};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BlobError, BlobStore, ByteStream, GatewayConfig, GatewayError, MediaGateway,
        MemoryBlobStore, ObjectLocator, ServedObject, SignedUrl, SignedUrlBlobStore,
    };
}
