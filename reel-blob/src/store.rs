use async_trait::async_trait;

use crate::{BlobResult, ByteStream, ObjectLocator, ResolvedRange};

/// Read-side storage primitives every backend implements
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch object metadata without content
    async fn head(&self, locator: &ObjectLocator) -> BlobResult<ObjectHead>;

    /// Open the object as a stream, optionally restricted to a resolved range.
    ///
    /// The stream is live: implementations must not buffer the whole body.
    async fn get(
        &self,
        locator: &ObjectLocator,
        range: Option<ResolvedRange>,
    ) -> BlobResult<GetResult>;

    /// Get store capabilities
    fn capabilities(&self) -> StoreCapabilities;
}

/// Stores that can hand out time-limited direct-access URLs
#[async_trait]
pub trait SignedUrlBlobStore: BlobStore {
    /// Generate a signed URL granting read access for `expires_in_secs`
    async fn sign_get(&self, locator: &ObjectLocator, expires_in_secs: u64) -> BlobResult<String>;
}

/// Result of a get operation
pub struct GetResult {
    pub stream: ByteStream,
    /// Bytes the stream will yield (range length for ranged reads)
    pub size_bytes: u64,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub resolved_range: Option<ResolvedRange>,
}

impl std::fmt::Debug for GetResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GetResult")
            .field("size_bytes", &self.size_bytes)
            .field("content_type", &self.content_type)
            .field("etag", &self.etag)
            .field("resolved_range", &self.resolved_range)
            .finish_non_exhaustive()
    }
}

/// Metadata about a stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHead {
    pub size_bytes: u64,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub last_modified: Option<i64>,
}

/// Store capabilities
#[derive(Debug, Clone, Default)]
pub struct StoreCapabilities {
    pub supports_range: bool,
    pub supports_signed_urls: bool,
}

impl StoreCapabilities {
    pub fn basic() -> Self {
        Self {
            supports_range: false,
            supports_signed_urls: false,
        }
    }

    pub fn with_range(mut self) -> Self {
        self.supports_range = true;
        self
    }

    pub fn with_signed_urls(mut self) -> Self {
        self.supports_signed_urls = true;
        self
    }
}
