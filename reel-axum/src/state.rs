use std::sync::Arc;

use reel_blob::{MediaGateway, ObjectLocator};

/// Shared state for the streaming routes.
#[derive(Clone)]
pub struct StreamState {
    pub gateway: Arc<MediaGateway>,
    pub bucket: Arc<str>,
}

impl StreamState {
    pub fn new<B: Into<Arc<str>>>(gateway: MediaGateway, bucket: B) -> Self {
        Self {
            gateway: Arc::new(gateway),
            bucket: bucket.into(),
        }
    }

    /// Map `{folder}/{filename}` onto the configured bucket
    pub fn locate(&self, folder: &str, filename: &str) -> ObjectLocator {
        ObjectLocator::from_path(self.bucket.as_ref(), folder, filename)
    }
}
