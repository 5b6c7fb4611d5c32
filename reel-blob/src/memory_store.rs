use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use md5::{Digest, Md5};
use tokio::sync::RwLock;

use crate::{
    BlobError, BlobResult, BlobStore, GetResult, ObjectHead, ObjectLocator, ResolvedRange,
    SignedUrlBlobStore, StoreCapabilities,
};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: Option<String>,
    etag: String,
    last_modified: i64,
}

/// In-process store for tests and local development.
///
/// Bodies are served in `chunk_size` pieces so callers see a real stream.
/// Signed URLs use the `memory://` scheme and are not verifiable.
#[derive(Clone)]
pub struct MemoryBlobStore {
    objects: Arc<RwLock<HashMap<ObjectLocator, StoredObject>>>,
    chunk_size: usize,
    supports_range: bool,
    fail_signing: Arc<AtomicBool>,
    live_streams: Arc<AtomicUsize>,
    get_calls: Arc<AtomicUsize>,
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            chunk_size: 64 * 1024,
            supports_range: true,
            fail_signing: Arc::new(AtomicBool::new(false)),
            live_streams: Arc::new(AtomicUsize::new(0)),
            get_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Behave like a backend that ignores range requests
    pub fn without_range_support(mut self) -> Self {
        self.supports_range = false;
        self
    }

    pub async fn insert<B: Into<Bytes>>(
        &self,
        locator: ObjectLocator,
        data: B,
        content_type: Option<&str>,
    ) {
        let data = data.into();
        let stored = StoredObject {
            etag: format!("\"{}\"", hex::encode(Md5::digest(&data))),
            data,
            content_type: content_type.map(str::to_string),
            last_modified: chrono::Utc::now().timestamp(),
        };
        self.objects.write().await.insert(locator, stored);
    }

    pub async fn remove(&self, locator: &ObjectLocator) -> bool {
        self.objects.write().await.remove(locator).is_some()
    }

    /// Make every `sign_get` call fail until switched back
    pub fn set_fail_signing(&self, fail: bool) {
        self.fail_signing.store(fail, Ordering::SeqCst);
    }

    /// Body streams handed out and not yet dropped
    pub fn live_streams(&self) -> usize {
        self.live_streams.load(Ordering::SeqCst)
    }

    /// Number of `get` calls received
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    async fn lookup(&self, locator: &ObjectLocator) -> BlobResult<StoredObject> {
        self.objects
            .read()
            .await
            .get(locator)
            .cloned()
            .ok_or_else(|| BlobError::not_found(locator.key()))
    }
}

/// Decrements the live stream count when the body is dropped.
struct StreamTicket(Arc<AtomicUsize>);

impl StreamTicket {
    fn issue(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for StreamTicket {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn head(&self, locator: &ObjectLocator) -> BlobResult<ObjectHead> {
        let object = self.lookup(locator).await?;
        Ok(ObjectHead {
            size_bytes: object.data.len() as u64,
            content_type: object.content_type,
            etag: Some(object.etag),
            last_modified: Some(object.last_modified),
        })
    }

    async fn get(
        &self,
        locator: &ObjectLocator,
        range: Option<ResolvedRange>,
    ) -> BlobResult<GetResult> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let object = self.lookup(locator).await?;

        let range = if self.supports_range { range } else { None };
        let body = match range {
            Some(r) => {
                if r.end >= object.data.len() as u64 {
                    return Err(BlobError::RangeNotSatisfiable {
                        size: object.data.len() as u64,
                    });
                }
                object.data.slice(r.start as usize..=r.end as usize)
            }
            None => object.data.clone(),
        };

        let size_bytes = body.len() as u64;
        let chunk_size = self.chunk_size;
        let ticket = StreamTicket::issue(&self.live_streams);
        let stream = async_stream::stream! {
            let _ticket = ticket;
            let mut offset = 0;
            while offset < body.len() {
                let end = (offset + chunk_size).min(body.len());
                yield Ok(body.slice(offset..end));
                offset = end;
            }
        };

        Ok(GetResult {
            stream: Box::pin(stream),
            size_bytes,
            content_type: object.content_type,
            etag: Some(object.etag),
            resolved_range: range,
        })
    }

    fn capabilities(&self) -> StoreCapabilities {
        let caps = StoreCapabilities::basic().with_signed_urls();
        if self.supports_range {
            caps.with_range()
        } else {
            caps
        }
    }
}

#[async_trait]
impl SignedUrlBlobStore for MemoryBlobStore {
    async fn sign_get(&self, locator: &ObjectLocator, expires_in_secs: u64) -> BlobResult<String> {
        if self.fail_signing.load(Ordering::SeqCst) {
            return Err(BlobError::signing(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "signing disabled",
            )));
        }

        Ok(format!(
            "memory://{}/{}?X-Reel-Expires={}&X-Reel-Signature={}",
            locator.bucket(),
            locator.key(),
            expires_in_secs,
            uuid::Uuid::new_v4().simple()
        ))
    }
}
