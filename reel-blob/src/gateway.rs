use std::future::Future;
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::pipe;
use crate::range::parse_range_header;
use crate::{
    BlobError, BlobResult, GatewayConfig, GatewayError, ObjectHead, ObjectLocator, ServedObject,
    SignedUrl, SignedUrlBlobStore,
};

/// Range-serving media gateway - what HTTP handlers embed.
///
/// Built once at startup with its store injected; holds no per-request
/// state, so a single instance behind an `Arc` serves every request.
#[derive(Clone)]
pub struct MediaGateway {
    store: Arc<dyn SignedUrlBlobStore>,
    config: GatewayConfig,
}

impl MediaGateway {
    /// Create a gateway over `store`
    pub fn new<S: SignedUrlBlobStore + 'static>(store: S, config: GatewayConfig) -> Self {
        Self {
            store: Arc::new(store),
            config,
        }
    }

    /// Create from a store that is already shared elsewhere
    pub fn from_shared(store: Arc<dyn SignedUrlBlobStore>, config: GatewayConfig) -> Self {
        Self { store, config }
    }

    /// Open `locator` for delivery, honouring an optional `Range` header.
    ///
    /// Metadata is always fetched first; the body fetch only happens once
    /// the range, if any, has been checked against the object size.
    pub async fn serve_object(
        &self,
        locator: &ObjectLocator,
        range_header: Option<&str>,
    ) -> Result<ServedObject, GatewayError> {
        let head = self
            .bounded("head", self.store.head(locator))
            .await
            .map_err(|source| not_found(locator, source))?;

        let range = match range_header {
            Some(value) => Some(
                parse_range_header(value)
                    .and_then(|requested| requested.resolve(head.size_bytes))
                    .map_err(|source| {
                        debug!(%locator, range = value, size = head.size_bytes, "rejecting range");
                        GatewayError::RangeNotSatisfiable {
                            size: head.size_bytes,
                            source,
                        }
                    })?,
            ),
            None => None,
        };

        let upstream_range = if self.store.capabilities().supports_range {
            range
        } else {
            None
        };

        let got = self
            .bounded("get", self.store.get(locator, upstream_range))
            .await
            .map_err(|source| not_found(locator, source))?;

        let expected = range.map_or(head.size_bytes, |r| r.content_length());
        let mut stream = got.stream;
        match (range, got.resolved_range) {
            // Store sent the whole object; cut the window out here
            (Some(r), None) => stream = pipe::slice(stream, r.start, r.content_length()),
            _ if got.size_bytes != expected => warn!(
                %locator,
                expected,
                reported = got.size_bytes,
                "store body length differs from metadata"
            ),
            _ => {}
        }
        let stream = pipe::guarded(stream, locator.clone(), expected, self.config.read_idle_timeout);

        let head = ObjectHead {
            content_type: head.content_type.or(got.content_type),
            etag: head.etag.or(got.etag),
            ..head
        };

        debug!(
            %locator,
            size = head.size_bytes,
            range = ?range,
            "serving object"
        );

        Ok(self.build_served(locator, head, range, stream))
    }

    /// Issue a time-limited direct-access URL.
    ///
    /// `ttl_secs` falls back to the configured default. Every call signs
    /// afresh; nothing is cached.
    pub async fn issue_signed_url(
        &self,
        locator: &ObjectLocator,
        ttl_secs: Option<u64>,
    ) -> Result<SignedUrl, GatewayError> {
        let ttl = ttl_secs.unwrap_or(self.config.default_signed_url_ttl_secs);
        let max = self.config.max_signed_url_ttl_secs;
        if ttl == 0 || ttl > max {
            return Err(GatewayError::InvalidTtl { requested: ttl, max });
        }

        if !self.store.capabilities().supports_signed_urls {
            return Err(GatewayError::SigningFailure {
                locator: locator.clone(),
                source: BlobError::Unsupported,
            });
        }

        let url = self
            .bounded("sign", self.store.sign_get(locator, ttl))
            .await
            .map_err(|source| {
                error!(%locator, error = %source, "signed url generation failed");
                GatewayError::SigningFailure {
                    locator: locator.clone(),
                    source,
                }
            })?;

        Ok(SignedUrl::new(url, ttl))
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> BlobResult<T>
    where
        F: Future<Output = BlobResult<T>>,
    {
        let limit = self.config.store_timeout;
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(BlobError::Timeout {
                operation,
                secs: limit.as_secs(),
            }),
        }
    }

    fn build_served(
        &self,
        locator: &ObjectLocator,
        head: ObjectHead,
        range: Option<crate::ResolvedRange>,
        stream: crate::ByteStream,
    ) -> ServedObject {
        let content_type = head
            .content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| self.config.default_content_type.clone());

        ServedObject {
            locator: locator.clone(),
            total_size: head.size_bytes,
            content_type,
            cache_control: self.config.cache_control.clone(),
            etag: head.etag,
            range,
            stream,
        }
    }
}

fn not_found(locator: &ObjectLocator, source: BlobError) -> GatewayError {
    if source.is_not_found() {
        debug!(%locator, "object not found");
    } else {
        warn!(%locator, error = %source, "store call failed; reporting not found");
    }
    GatewayError::ObjectNotFound {
        locator: locator.clone(),
        source,
    }
}
