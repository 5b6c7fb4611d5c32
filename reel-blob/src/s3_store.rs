use std::time::Duration;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use tracing::debug;

use crate::{
    BlobError, BlobResult, BlobStore, GetResult, ObjectHead, ObjectLocator, ResolvedRange,
    SignedUrlBlobStore, StoreCapabilities,
};

/// Connection settings for an S3-compatible endpoint (AWS S3, Cloudflare R2,
/// MinIO, RustFS, ...)
#[derive(Clone)]
pub struct S3Config {
    pub endpoint_url: Option<String>,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Path-style addressing, required by most non-AWS endpoints
    pub force_path_style: bool,
}

impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("endpoint_url", &self.endpoint_url)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

impl S3Config {
    pub fn new<A: Into<String>, S: Into<String>>(access_key_id: A, secret_access_key: S) -> Self {
        Self {
            endpoint_url: None,
            region: "auto".to_string(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            force_path_style: true,
        }
    }

    pub fn with_endpoint_url<S: Into<String>>(mut self, endpoint_url: S) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    pub fn with_region<S: Into<String>>(mut self, region: S) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_force_path_style(mut self, force: bool) -> Self {
        self.force_path_style = force;
        self
    }
}

/// Store backed by the AWS SDK against any S3-compatible endpoint.
///
/// The SDK client pools connections and is cheap to clone, so one store is
/// built at startup and shared by every request.
#[derive(Clone)]
pub struct S3CompatibleStore {
    client: Client,
}

impl S3CompatibleStore {
    pub async fn new(config: S3Config) -> Self {
        let client = Self::create_client(config).await;
        Self { client }
    }

    /// Wrap an already configured client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    async fn create_client(config: S3Config) -> Client {
        let credentials = Credentials::new(
            config.access_key_id,
            config.secret_access_key,
            None,
            None,
            "reel",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region))
            .credentials_provider(credentials);
        if let Some(endpoint_url) = config.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let aws_config = loader.load().await;

        Client::from_conf(
            aws_sdk_s3::config::Builder::from(&aws_config)
                .force_path_style(config.force_path_style)
                .build(),
        )
    }

    fn map_aws_error(err: impl std::error::Error + Send + Sync + 'static) -> BlobError {
        BlobError::backend(err)
    }
}

#[async_trait]
impl BlobStore for S3CompatibleStore {
    async fn head(&self, locator: &ObjectLocator) -> BlobResult<ObjectHead> {
        let result = self
            .client
            .head_object()
            .bucket(locator.bucket())
            .key(locator.key())
            .send()
            .await
            .map_err(|err| {
                if err.as_service_error().is_some_and(|e| e.is_not_found()) {
                    BlobError::not_found(locator.key())
                } else {
                    Self::map_aws_error(err)
                }
            })?;

        Ok(ObjectHead {
            size_bytes: result.content_length.unwrap_or(0).max(0) as u64,
            content_type: result.content_type,
            etag: result.e_tag,
            last_modified: result.last_modified.map(|dt| dt.secs()),
        })
    }

    async fn get(
        &self,
        locator: &ObjectLocator,
        range: Option<ResolvedRange>,
    ) -> BlobResult<GetResult> {
        let mut request = self
            .client
            .get_object()
            .bucket(locator.bucket())
            .key(locator.key());

        if let Some(ref range) = range {
            request = request.range(range.to_header_value());
        }

        let result = request.send().await.map_err(|err| {
            if err.as_service_error().is_some_and(|e| e.is_no_such_key()) {
                BlobError::not_found(locator.key())
            } else {
                Self::map_aws_error(err)
            }
        })?;

        let content_length = result.content_length.unwrap_or(0).max(0) as u64;
        debug!(%locator, content_length, "s3 body opened");

        let mut body = result.body;
        let stream = async_stream::stream! {
            while let Some(chunk) = body.next().await {
                yield chunk.map_err(std::io::Error::other);
            }
        };

        Ok(GetResult {
            stream: Box::pin(stream),
            size_bytes: content_length,
            content_type: result.content_type,
            etag: result.e_tag,
            resolved_range: range,
        })
    }

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::basic().with_range().with_signed_urls()
    }
}

#[async_trait]
impl SignedUrlBlobStore for S3CompatibleStore {
    async fn sign_get(&self, locator: &ObjectLocator, expires_in_secs: u64) -> BlobResult<String> {
        let presigning = PresigningConfig::expires_in(Duration::from_secs(expires_in_secs))
            .map_err(BlobError::signing)?;

        let request = self
            .client
            .get_object()
            .bucket(locator.bucket())
            .key(locator.key())
            .presigned(presigning)
            .await
            .map_err(BlobError::signing)?;

        Ok(request.uri().to_string())
    }
}
