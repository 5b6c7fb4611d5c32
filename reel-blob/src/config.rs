use std::time::Duration;

/// Configuration for media delivery
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Content type used when the store reports none
    pub default_content_type: String,

    /// `Cache-Control` sent with every served body
    pub cache_control: String,

    /// TTL for signed URLs when the caller does not supply one
    pub default_signed_url_ttl_secs: u64,

    /// Longest TTL a signed URL may carry (SigV4 presigning caps at 7 days)
    pub max_signed_url_ttl_secs: u64,

    /// Upper bound for each store round trip (head, get, sign)
    pub store_timeout: Duration,

    /// Longest wait for the next chunk once streaming has started
    pub read_idle_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            default_content_type: "video/mp4".to_string(),
            cache_control: "public, max-age=31536000".to_string(),
            default_signed_url_ttl_secs: 3600,
            max_signed_url_ttl_secs: 7 * 24 * 60 * 60,
            store_timeout: Duration::from_secs(30),
            read_idle_timeout: Duration::from_secs(60),
        }
    }
}

impl GatewayConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.default_content_type = content_type.into();
        self
    }

    pub fn with_cache_control<S: Into<String>>(mut self, cache_control: S) -> Self {
        self.cache_control = cache_control.into();
        self
    }

    pub fn with_default_signed_url_ttl(mut self, secs: u64) -> Self {
        self.default_signed_url_ttl_secs = secs;
        self
    }

    pub fn with_max_signed_url_ttl(mut self, secs: u64) -> Self {
        self.max_signed_url_ttl_secs = secs;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn with_read_idle_timeout(mut self, timeout: Duration) -> Self {
        self.read_idle_timeout = timeout;
        self
    }
}
