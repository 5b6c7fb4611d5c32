use serde::{Deserialize, Serialize};

use crate::{ByteStream, ObjectLocator, ResolvedRange};

/// A successfully opened object, ready to be written to a client.
///
/// Transport-agnostic: the HTTP layer turns `status_code()` and the header
/// helpers into a response and forwards `stream` as the body.
pub struct ServedObject {
    pub locator: ObjectLocator,
    pub total_size: u64,
    pub content_type: String,
    pub cache_control: String,
    pub etag: Option<String>,
    /// `Some` for partial content
    pub range: Option<ResolvedRange>,
    pub stream: ByteStream,
}

impl ServedObject {
    pub fn is_partial(&self) -> bool {
        self.range.is_some()
    }

    /// 206 for ranged reads, 200 for the whole object
    pub fn status_code(&self) -> u16 {
        if self.is_partial() {
            206
        } else {
            200
        }
    }

    pub fn content_length(&self) -> u64 {
        self.range
            .as_ref()
            .map_or(self.total_size, |r| r.content_length())
    }

    pub fn content_range(&self) -> Option<String> {
        self.range.as_ref().map(|r| r.content_range())
    }

    /// Split into the body stream and everything needed for headers.
    pub fn into_parts(self) -> (ServedHead, ByteStream) {
        let content_length = self.content_length();
        let head = ServedHead {
            status: self.status_code(),
            content_length,
            content_type: self.content_type,
            cache_control: self.cache_control,
            content_range: self.range.as_ref().map(|r| r.content_range()),
            etag: self.etag,
        };
        (head, self.stream)
    }
}

impl std::fmt::Debug for ServedObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServedObject")
            .field("locator", &self.locator)
            .field("total_size", &self.total_size)
            .field("content_type", &self.content_type)
            .field("range", &self.range)
            .finish_non_exhaustive()
    }
}

/// Status line and header values of a served object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedHead {
    pub status: u16,
    pub content_length: u64,
    pub content_type: String,
    pub cache_control: String,
    pub content_range: Option<String>,
    pub etag: Option<String>,
}

/// A freshly issued direct-access URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedUrl {
    pub url: String,
    pub expires_in: u64,
    /// Unix seconds
    pub expires_at: i64,
}

impl SignedUrl {
    pub fn new(url: String, expires_in: u64) -> Self {
        // Saturates for TTLs past the representable range
        let expires_at = i64::try_from(expires_in)
            .ok()
            .and_then(|secs| chrono::Utc::now().timestamp().checked_add(secs))
            .unwrap_or(i64::MAX);
        Self {
            url,
            expires_in,
            expires_at,
        }
    }
}
