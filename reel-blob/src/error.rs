use thiserror::Error;

use crate::ObjectLocator;

/// Result type for blob store operations
pub type BlobResult<T> = Result<T, BlobError>;

/// Errors raised by storage backends and range handling
#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Blob not found: {key}")]
    NotFound { key: String },

    #[error("Invalid range: {message}")]
    InvalidRange { message: String },

    #[error("Range not satisfiable for object of {size} bytes")]
    RangeNotSatisfiable { size: u64 },

    #[error("Operation not supported by this store")]
    Unsupported,

    #[error("Store call timed out after {secs}s: {operation}")]
    Timeout { operation: &'static str, secs: u64 },

    #[error("Signing failed: {source}")]
    Signing {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Storage backend error: {source}")]
    Backend {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl BlobError {
    /// Create a backend error from any error type
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            source: Box::new(error),
        }
    }

    /// Create a signing error from any error type
    pub fn signing<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Signing {
            source: Box::new(error),
        }
    }

    /// Create an invalid range error
    pub fn invalid_range<S: Into<String>>(message: S) -> Self {
        Self::InvalidRange {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(key: S) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Outcome of a failed gateway call, one variant per client-visible result.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The object is missing or its metadata/body could not be fetched.
    /// Transient store failures land here too.
    #[error("object {locator} not found")]
    ObjectNotFound {
        locator: ObjectLocator,
        #[source]
        source: BlobError,
    },

    #[error("requested range not satisfiable (object is {size} bytes)")]
    RangeNotSatisfiable {
        size: u64,
        #[source]
        source: BlobError,
    },

    #[error("failed to sign url for {locator}")]
    SigningFailure {
        locator: ObjectLocator,
        #[source]
        source: BlobError,
    },

    #[error("signed url ttl {requested}s outside 1..={max}s")]
    InvalidTtl { requested: u64, max: u64 },
}
