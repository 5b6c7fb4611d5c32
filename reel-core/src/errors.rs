//! # Errors
//!
//! reel carries structured errors inside `anyhow::Error` so handlers can use
//! `?` freely and the transport layer still recovers a status code and a
//! client-safe message at the boundary.
//!
//! Core goals:
//! - one status code per [`ErrorKind`]
//! - transport-agnostic (the server crate decides how to serialize)
//! - a stable client payload: `{ "success": false, "message": ... }`
//!
//! With feature `serde` (on by default) errors can carry a JSON `data`
//! value and render themselves with `to_json()`.

use std::fmt;

use anyhow::Error as AnyError;

/// A convenience result type for reel core APIs.
pub type ReelResult<T> = std::result::Result<T, AnyError>;

/// Error classes and their HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,          // 400
    NotFound,            // 404
    RangeNotSatisfiable, // 416
    GeneralError,        // 500
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::BadRequest => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::RangeNotSatisfiable => 416,
            ErrorKind::GeneralError => 500,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "BadRequest",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::RangeNotSatisfiable => "RangeNotSatisfiable",
            ErrorKind::GeneralError => "GeneralError",
        }
    }
}

#[cfg(feature = "serde")]
pub type ErrorValue = serde_json::Value;

#[cfg(not(feature = "serde"))]
pub type ErrorValue = std::sync::Arc<dyn std::any::Any + Send + Sync>;

/// A structured reel error that can live inside `anyhow::Error`.
///
/// `message` is what the client sees. `source` keeps the underlying cause
/// for logs and is dropped by [`ReelError::sanitize_for_client`].
#[derive(Debug)]
pub struct ReelError {
    pub kind: ErrorKind,
    pub message: String,
    pub data: Option<ErrorValue>,
    pub source: Option<AnyError>,
}

impl ReelError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            data: None,
            source: None,
        }
    }

    pub fn with_data(mut self, data: ErrorValue) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Convert into `anyhow::Error` so it flows through `?` in handlers.
    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Turn any error into a ReelError:
    /// - if it's already a ReelError, keep it
    /// - otherwise wrap as GeneralError
    pub fn normalize(err: AnyError) -> ReelError {
        match err.downcast::<ReelError>() {
            Ok(reel) => reel,
            Err(other) => {
                ReelError::new(ErrorKind::GeneralError, other.to_string()).with_source(other)
            }
        }
    }

    /// Copy without the inner `source`, suitable for returning to clients.
    pub fn sanitize_for_client(&self) -> ReelError {
        ReelError {
            kind: self.kind,
            message: self.message.clone(),
            data: self.data.clone(),
            source: None,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, msg)
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }
    pub fn range_not_satisfiable(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::RangeNotSatisfiable, msg)
    }
    pub fn general_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::GeneralError, msg)
    }
}

impl fmt::Display for ReelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)
    }
}

impl std::error::Error for ReelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

#[cfg(feature = "serde")]
impl ReelError {
    /// Client payload: `{ "success": false, "message": ..., "data"?: ... }`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        let mut base = json!({
            "success": false,
            "message": self.message,
        });

        if let Some(d) = &self.data {
            base["data"] = d.clone();
        }
        base
    }
}

/// Bail out of an `anyhow` function with a `ReelError`.
#[macro_export]
macro_rules! bail_reel {
    ($ctor:ident, $msg:expr) => {
        return Err($crate::errors::ReelError::$ctor($msg).into_anyhow());
    };
    ($ctor:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::errors::ReelError::$ctor(format!($fmt, $($arg)*)).into_anyhow());
    };
}
