use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use reel_blob::{unsatisfied_content_range, GatewayError};
use reel_core::errors::{ErrorKind, ReelError};
use serde_json::json;

pub(crate) const NOT_FOUND_MESSAGE: &str = "Video not found";
pub(crate) const SIGNING_FAILED_MESSAGE: &str = "Failed to generate streaming URL";

#[derive(Debug)]
pub struct ReelAxumError(pub anyhow::Error);

impl From<anyhow::Error> for ReelAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<ReelError> for ReelAxumError {
    fn from(e: ReelError) -> Self {
        Self(e.into_anyhow())
    }
}

impl From<GatewayError> for ReelAxumError {
    fn from(e: GatewayError) -> Self {
        let reel = match &e {
            GatewayError::ObjectNotFound { .. } => ReelError::not_found(NOT_FOUND_MESSAGE),
            GatewayError::RangeNotSatisfiable { size, .. } => {
                ReelError::range_not_satisfiable("Range not satisfiable")
                    .with_data(json!({ "size": size }))
            }
            GatewayError::SigningFailure { .. } => ReelError::general_error(SIGNING_FAILED_MESSAGE),
            GatewayError::InvalidTtl { max, .. } => {
                ReelError::bad_request(format!("expires must be between 1 and {max} seconds"))
            }
        };
        reel.with_source(anyhow::Error::new(e)).into()
    }
}

impl IntoResponse for ReelAxumError {
    fn into_response(self) -> Response {
        // Keep structured fields even when wrapped by anyhow contexts
        let safe = match self.0.chain().find_map(|e| e.downcast_ref::<ReelError>()) {
            Some(reel) => reel.sanitize_for_client(),
            None => ReelError::general_error(self.0.to_string()),
        };

        let status =
            StatusCode::from_u16(safe.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = ?self.0, "request failed");
        }

        let mut response = (status, Json(safe.to_json())).into_response();
        if safe.kind == ErrorKind::RangeNotSatisfiable {
            let headers = response.headers_mut();
            headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
            let size = safe
                .data
                .as_ref()
                .and_then(|d| d.get("size"))
                .and_then(|s| s.as_u64());
            if let Some(value) = size
                .map(unsatisfied_content_range)
                .and_then(|v| HeaderValue::from_str(&v).ok())
            {
                headers.insert(header::CONTENT_RANGE, value);
            }
        }
        response
    }
}
