use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    routing::get,
    Json, Router,
};
use reel_core::errors::ReelError;
use serde_json::{json, Value};

use crate::params::SignedUrlParams;
use crate::{ReelAxumError, StreamState};

/// Routes for proxied streaming and signed url issue.
///
/// ```text
/// GET /r2/{folder}/{filename}      body, honours Range
/// GET /r2-url/{folder}/{filename}  {"success":true,"url":...,"expiresIn":...}
/// ```
pub fn stream_router(state: StreamState) -> Router<()> {
    Router::new()
        .route("/r2/{folder}/{filename}", get(stream_object))
        .route("/r2-url/{folder}/{filename}", get(signed_url))
        .with_state(state)
}

async fn stream_object(
    State(state): State<StreamState>,
    Path((folder, filename)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, ReelAxumError> {
    let locator = state.locate(&folder, &filename);
    // A Range header that is not valid text can never parse, so it takes the 416 path
    let range = headers
        .get(header::RANGE)
        .map(|v| v.to_str().unwrap_or_default());

    let served = state.gateway.serve_object(&locator, range).await?;
    let (head, body) = served.into_parts();

    let status = StatusCode::from_u16(head.status).unwrap_or(StatusCode::OK);
    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, head.content_type)
        .header(header::CONTENT_LENGTH, head.content_length)
        .header(header::CACHE_CONTROL, head.cache_control)
        .header(header::ACCEPT_RANGES, "bytes");
    if let Some(content_range) = head.content_range {
        builder = builder.header(header::CONTENT_RANGE, content_range);
    }
    if let Some(etag) = head.etag {
        builder = builder.header(header::ETAG, etag);
    }

    builder.body(Body::from_stream(body)).map_err(|err| {
        ReelAxumError::from(
            ReelError::general_error("Failed to build response").with_source(err.into()),
        )
    })
}

async fn signed_url(
    State(state): State<StreamState>,
    Path((folder, filename)): Path<(String, String)>,
    query: Result<Query<SignedUrlParams>, QueryRejection>,
) -> Result<Json<Value>, ReelAxumError> {
    let params = SignedUrlParams::from_query(query)?;
    let locator = state.locate(&folder, &filename);

    let signed = state
        .gateway
        .issue_signed_url(&locator, params.expires)
        .await?;

    Ok(Json(json!({
        "success": true,
        "url": signed.url,
        "expiresIn": signed.expires_in,
    })))
}
