use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use reel_core::errors::ReelError;
use serde::Deserialize;

/// Query string of the signed url route.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignedUrlParams {
    /// Requested lifetime in seconds
    pub expires: Option<u64>,
}

impl SignedUrlParams {
    /// Unpack the extractor result, turning a bad query into a 400
    pub fn from_query(query: Result<Query<Self>, QueryRejection>) -> Result<Self, ReelError> {
        match query {
            Ok(Query(params)) => Ok(params),
            Err(rejection) => Err(ReelError::bad_request(
                "expires must be a whole number of seconds",
            )
            .with_source(anyhow::anyhow!(rejection.body_text()))),
        }
    }
}
