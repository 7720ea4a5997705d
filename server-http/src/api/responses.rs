use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use catalog::planes::data::AccessStatsSnapshot;
use serde::Serialize;
use shared::Error;

#[derive(Serialize)]
pub struct HealthResponse {
    pub message: String,
    pub cache_entries: u64,
    pub stats: AccessStatsSnapshot,
}

// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Maps a lookup failure onto its HTTP status
pub fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::Transient(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Handler error carrying the catalog outcome
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        (status, Json(ErrorResponse::new(self.0.detail()))).into_response()
    }
}
