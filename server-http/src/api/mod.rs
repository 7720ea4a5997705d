pub mod responses;

pub use responses::{ApiError, ErrorResponse, HealthResponse};
