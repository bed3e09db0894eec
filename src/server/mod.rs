use crate::imaging::ImagingError;
use crate::vision::VisionError;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::json;
use thiserror::Error;

pub mod protocol;
pub mod routes;

/// Request-terminal failures. Each maps onto a fixed HTTP status and is
/// rendered as a JSON `{"error": ...}` body; nothing is retried.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidImage(#[from] ImagingError),

    #[error("{0}")]
    Upstream(#[from] VisionError),
}

impl actix_web::error::ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(json!({ "error": self.to_string() }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            // A re-encode failure is ours, not the caller's
            ApiError::InvalidImage(ImagingError::Encode(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidImage(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
