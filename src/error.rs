use actix_web::{HttpResponse, http::StatusCode};
use thiserror::Error;

use crate::io_struct::ErrorResponse;

/// Upload rejections. Always reported to the caller with HTTP 400.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("both content_image and style_image are required (missing {field})")]
    MissingField { field: &'static str },
    #[error("{field} is empty or no file was selected")]
    EmptySelection { field: &'static str },
    #[error("invalid file type for {field}: {extension:?} (allowed: png, jpg, jpeg, webp)")]
    UnsupportedType { field: &'static str, extension: String },
    #[error("{field} exceeds the {limit_bytes} byte upload limit")]
    PayloadTooLarge { field: &'static str, limit_bytes: usize },
}

/// Failures of the external stylization backend. These never reach the
/// caller: the orchestrator logs them and recovers with the statistical
/// engine.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("backend response malformed: {0}")]
    MalformedResponse(String),
    #[error("backend output shape {got:?} does not match content shape {expected:?}")]
    ShapeMismatch { expected: (u32, u32), got: (u32, u32) },
}

/// Everything a transfer request can fail with once it reaches the handler.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("could not read upload: {0}")]
    Multipart(String),
    #[error("could not decode {field}: {reason}")]
    Decode { field: &'static str, reason: String },
    #[error("image processing failed")]
    Internal(#[source] anyhow::Error),
}

impl actix_web::ResponseError for TransferError {
    fn status_code(&self) -> StatusCode {
        match self {
            TransferError::Validation(_)
            | TransferError::Multipart(_)
            | TransferError::Decode { .. } => StatusCode::BAD_REQUEST,
            TransferError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Diagnostic detail stays in the logs; the caller only ever sees the
        // classified message.
        let details = match self {
            TransferError::Internal(source) => {
                log::error!("internal error during transfer: {source:#}");
                Some("check the server logs for diagnostic detail".to_string())
            }
            _ => None,
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            success: false,
            error: self.to_string(),
            details,
        })
    }
}
