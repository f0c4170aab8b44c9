//! Error taxonomy of the generation routes.
//!
//! Every pipeline stage converts its failure into one of four codes right
//! away; nothing propagates past the route boundary unhandled.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pdf::ConversionError;
use crate::render::RenderError;
use crate::schema::ValidationError;
use crate::ErrorResponse;

/// Machine-readable error code sent in the `code` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    InvalidJson,
    InvalidRequest,
    PdfGenError,
    ServerBreak,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidJson => "invalid-json",
            ErrorCode::InvalidRequest => "invalid-request",
            ErrorCode::PdfGenError => "pdf-gen-error",
            ErrorCode::ServerBreak => "server-break",
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Body absent or not parseable as JSON.
    #[error("Request body is not valid JSON!")]
    InvalidJson { detail: Option<String> },
    #[error("Request doesn't contain valid data!")]
    InvalidRequest(#[source] ValidationError),
    /// Body exceeded the configured `PayloadConfig` limit.
    #[error("Request body is too large!")]
    PayloadTooLarge(String),
    #[error("PDF generation error")]
    Render(#[source] RenderError),
    #[error("PDF generation error")]
    Conversion(#[source] ConversionError),
    #[error("Internal Server Error")]
    ServerBreak(String),
}

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ApiError::InvalidJson { .. } => ErrorCode::InvalidJson,
            ApiError::InvalidRequest(_) | ApiError::PayloadTooLarge(_) => ErrorCode::InvalidRequest,
            // Render and conversion failures are not distinguished for callers.
            ApiError::Render(_) | ApiError::Conversion(_) => ErrorCode::PdfGenError,
            ApiError::ServerBreak(_) => ErrorCode::ServerBreak,
        }
    }

    /// Diagnostic detail sent in the `error` field.
    pub fn detail(&self) -> Option<String> {
        match self {
            ApiError::InvalidJson { detail } => detail.clone(),
            ApiError::InvalidRequest(e) => Some(e.to_string()),
            ApiError::PayloadTooLarge(e) => Some(e.clone()),
            ApiError::Render(e) => Some(e.to_string()),
            ApiError::Conversion(e) => Some(e.to_string()),
            ApiError::ServerBreak(e) => Some(e.clone()),
        }
    }

    pub fn to_body(&self) -> ErrorResponse {
        ErrorResponse::new(self.code().as_str(), &self.to_string(), self.detail())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::InvalidRequest(err)
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        ApiError::Render(err)
    }
}

impl From<ConversionError> for ApiError {
    fn from(err: ConversionError) -> Self {
        ApiError::Conversion(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        if let ApiError::PayloadTooLarge(_) = self {
            return StatusCode::PAYLOAD_TOO_LARGE;
        }
        match self.code() {
            ErrorCode::InvalidJson | ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::PdfGenError | ErrorCode::ServerBreak => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.to_body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let invalid_json = ApiError::InvalidJson { detail: None };
        assert_eq!(invalid_json.status_code(), StatusCode::BAD_REQUEST);

        let conversion = ApiError::from(ConversionError::NoContent);
        assert_eq!(conversion.code(), ErrorCode::PdfGenError);
        assert_eq!(conversion.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let server_break = ApiError::ServerBreak("worker gone".to_string());
        assert_eq!(server_break.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let too_large = ApiError::PayloadTooLarge("A payload reached size limit.".to_string());
        assert_eq!(too_large.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(too_large.to_body().code, "invalid-request");
    }

    #[test]
    fn test_body_carries_code_and_detail() {
        let err = ApiError::from(ValidationError::missing_property("", "name"));
        let body = err.to_body();
        assert_eq!(body.code, "invalid-request");
        assert_eq!(body.message, "Request doesn't contain valid data!");
        assert_eq!(
            body.error.as_deref(),
            Some("'name' is a required property (at $)")
        );
    }

    #[test]
    fn test_code_serialization() {
        let json = serde_json::to_value(ErrorCode::PdfGenError).unwrap();
        assert_eq!(json, "pdf-gen-error");
        for code in [
            ErrorCode::InvalidJson,
            ErrorCode::InvalidRequest,
            ErrorCode::PdfGenError,
            ErrorCode::ServerBreak,
        ] {
            assert_eq!(serde_json::to_value(code).unwrap(), code.as_str());
        }
    }
}
