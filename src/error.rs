//! Client-visible error mapping for route handlers

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::constants::ERROR_DETAIL_MAX;
use crate::schema::ValidationError;
use crate::storage::StoreError;

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

/// A request failure with the HTTP status and detail string it maps to.
///
/// Validation failures keep their full field-level message; storage failures
/// are logged in full but reach the client only as a short prefix.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[cfg(test)]
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "store operation failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: truncate_detail(&err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

/// Cut an internal error message down to a short client-safe prefix.
pub fn truncate_detail(detail: &str) -> String {
    if detail.len() <= ERROR_DETAIL_MAX {
        return detail.to_string();
    }
    let mut end = ERROR_DETAIL_MAX;
    while !detail.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &detail[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_detail_short_passthrough() {
        assert_eq!(truncate_detail("connection refused"), "connection refused");
    }

    #[test]
    fn test_truncate_detail_long_prefix() {
        let long = "x".repeat(200);
        let truncated = truncate_detail(&long);
        assert_eq!(truncated.len(), ERROR_DETAIL_MAX + 3);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_truncate_detail_respects_char_boundaries() {
        let long = "é".repeat(ERROR_DETAIL_MAX);
        let truncated = truncate_detail(&long);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_validation_error_maps_to_400() {
        let err = crate::schema::NewClip::default().validate().unwrap_err();
        let api: ApiError = err.into();
        assert_eq!(api.status(), StatusCode::BAD_REQUEST);
        assert!(api.detail().contains("title"));
    }

    #[test]
    fn test_store_error_maps_to_500_with_generic_detail() {
        let api: ApiError = StoreError::Unavailable.into();
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(api.detail().len() <= ERROR_DETAIL_MAX + 3);
    }
}
