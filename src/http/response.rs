//! JSON response envelope for the console API.
//!
//! # Design Decisions
//! - Every JSON answer carries `status` (`success` or `error`)
//! - Errors may carry a machine-readable `errorType` the frontend matches on
//! - Proxied responses never pass through here; they are streamed as-is

use std::fmt::Display;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,

    #[serde(rename = "errorType", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<&'static str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            error_type: None,
            error: None,
            data: Some(data),
        }
    }

    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl ApiResponse<()> {
    pub fn error(error_type: Option<&'static str>, error: impl Display) -> Self {
        Self {
            status: "error",
            error_type,
            error: Some(error.to_string()),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        self.into_response_with(StatusCode::OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let body = serde_json::to_value(ApiResponse::success(vec!["a"])).unwrap();
        assert_eq!(body, json!({"status": "success", "data": ["a"]}));
    }

    #[test]
    fn test_error_shape() {
        let body = serde_json::to_value(ApiResponse::error(Some("TempoCRDNotFound"), "gone")).unwrap();
        assert_eq!(
            body,
            json!({"status": "error", "errorType": "TempoCRDNotFound", "error": "gone"})
        );

        let body = serde_json::to_value(ApiResponse::error(None, "boom")).unwrap();
        assert_eq!(body, json!({"status": "error", "error": "boom"}));
    }
}
