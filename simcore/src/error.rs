use http::StatusCode;
use serde_json::json;
use thiserror::Error;

use crate::response::MockResponse;

/// Errors a mock handler can surface to the client. The original backend
/// contract only distinguishes "not found" and basic required-field
/// validation; everything else is a deterministic success.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },

    #[error("{0}")]
    BadRequest(String),

    #[error("request body must be a JSON object")]
    MissingBody,
}

impl HandlerError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::MissingBody => StatusCode::BAD_REQUEST,
        }
    }

    pub fn into_response(self) -> MockResponse {
        MockResponse::with_status(self.status(), json!({ "error": self.to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_body_shape() {
        let response = HandlerError::not_found("subscriber", "SUB-9").into_response();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(
            response.body,
            Some(json!({ "error": "subscriber SUB-9 not found" }))
        );
    }

    #[test]
    fn test_bad_request_status() {
        let response = HandlerError::bad_request("name is required").into_response();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }
}
