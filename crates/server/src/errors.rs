use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{debug, error};

/// JSON error body: `{"error": <title>, "message": <detail>}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub message: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, message: Option<String>) -> Self {
        Self { status, error, message }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found", Some(message.into()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = match self.message {
            Some(msg) => serde_json::json!({ "error": self.error, "message": msg }),
            None => serde_json::json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(msg)),
            ServiceError::NotFound(msg) => Self::not_found(msg),
            // storage details stay in the log
            ServiceError::CorruptData(_) | ServiceError::Persistence(_) => {
                error!(error = %e, "data file failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None)
            }
        }
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(error = %rejection, "request body rejected");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::new(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large", None);
        }
        let message = match rejection {
            JsonRejection::MissingJsonContentType(_) => "request body must be JSON",
            JsonRejection::JsonSyntaxError(_) => "request body is not valid JSON",
            JsonRejection::JsonDataError(_) => "request body has missing or wrongly typed fields",
            _ => "request body could not be read",
        };
        Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(message.into()))
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_fixed_statuses() {
        let cases = [
            (ServiceError::Validation("username is required".into()), StatusCode::BAD_REQUEST),
            (ServiceError::not_found("person"), StatusCode::NOT_FOUND),
            (ServiceError::CorruptData("bad".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ServiceError::Persistence("disk full".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(JsonApiError::from(err).status, status);
        }
    }

    #[test]
    fn internal_errors_hide_details() {
        let api = JsonApiError::from(ServiceError::Persistence("/srv/data.json: EACCES".into()));
        assert!(api.message.is_none());
        let api = JsonApiError::from(ServiceError::not_found("voice"));
        assert_eq!(api.message.as_deref(), Some("voice not found"));
    }
}
