use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use models::ModelError;
use service::errors::ServiceError;
use service::storage::StoreError;

/// Wire shape of every failed call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub message: String,
    pub code: u16,
}

/// Error returned by handlers, rendered as `ErrorBody` JSON.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub message: String,
    pub code: u16,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, message: impl Into<String>, code: u16) -> Self {
        Self { status, error, message: message.into(), code }
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let code = e.code();
        match &e {
            ServiceError::Validation(msg) | ServiceError::Model(ModelError::Validation(msg)) => {
                Self::new(StatusCode::BAD_REQUEST, "Invalid Argument", msg.clone(), code)
            }
            ServiceError::Store(StoreError::NotFound(_)) => {
                Self::new(StatusCode::NOT_FOUND, "Not Found", e.to_string(), code)
            }
            ServiceError::Store(StoreError::DuplicateKey(_)) => {
                Self::new(StatusCode::CONFLICT, "Already Exists", e.to_string(), code)
            }
        }
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid Argument", rejection.body_text(), 1001)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, message = %self.message, "request failed");
        } else {
            warn!(status = %self.status, message = %self.message, "request rejected");
        }
        let body = ErrorBody { success: false, error: self.error.to_string(), message: self.message, code: self.code };
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("cannot bind {addr}: {source}")]
    Bind { addr: String, source: std::io::Error },
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}
