use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::error::{FetchError, PrintError};

/// JSON error body shared by every API endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        error: message.into(),
        status: None,
        detail: None,
    };
    (status, Json(body)).into_response()
}

impl IntoResponse for FetchError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            FetchError::Upstream { status, detail, .. } => {
                let code = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                let body = ErrorBody {
                    error: message,
                    status: Some(status),
                    detail: Some(detail),
                };
                (code, Json(body)).into_response()
            }
            FetchError::MissingCredentials => json_error(StatusCode::INTERNAL_SERVER_ERROR, message),
            FetchError::Transport(e) => {
                tracing::error!(error = %e, "failed to fetch records");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        }
    }
}

impl IntoResponse for PrintError {
    fn into_response(self) -> Response {
        match self {
            PrintError::NoRecords => json_error(StatusCode::BAD_REQUEST, self.to_string()),
            PrintError::NotFound(_) => json_error(StatusCode::NOT_FOUND, self.to_string()),
        }
    }
}
