//! HTTP mapping for [`api::Error`].
//!
//! Every failure leaves as `{"message": "..."}` with the status below. Internal
//! failures are logged with their detail and answered with a fixed message, so
//! nothing about keys, ciphertext or the database reaches the client.
//!
//! | Error | Status |
//! |-------|--------|
//! | `InvalidInput`, `AlreadyShared` | 400 |
//! | `Unauthorized` | 401 |
//! | `Forbidden` | 403 |
//! | `NotFound`, `UserNotFound` | 404 |
//! | `DecryptionFailed`, `Unexpected` | 500 |

use api::Error;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl From<tower_sessions::session::Error> for ApiError {
    fn from(e: tower_sessions::session::Error) -> Self {
        Self(Error::Unexpected(format!("session: {e}")))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            Error::InvalidInput(_) | Error::AlreadyShared => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::NotFound | Error::UserNotFound => StatusCode::NOT_FOUND,
            Error::DecryptionFailed | Error::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
            INTERNAL_MESSAGE.to_string()
        } else {
            self.0.to_string()
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}
