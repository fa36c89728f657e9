use adoptindie_core::error::AdoptError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Which JSON body an error is rendered as
///
/// Upload routes answer `{error, details?}`, dog routes answer
/// `{message, error?}`. The map client reads both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorShape {
    Error,
    Message,
}

/// Unified API error type
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
    pub shape: ErrorShape,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: None,
            shape: ErrorShape::Error,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Render as `{message, error?}`
    pub fn message_shape(mut self) -> Self {
        self.shape = ErrorShape::Message;
        self
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

#[derive(Serialize)]
struct MessageBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.shape {
            ErrorShape::Error => {
                let body = ErrorBody {
                    error: self.message,
                    details: self.details,
                };
                (self.status, Json(body)).into_response()
            }
            ErrorShape::Message => {
                let body = MessageBody {
                    message: self.message,
                    error: self.details,
                };
                (self.status, Json(body)).into_response()
            }
        }
    }
}

impl From<AdoptError> for ApiError {
    fn from(err: AdoptError) -> Self {
        match &err {
            AdoptError::InvalidCoordinates { .. } => {
                Self::bad_request("Invalid coordinates").with_details(err.to_string())
            }
            AdoptError::InvalidParameter { .. } => Self::bad_request(err.to_string()),
            AdoptError::MissingFile => Self::bad_request("No file uploaded"),
            _ => Self::internal("Internal error").with_details(err.to_string()),
        }
    }
}
