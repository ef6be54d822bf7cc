use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum HotelError {
    #[error("{0}")]
    IO(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Multipart(#[from] MultipartError),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(&'static str),

    /// A stored document does not have the shape an operation needs
    #[error("{0}")]
    InvalidDocument(String),

    #[error("{context}: {source}")]
    Internal {
        context: &'static str,
        source: Box<HotelError>,
    },
}

impl HotelError {
    /// Attach the public message returned when this error turns into a 500.
    /// Expected conditions keep their own status and message.
    pub fn context(self, context: &'static str) -> Self {
        match self {
            Self::NotFound(_) | Self::Validation(_) | Self::Internal { .. } => self,
            source => Self::Internal {
                context,
                source: Box::new(source),
            },
        }
    }
}

impl IntoResponse for HotelError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HotelError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()),
            HotelError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.to_string()),
            HotelError::Multipart(e) if e.status().is_client_error() => {
                (e.status(), e.body_text())
            }
            HotelError::Internal { context, source } => {
                error!("{context} {source}");
                (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
            }
            e => {
                error!("Unhandled error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
