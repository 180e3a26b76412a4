use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::ai::AiError;
use crate::services::watcher::WatcherError;
use crate::services::ProcessError;

/// Envelope codes understood by the desktop client
pub mod code {
    pub const SUCCESS: i32 = 0;
    pub const BAD_REQUEST: i32 = 1000;
    pub const FILE_NOT_FOUND: i32 = 1001;
    pub const CONNECTION_TEST_FAILED: i32 = 2000;
    pub const ANALYZE_FAILED: i32 = 2001;
    pub const NOT_FOUND: i32 = 3000;
    pub const INTERNAL: i32 = 5000;
}

/// Error type for HTTP handlers.
///
/// Every variant renders as the `{code, message}` envelope with HTTP 200;
/// the client only looks at `code`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Unknown rule or template id
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Connection test failed: {0}")]
    ConnectionTest(AiError),

    #[error("AI analysis failed: {0}")]
    Analyze(AiError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn code(&self) -> i32 {
        match self {
            Self::BadRequest(_) => code::BAD_REQUEST,
            Self::FileNotFound(_) => code::FILE_NOT_FOUND,
            Self::NotFound(_) => code::NOT_FOUND,
            Self::ConnectionTest(_) => code::CONNECTION_TEST_FAILED,
            Self::Analyze(_) => code::ANALYZE_FAILED,
            Self::Database(_) | Self::Io(_) | Self::Internal(_) => code::INTERNAL,
        }
    }
}

impl From<ProcessError> for AppError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::FileNotFound(path) => Self::FileNotFound(path),
            ProcessError::RuleNotFound(_) => Self::NotFound("Rule"),
            ProcessError::Database(e) => Self::Database(e),
            ProcessError::FileOperation(e) => Self::Internal(format!("File processing failed: {}", e)),
        }
    }
}

impl From<WatcherError> for AppError {
    fn from(err: WatcherError) -> Self {
        match err {
            WatcherError::InvalidPath(msg) => Self::BadRequest(msg),
            WatcherError::Notify(e) => Self::Internal(format!("Failed to watch folder: {}", e)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        if code == code::INTERNAL {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(code, error = %self, "Request rejected");
        }

        ApiResponse::<()> {
            code,
            message: self.to_string(),
            data: None,
        }
        .into_response()
    }
}

/// Response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            code: code::SUCCESS,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            code: code::SUCCESS,
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        axum::Json(self).into_response()
    }
}

/// `axum::Json` whose rejection is reported through the envelope
pub struct Json<T>(pub T);

impl<T, S> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::BadRequest(format!(
                "Invalid request body: {}",
                rejection.body_text()
            ))),
        }
    }
}
