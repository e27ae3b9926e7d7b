use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors raised while talking to a printer or resolving its configuration.
#[derive(Debug, Error)]
pub enum PrinterError {
    /// The upstream request failed or answered with a non-success status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The upstream answered, but without the fields we need (e.g. no active job).
    #[error("data error: {0}")]
    Data(String),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no printer configured for camera {0}")]
    Missing(String),

    #[error("unsupported printer type: {0}")]
    UnsupportedType(String),
}

impl From<reqwest::Error> for PrinterError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Data(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        Self::internal(value.to_string())
    }
}

impl From<PrinterError> for AppError {
    fn from(value: PrinterError) -> Self {
        let status = match &value {
            PrinterError::Transport(_) => StatusCode::BAD_GATEWAY,
            PrinterError::Data(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PrinterError::Config(ConfigError::Missing(_)) => StatusCode::NOT_FOUND,
            PrinterError::Config(ConfigError::UnsupportedType(_)) => StatusCode::BAD_REQUEST,
        };
        Self::new(status, value.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}
