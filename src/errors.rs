use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sheet file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sheet request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to sign service account token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("invalid service account key: {0}")]
    Key(#[from] serde_json::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("sheet not found: {0}")]
    NotFound(String),

    #[error("malformed sheet data: {0}")]
    Malformed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be set when MOOD_STORE={store}")]
    Missing { name: &'static str, store: &'static str },

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        tracing::error!(error = %err, "sheet operation failed");
        Self::internal(err)
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
