use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

// --- Domain/Infrastructure Errors ---

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found in '{collection}': {id}")]
    NotFound { collection: String, id: String },

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("store backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        StoreError::NotFound { collection: collection.to_string(), id: id.to_string() }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("auth backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

// --- Web Layer Error ---

#[derive(Error, Debug)]
pub enum AppError {
    // Input validation / request parsing errors
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Missing or unusable credentials
    #[error("authentication required")]
    Unauthorized,
    #[error("not allowed to modify this resource")]
    Forbidden,

    // Absent resources, with a caller-facing description
    #[error("{0}")]
    NotFound(String),

    // Infrastructure failures (mapped from the collaborator errors)
    #[error("data store operation failed")]
    Store(#[source] StoreError),
    #[error("authentication collaborator failed")]
    Auth(#[source] AuthError),

    // Configuration / startup errors
    #[error("configuration error: {0}")]
    Config(String),
    #[error("initialization error: {0}")]
    Init(String),

    #[error("internal server error: {0}")]
    Internal(String),
}

// --- Conversions from collaborator errors to AppError ---

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { ref collection, ref id } => {
                AppError::NotFound(format!("no record '{id}' in '{collection}'"))
            }
            e => AppError::Store(e),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

// --- Axum Response Implementation ---

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            // 4xx Client Errors
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),

            // 5xx Server Errors
            AppError::Store(e) => {
                tracing::error!(error.source = ?e, "Store error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "Data store operation failed".to_string())
            }
            AppError::Auth(e) => {
                tracing::error!(error.source = ?e, "Auth collaborator error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "Authentication lookup failed".to_string())
            }
            AppError::Config(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error".to_string())
            }
            AppError::Init(msg) => {
                tracing::error!("Initialization error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server initialization error".to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal server error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "An internal server error occurred".to_string())
            }
        };

        if status.is_client_error() {
            tracing::warn!(error.message = %error_message, error.detail = %self, "Responding with client error");
        }

        let body = Json(serde_json::json!({ "error": error_message }));
        (status, body).into_response()
    }
}
