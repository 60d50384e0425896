// Error types for the board client. Transport failures stay inside the
// services as ApiError; callers only ever see StoreError or AuthError.
use thiserror::Error;

pub mod response;
pub mod validation;

pub use response::Feedback;
pub use validation::{Field, FieldErrors};

/// Failure of a single request against the board API.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Session rejected by server")]
    Unauthorized,

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    // The #[from] attribute converts reqwest errors (connect, timeout, body) into ApiError::Http.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Token store error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Message the server put in its `{"error": ...}` body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } if !message.is_empty() => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Outcome taxonomy for task operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Session expired")]
    AuthExpired,

    #[error("Validation failed: {0}")]
    ValidationFailed(FieldErrors),

    #[error("{0}")]
    TransportFailure(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Task {0} is not on the board")]
    UnknownTask(String),
}

/// Failure of a credential submission (sign in / sign up).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Could not reach the server: {0}")]
    Transport(String),
}

// Custom result type
pub type AppResult<T> = Result<T, StoreError>;
