use crate::errors::{FieldErrors, StoreError};

/// What the view shows for a failed operation. Every StoreError lands on
/// exactly one of these; nothing escapes as an unhandled failure.
#[derive(Debug, Clone, PartialEq)]
pub enum Feedback {
    /// Silent redirect to the login surface.
    RedirectToLogin,
    /// Inline messages next to the offending form fields.
    FieldErrors(FieldErrors),
    /// Dismissible banner above the task list.
    Banner(String),
}

impl From<StoreError> for Feedback {
    fn from(err: StoreError) -> Self {
        match err {
            // Expired and missing sessions both end at the login surface
            StoreError::AuthExpired | StoreError::NotAuthenticated => Feedback::RedirectToLogin,

            StoreError::ValidationFailed(errors) => Feedback::FieldErrors(errors),

            StoreError::TransportFailure(msg) => Feedback::Banner(msg),

            StoreError::UnknownTask(id) => {
                Feedback::Banner(format!("Task {} is no longer on the board", id))
            }
        }
    }
}
