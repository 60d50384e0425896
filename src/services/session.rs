use std::sync::Arc;
use tokio::sync::watch;
use crate::errors::{ApiError, AuthError};
use crate::models::{SigninForm, SignupForm, User};
use super::BoardApi;

/// What caused the most recent change of session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transition {
    /// Nothing has happened yet.
    #[default]
    Initial,
    /// A session check found a live session.
    Restored,
    /// A session check failed, for whatever reason.
    Rejected,
    /// A sign in was acknowledged.
    SignedIn,
    /// The user left, or the session expired mid-use.
    SignedOut,
}

/// Snapshot of the authentication state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub user: Option<User>,
    pub transition: Transition,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Owns authentication state for the lifetime of the client.
///
/// Construct one per process and share it behind an `Arc`. None of the
/// lifecycle operations fail: each one resolves to a definite state and logs
/// whatever went wrong on the way. State changes are published on a watch
/// channel; navigation reacts to them elsewhere.
pub struct SessionManager {
    api: Arc<dyn BoardApi>,
    state: watch::Sender<SessionState>,
}

impl SessionManager {
    pub fn new(api: Arc<dyn BoardApi>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { api, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// Asks the server whether the current session is still good.
    ///
    /// A rejected session and an unreachable server look the same from here:
    /// both leave the client signed out and return `false`.
    pub async fn check_status(&self) -> bool {
        match self.api.current_user().await {
            Ok(user) => {
                tracing::info!("Session active for {}", user.email);
                self.publish(Some(user), Transition::Restored);
                true
            }
            Err(ApiError::Unauthorized) | Err(ApiError::Status { .. }) => {
                tracing::debug!("No active session");
                self.publish(None, Transition::Rejected);
                false
            }
            Err(e) => {
                tracing::error!("Auth check failed: {}", e);
                self.publish(None, Transition::Rejected);
                false
            }
        }
    }

    /// Acknowledges an identity the auth service has already confirmed.
    pub fn login(&self, user: User) {
        tracing::info!("Signed in as {}", user.username);
        self.publish(Some(user), Transition::SignedIn);
    }

    /// Signs out. The server is told on a best-effort basis; locally the
    /// session is always cleared, including the persisted token.
    pub async fn logout(&self) {
        if let Err(e) = self.api.sign_out().await {
            tracing::warn!("Logout error: {}", e);
        }
        if let Err(e) = self.api.forget_credentials().await {
            tracing::warn!("Failed to clear stored session token: {}", e);
        }

        tracing::info!("Signed out");
        self.publish(None, Transition::SignedOut);
    }

    /// Submits credentials; on success the returned identity is passed to
    /// [`login`](Self::login).
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let form = SigninForm {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        form.validate()?;

        let user = self
            .api
            .sign_in(&form)
            .await
            .map_err(|e| credential_error(e, "Sign in failed"))?;
        self.login(user.clone());
        Ok(user)
    }

    /// Registers a new account and signs straight into it.
    pub async fn sign_up(&self, email: &str, username: &str, password: &str) -> Result<User, AuthError> {
        let form = SignupForm {
            email: email.trim().to_string(),
            username: username.trim().to_string(),
            password: password.to_string(),
        };
        form.validate()?;

        let user = self
            .api
            .sign_up(&form)
            .await
            .map_err(|e| credential_error(e, "Sign up failed"))?;
        self.login(user.clone());
        Ok(user)
    }

    fn publish(&self, user: Option<User>, transition: Transition) {
        self.state.send_replace(SessionState { user, transition });
    }
}

fn credential_error(err: ApiError, fallback: &str) -> AuthError {
    tracing::warn!("{}: {}", fallback, err);
    match err {
        ApiError::Status { .. } | ApiError::Unauthorized => AuthError::Rejected(
            err.server_message().unwrap_or(fallback).to_string(),
        ),
        other => AuthError::Transport(other.to_string()),
    }
}
