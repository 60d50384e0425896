//! Client for a shared task board.
//!
//! [`SessionManager`] owns authentication state, [`TaskStore`] keeps the
//! local task list in step with the server, and [`Dashboard`] is the view
//! that drives both. Navigation reacts to published session transitions
//! (see [`navigation`]).

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod navigation;
pub mod services;

pub use config::Config;
pub use errors::{ApiError, AppResult, AuthError, Feedback, Field, FieldErrors, StoreError};
pub use handlers::{Dashboard, Mount};
pub use models::{NewTask, StatusUpdate, Task, TaskDraft, User};
pub use navigation::{spawn_navigator, LogNavigator, Navigate, Route};
pub use services::{BoardApi, HttpBoardApi, SessionManager, SessionState, TaskStore, Transition};
