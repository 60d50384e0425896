mod api;
mod session;
mod task_store;
mod token_store;

pub use api::{BoardApi, HttpBoardApi, TOKEN_COOKIE};
pub use session::{SessionManager, SessionState, Transition};
pub use task_store::TaskStore;
pub use token_store::TokenStore;
