mod auth;
mod task;
mod dashboard;

pub use auth::{handle_status, handle_login, handle_register, handle_logout};
pub use task::{handle_list, handle_users, handle_create, handle_toggle};
pub use dashboard::{Dashboard, Mount};
