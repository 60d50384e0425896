mod user;
mod forms;
mod task;

pub use user::User;
pub use forms::{SigninForm, SignupForm, TaskDraft};
pub use task::{NewTask, StatusUpdate, Task};
