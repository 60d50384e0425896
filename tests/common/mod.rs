//! In-memory board API used by the session and store tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use taskboard_client::models::{SigninForm, SignupForm};
use taskboard_client::{ApiError, BoardApi, NewTask, StatusUpdate, Task, User};

/// How a scripted call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Unauthorized,
    Status(u16),
    Transport,
}

impl Failure {
    fn into_error(self) -> ApiError {
        match self {
            Failure::Unauthorized => ApiError::Unauthorized,
            Failure::Status(status) => ApiError::Status {
                status,
                message: "scripted failure".to_string(),
            },
            Failure::Transport => ApiError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )),
        }
    }
}

#[derive(Default)]
pub struct FakeBoard {
    /// Identity the server associates with the current session.
    pub session_user: Mutex<Option<User>>,
    pub accounts: Mutex<Vec<(User, String)>>,
    pub tasks: Mutex<Vec<Task>>,
    pub users: Mutex<Vec<User>>,
    /// Operation name -> failure, applied until cleared.
    pub failures: Mutex<HashMap<&'static str, Failure>>,
    /// Delays for successive toggle calls, consumed front to back.
    pub toggle_delays: Mutex<Vec<Duration>>,
    /// Delays for successive list calls, applied after the snapshot is taken.
    pub list_delays: Mutex<Vec<Duration>>,
    /// Statuses reported by toggle responses, in completion order.
    pub toggle_replies: Mutex<Vec<bool>>,
    pub calls: Mutex<Vec<&'static str>>,
    next_id: Mutex<u32>,
}

pub fn alice() -> User {
    User {
        email: "a@x.com".to_string(),
        username: "alice".to_string(),
    }
}

pub fn bob() -> User {
    User {
        email: "b@x.com".to_string(),
        username: "bob".to_string(),
    }
}

pub fn task(id: &str, name: &str, status: bool) -> Task {
    Task {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{} details", name),
        due_date: DateTime::parse_from_rfc3339("2024-05-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc),
        assigned_to: "bob".to_string(),
        owner_email: "a@x.com".to_string(),
        status,
    }
}

fn next_delay(delays: &Mutex<Vec<Duration>>) -> Duration {
    let mut delays = delays.lock().unwrap();
    if delays.is_empty() {
        Duration::ZERO
    } else {
        delays.remove(0)
    }
}

impl FakeBoard {
    /// Alice signed in, bob assignable, no tasks.
    pub fn signed_in() -> Self {
        let board = Self::default();
        *board.session_user.lock().unwrap() = Some(alice());
        *board.users.lock().unwrap() = vec![alice(), bob()];
        board
    }

    pub fn with_tasks(self, tasks: Vec<Task>) -> Self {
        *self.tasks.lock().unwrap() = tasks;
        self
    }

    pub fn fail(&self, op: &'static str, failure: Failure) {
        self.failures.lock().unwrap().insert(op, failure);
    }

    pub fn recover(&self, op: &'static str) {
        self.failures.lock().unwrap().remove(op);
    }

    pub fn calls_to(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|call| **call == op).count()
    }

    fn enter(&self, op: &'static str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(op);
        match self.failures.lock().unwrap().get(op) {
            Some(failure) => Err(failure.into_error()),
            None => Ok(()),
        }
    }

    pub fn delay_lists(&self, delays: &[Duration]) {
        *self.list_delays.lock().unwrap() = delays.to_vec();
    }

    fn require_session(&self) -> Result<User, ApiError> {
        self.session_user
            .lock()
            .unwrap()
            .clone()
            .ok_or(ApiError::Unauthorized)
    }
}

#[async_trait]
impl BoardApi for FakeBoard {
    async fn current_user(&self) -> Result<User, ApiError> {
        self.enter("current_user")?;
        self.require_session()
    }

    async fn sign_in(&self, form: &SigninForm) -> Result<User, ApiError> {
        self.enter("sign_in")?;
        let accounts = self.accounts.lock().unwrap();
        let user = accounts
            .iter()
            .find(|(user, password)| user.email == form.email && *password == form.password)
            .map(|(user, _)| user.clone())
            .ok_or_else(|| ApiError::Status {
                status: 401,
                message: "Invalid email or password".to_string(),
            })?;
        *self.session_user.lock().unwrap() = Some(user.clone());
        Ok(user)
    }

    async fn sign_up(&self, form: &SignupForm) -> Result<User, ApiError> {
        self.enter("sign_up")?;
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|(user, _)| user.email == form.email) {
            return Err(ApiError::Status {
                status: 400,
                message: "Email already registered".to_string(),
            });
        }
        let user = User {
            email: form.email.clone(),
            username: form.username.clone(),
        };
        accounts.push((user.clone(), form.password.clone()));
        *self.session_user.lock().unwrap() = Some(user.clone());
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), ApiError> {
        self.enter("sign_out")?;
        *self.session_user.lock().unwrap() = None;
        Ok(())
    }

    async fn forget_credentials(&self) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push("forget_credentials");
        Ok(())
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.enter("list_tasks")?;
        self.require_session()?;

        let snapshot = self.tasks.lock().unwrap().clone();
        tokio::time::sleep(next_delay(&self.list_delays)).await;
        Ok(snapshot)
    }

    async fn create_task(&self, new_task: &NewTask) -> Result<Task, ApiError> {
        self.enter("create_task")?;
        self.require_session()?;

        let assignee_known = self
            .users
            .lock()
            .unwrap()
            .iter()
            .any(|user| user.username == new_task.assigned_to);
        if !assignee_known {
            return Err(ApiError::Status {
                status: 400,
                message: "Assigned user not found".to_string(),
            });
        }

        let id = {
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            format!("srv-{}", next)
        };
        let created = Task {
            id,
            name: new_task.name.clone(),
            description: new_task.description.clone(),
            due_date: DateTime::parse_from_rfc3339(&new_task.due_date)
                .unwrap()
                .with_timezone(&Utc),
            assigned_to: new_task.assigned_to.clone(),
            owner_email: new_task.owner_email.clone(),
            status: new_task.status,
        };
        self.tasks.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn toggle_status(&self, task_id: &str) -> Result<StatusUpdate, ApiError> {
        self.enter("toggle_status")?;
        self.require_session()?;

        // The server flips at request time; the reply may arrive later
        let status = {
            let mut tasks = self.tasks.lock().unwrap();
            let task = tasks
                .iter_mut()
                .find(|task| task.id == task_id)
                .ok_or_else(|| ApiError::Status {
                    status: 404,
                    message: "Task not found".to_string(),
                })?;
            task.status = !task.status;
            task.status
        };

        tokio::time::sleep(next_delay(&self.toggle_delays)).await;

        self.toggle_replies.lock().unwrap().push(status);
        Ok(StatusUpdate {
            id: Some(task_id.to_string()),
            status,
        })
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.enter("list_users")?;
        self.require_session()?;
        Ok(self.users.lock().unwrap().clone())
    }
}
