use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::errors::{ApiError, AppResult, Field, FieldErrors, StoreError};
use crate::models::{Task, TaskDraft};
use super::{BoardApi, SessionManager};

const LOAD_FAILED: &str = "Failed to load tasks";
const CREATE_FAILED: &str = "Failed to create task";
const TOGGLE_FAILED: &str = "Failed to update task status";

#[derive(Debug, Default)]
struct BoardState {
    tasks: Vec<Task>,
    last_error: Option<String>,
    /// Fetches currently awaiting the server.
    in_flight: usize,
    /// Bumped when a fetch is issued or a toggle is confirmed.
    epoch: u64,
    /// Epoch of the fetch the current list came from.
    synced_at: u64,
    /// Toggle confirmations newer than `synced_at`: task id -> (epoch, status).
    confirmed: HashMap<String, (u64, bool)>,
}

/// Local cache of the board's tasks.
///
/// The server is the only source of truth. Entries are replaced with what
/// the server echoes and never computed locally; a failed call leaves the
/// cache exactly as it was. The lock is never held across a request, so
/// completions apply one at a time in the order they arrive.
///
/// Overlapping requests are ordered by epoch: a fetch issued before another
/// fetch that has already landed is discarded, and a toggle confirmed after
/// a fetch was issued still wins over that fetch's copy of the row.
pub struct TaskStore {
    api: Arc<dyn BoardApi>,
    session: Arc<SessionManager>,
    state: RwLock<BoardState>,
}

impl TaskStore {
    pub fn new(api: Arc<dyn BoardApi>, session: Arc<SessionManager>) -> Self {
        Self {
            api,
            session,
            state: RwLock::new(BoardState::default()),
        }
    }

    /// Tasks in display order (the order the server listed them).
    pub async fn tasks(&self) -> Vec<Task> {
        self.state.read().await.tasks.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.in_flight > 0
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    pub async fn dismiss_error(&self) {
        self.state.write().await.last_error = None;
    }

    /// Replaces the whole list with the server's collection.
    ///
    /// On a 401 the session is ended; on any other failure the banner is set
    /// and the previous list kept. Returns the list as it stands afterwards.
    pub async fn fetch_all(&self) -> Vec<Task> {
        let issued = {
            let mut state = self.state.write().await;
            state.in_flight += 1;
            state.last_error = None;
            state.epoch += 1;
            state.epoch
        };

        let result = self.api.list_tasks().await;

        let mut state = self.state.write().await;
        state.in_flight -= 1;
        match result {
            Ok(_) if issued < state.synced_at => {
                tracing::debug!("Discarding task list from superseded fetch {}", issued);
            }
            Ok(mut tasks) => {
                tracing::debug!("Loaded {} tasks", tasks.len());
                for task in tasks.iter_mut() {
                    if let Some(&(at, status)) = state.confirmed.get(&task.id) {
                        if at > issued {
                            task.status = status;
                        }
                    }
                }
                state.confirmed.retain(|_, (at, _)| *at > issued);
                state.tasks = tasks;
                state.synced_at = issued;
            }
            Err(ApiError::Unauthorized) => {
                drop(state);
                self.expire_session().await;
                return self.tasks().await;
            }
            Err(e) => {
                tracing::error!("Failed to fetch tasks: {}", e);
                state.last_error = Some(LOAD_FAILED.to_string());
            }
        }
        state.tasks.clone()
    }

    /// Validates and submits a new task, then resynchronizes the list.
    ///
    /// Nothing is sent unless every required field is present. The new task
    /// is not appended locally; it shows up through the refetch, which starts
    /// only after the create response has arrived.
    pub async fn create(&self, draft: &TaskDraft) -> AppResult<Task> {
        let owner = self.session.user();
        let body = draft
            .validate(owner.as_ref().map(|user| user.email.as_str()))
            .map_err(|errors| {
                tracing::debug!("Task draft rejected: {}", errors);
                StoreError::ValidationFailed(errors)
            })?;

        let created = match self.api.create_task(&body).await {
            Ok(task) => task,
            Err(ApiError::Unauthorized) => {
                self.expire_session().await;
                return Err(StoreError::AuthExpired);
            }
            Err(ApiError::Status { status, message }) => {
                tracing::warn!("Server rejected task ({}): {}", status, message);
                return Err(StoreError::ValidationFailed(server_field_errors(&message)));
            }
            Err(e) => {
                tracing::error!("Failed to create task: {}", e);
                self.state.write().await.last_error = Some(CREATE_FAILED.to_string());
                return Err(StoreError::TransportFailure(CREATE_FAILED.to_string()));
            }
        };

        tracing::info!("Created task {} ({})", created.id, created.name);
        self.fetch_all().await;
        Ok(created)
    }

    /// Flips a task's status on the server and applies the value it reports.
    pub async fn toggle_status(&self, task_id: &str) -> AppResult<Task> {
        if !self.state.read().await.tasks.iter().any(|task| task.id == task_id) {
            return Err(StoreError::UnknownTask(task_id.to_string()));
        }

        match self.api.toggle_status(task_id).await {
            Ok(update) => {
                let mut state = self.state.write().await;
                state.epoch += 1;
                let confirmed_at = state.epoch;
                state
                    .confirmed
                    .insert(task_id.to_string(), (confirmed_at, update.status));

                // The list may have been resynchronized while the call was out
                let task = state
                    .tasks
                    .iter_mut()
                    .find(|task| task.id == task_id)
                    .ok_or_else(|| StoreError::UnknownTask(task_id.to_string()))?;
                task.status = update.status;
                tracing::debug!("Task {} is now {}", task_id, task.status_label());
                Ok(task.clone())
            }
            Err(ApiError::Unauthorized) => {
                self.expire_session().await;
                Err(StoreError::AuthExpired)
            }
            Err(e) => {
                tracing::error!("Failed to toggle task {}: {}", task_id, e);
                self.state.write().await.last_error = Some(TOGGLE_FAILED.to_string());
                Err(StoreError::TransportFailure(TOGGLE_FAILED.to_string()))
            }
        }
    }

    async fn expire_session(&self) {
        tracing::warn!("Session expired mid-use, signing out");
        self.session.logout().await;
    }
}

// The only field-specific rejection the API makes is an unknown assignee.
fn server_field_errors(message: &str) -> FieldErrors {
    if message.contains("Assigned user") {
        FieldErrors::single(Field::AssignedTo, message)
    } else {
        FieldErrors::single(Field::Name, CREATE_FAILED)
    }
}
