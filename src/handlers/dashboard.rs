use std::sync::Arc;
use tokio::sync::RwLock;
use crate::models::User;
use crate::services::{BoardApi, SessionManager, TaskStore};

/// Result of mounting the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mount {
    Ready,
    RedirectedToLogin,
}

/// The view that consumes the session and the task store.
pub struct Dashboard {
    api: Arc<dyn BoardApi>,
    session: Arc<SessionManager>,
    store: Arc<TaskStore>,
    users: RwLock<Vec<User>>,
}

impl Dashboard {
    pub fn new(api: Arc<dyn BoardApi>, session: Arc<SessionManager>, store: Arc<TaskStore>) -> Self {
        Self {
            api,
            session,
            store,
            users: RwLock::new(Vec::new()),
        }
    }

    /// Wires up a dashboard with its own session manager and store.
    pub fn assemble(api: Arc<dyn BoardApi>) -> Self {
        let session = Arc::new(SessionManager::new(api.clone()));
        let store = Arc::new(TaskStore::new(api.clone(), session.clone()));
        Self::new(api, session, store)
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }

    /// Users a new task can be assigned to.
    pub async fn users(&self) -> Vec<User> {
        self.users.read().await.clone()
    }

    /// Checks the session and, only if it is live, loads the board.
    pub async fn mount(&self) -> Mount {
        tracing::info!("Mounting dashboard");

        if !self.session.check_status().await {
            return Mount::RedirectedToLogin;
        }

        tokio::join!(self.store.fetch_all(), self.refresh_users());

        // The task fetch can still find the session expired
        if self.session.is_authenticated() {
            Mount::Ready
        } else {
            Mount::RedirectedToLogin
        }
    }

    /// Reloads the assignable users. Failure leaves the list empty.
    pub async fn refresh_users(&self) {
        let users = match self.api.list_users().await {
            Ok(users) => users,
            Err(e) => {
                tracing::error!("Error fetching users: {}", e);
                Vec::new()
            }
        };
        *self.users.write().await = users;
    }

    /// Plain-text rendering of the board.
    pub async fn render(&self) -> String {
        let mut out = String::new();

        if let Some(user) = self.session.user() {
            out.push_str(&format!("Signed in as {} <{}>\n", user.username, user.email));
        }
        if let Some(error) = self.store.last_error().await {
            out.push_str(&format!("! {}\n", error));
        }

        let tasks = self.store.tasks().await;
        if tasks.is_empty() {
            out.push_str("No tasks found\n");
            return out;
        }

        out.push_str(&format!(
            "{:<4} {:<24} {:<32} {:<10} {:<12} {}\n",
            "No.", "Task Name", "Description", "Due Date", "Assigned To", "Status"
        ));
        for (index, task) in tasks.iter().enumerate() {
            out.push_str(&format!(
                "{:<4} {:<24} {:<32} {:<10} {:<12} {}\n",
                index + 1,
                task.name,
                task.description,
                task.due_date.format("%Y-%m-%d"),
                task.assigned_to,
                task.status_label()
            ));
        }
        out
    }
}
