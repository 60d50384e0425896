use crate::errors::{Feedback, StoreError};
use crate::models::TaskDraft;
use super::dashboard::{Dashboard, Mount};

async fn require_board(dashboard: &Dashboard) -> Result<(), Feedback> {
    match dashboard.mount().await {
        Mount::Ready => Ok(()),
        Mount::RedirectedToLogin => Err(StoreError::NotAuthenticated.into()),
    }
}

pub async fn handle_list(dashboard: &Dashboard) -> Result<String, Feedback> {
    require_board(dashboard).await?;
    Ok(dashboard.render().await)
}

pub async fn handle_users(dashboard: &Dashboard) -> Result<String, Feedback> {
    require_board(dashboard).await?;
    let users = dashboard.users().await;
    if users.is_empty() {
        return Ok("No assignable users".to_string());
    }
    Ok(users
        .iter()
        .map(|user| format!("{:<16} {}", user.username, user.email))
        .collect::<Vec<_>>()
        .join("\n"))
}

pub async fn handle_create(dashboard: &Dashboard, draft: TaskDraft) -> Result<String, Feedback> {
    require_board(dashboard).await?;
    let task = dashboard.store().create(&draft).await?;
    Ok(format!("Created task {}\n\n{}", task.name, dashboard.render().await))
}

/// `target` is either the task number shown in the list or a task id.
pub async fn handle_toggle(dashboard: &Dashboard, target: &str) -> Result<String, Feedback> {
    require_board(dashboard).await?;

    let tasks = dashboard.store().tasks().await;
    let task_id = target
        .parse::<usize>()
        .ok()
        .and_then(|number| number.checked_sub(1))
        .and_then(|index| tasks.get(index))
        .map(|task| task.id.clone())
        .unwrap_or_else(|| target.to_string());

    let task = dashboard.store().toggle_status(&task_id).await?;
    Ok(format!("{} is now {}", task.name, task.status_label()))
}
