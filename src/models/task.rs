use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "dueDate")]
    pub due_date: DateTime<Utc>,
    #[serde(rename = "assignedto")]
    pub assigned_to: String,
    #[serde(rename = "userEmail")]
    pub owner_email: String,
    #[serde(default)]
    pub status: bool,
}

impl Task {
    pub fn status_label(&self) -> &'static str {
        if self.status {
            "Completed"
        } else {
            "Incomplete"
        }
    }
}

/// Body of a create request: a task without its server-assigned id.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewTask {
    pub name: String,
    pub description: String,
    #[serde(rename = "dueDate")]
    pub due_date: String,  // canonical ISO-8601, e.g. 2024-05-01T00:00:00.000Z
    #[serde(rename = "assignedto")]
    pub assigned_to: String,
    #[serde(rename = "userEmail")]
    pub owner_email: String,
    pub status: bool,
}

/// Server echo of a status toggle.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    #[serde(default)]
    pub id: Option<String>,
    pub status: bool,
}
