use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::UserSummary;

/// Kind of change recorded by a task log entry.
/// Corresponds to the `log_action` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "log_action", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogAction {
    StatusChange,
    AssignmentChange,
}

/// An audit entry for a task. `user` is `None` once the acting account is removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskLog {
    pub id: i32,
    pub task: i32,
    pub user: Option<UserSummary>,
    pub action_type: LogAction,
    pub old_value: String,
    pub new_value: String,
    pub created_at: DateTime<Utc>,
}

/// Body accepted by `POST /api/tasks/{task_id}/logs/`.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskLogInput {
    pub action_type: LogAction,
    #[validate(length(min = 1, max = 255))]
    pub old_value: String,
    #[validate(length(min = 1, max = 255))]
    pub new_value: String,
}

#[derive(Debug, Clone)]
pub struct NewTaskLog {
    pub task: i32,
    pub user: Option<i32>,
    pub action_type: LogAction,
    pub old_value: String,
    pub new_value: String,
}

impl TaskLogInput {
    pub fn into_new_log(self, task: i32, user: i32) -> NewTaskLog {
        NewTaskLog {
            task,
            user: Some(user),
            action_type: self.action_type,
            old_value: self.old_value,
            new_value: self.new_value,
        }
    }
}
