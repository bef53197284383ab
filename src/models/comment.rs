use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::UserSummary;

/// A comment on a task, with its author nested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskComment {
    pub id: i32,
    pub task: i32,
    pub user: UserSummary,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Body accepted by `POST /api/tasks/{task_id}/comments/`.
/// The task comes from the path and the author from the token.
#[derive(Debug, Deserialize, Validate)]
pub struct CommentInput {
    #[validate(length(min = 1))]
    pub comment: String,
}
