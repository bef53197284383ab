use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{double_option, NullCheck};
use crate::error::AppError;

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
///
/// Any value may follow any other; there is no transition table.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Newly created, not yet picked up.
    #[default]
    Open,
    /// Being worked on.
    InProgress,
    /// Finished.
    Done,
}

/// Represents a task as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: String,
    /// Identifier of the owning department.
    pub department: i32,
    /// Username of the creator. Read-only, set from the authenticated caller.
    pub created_by: String,
    /// Identifier of the assignee, if any.
    pub assigned_to: Option<i32>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

/// Body accepted by `POST /api/tasks/` and `PUT /api/tasks/{id}/`.
///
/// `title` and `department` are required. Omitted optional fields keep their
/// default on create and their current value on update; an explicit `null` is
/// rejected except on `assigned_to`. Any `created_by` in the body is ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskInput {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub department: i32,
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_to: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub status: Option<Option<TaskStatus>>,
}

/// Body accepted by `PATCH /api/tasks/{id}/`. Every field is optional.
/// `"assigned_to": null` clears the assignee; `null` on any other field is a
/// validation error.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TaskPatch {
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(min = 1, max = 255))]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub department: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_to: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub status: Option<Option<TaskStatus>>,
}

/// Fields written when a task is inserted.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub department: i32,
    /// User id of the creator.
    pub created_by: i32,
    pub assigned_to: Option<i32>,
    pub status: TaskStatus,
}

/// Column updates applied to an existing task. `None` leaves a column untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub department: Option<i32>,
    pub assigned_to: Option<Option<i32>>,
    pub status: Option<TaskStatus>,
}

impl TaskInput {
    /// Builds the insert for a task created by `created_by`.
    pub fn into_new_task(self, created_by: i32) -> Result<NewTask, AppError> {
        let mut nulls = NullCheck::new();
        let description = nulls.take("description", self.description);
        let status = nulls.take("status", self.status);
        nulls.finish()?;

        Ok(NewTask {
            title: self.title,
            description: description.unwrap_or_default(),
            department: self.department,
            created_by,
            assigned_to: self.assigned_to.flatten(),
            status: status.unwrap_or_default(),
        })
    }

    pub fn into_changes(self) -> Result<TaskChanges, AppError> {
        let mut nulls = NullCheck::new();
        let description = nulls.take("description", self.description);
        let status = nulls.take("status", self.status);
        nulls.finish()?;

        Ok(TaskChanges {
            title: Some(self.title),
            description,
            department: Some(self.department),
            assigned_to: self.assigned_to,
            status,
        })
    }
}

impl TryFrom<TaskPatch> for TaskChanges {
    type Error = AppError;

    fn try_from(patch: TaskPatch) -> Result<Self, AppError> {
        let mut nulls = NullCheck::new();
        let changes = Self {
            title: nulls.take("title", patch.title),
            description: nulls.take("description", patch.description),
            department: nulls.take("department", patch.department),
            assigned_to: patch.assigned_to,
            status: nulls.take("status", patch.status),
        };
        nulls.finish()?;
        Ok(changes)
    }
}

impl TaskChanges {
    /// Department and assignee ids that must exist before the update is applied.
    pub fn references(&self) -> (Option<i32>, Option<i32>) {
        (self.department, self.assigned_to.flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_creation_defaults() {
        let input: TaskInput = serde_json::from_value(json!({
            "title": "Replace router",
            "department": 3
        }))
        .unwrap();

        let task = input.into_new_task(7).unwrap();
        assert_eq!(task.title, "Replace router");
        assert_eq!(task.description, "");
        assert_eq!(task.created_by, 7);
        assert_eq!(task.status, TaskStatus::Open);
        assert!(task.assigned_to.is_none());
    }

    #[test]
    fn test_created_by_in_body_is_ignored() {
        let input: TaskInput = serde_json::from_value(json!({
            "title": "Audit accounts",
            "department": 1,
            "created_by": 999
        }))
        .unwrap();
        assert_eq!(input.into_new_task(4).unwrap().created_by, 4);
    }

    #[test]
    fn test_task_validation() {
        let valid: TaskInput =
            serde_json::from_value(json!({ "title": "Valid", "department": 1 })).unwrap();
        assert!(valid.validate().is_ok());

        let empty_title: TaskInput =
            serde_json::from_value(json!({ "title": "", "department": 1 })).unwrap();
        assert!(empty_title.validate().is_err());

        let long_title: TaskInput =
            serde_json::from_value(json!({ "title": "a".repeat(256), "department": 1 })).unwrap();
        assert!(long_title.validate().is_err());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            json!("IN_PROGRESS")
        );
        let parsed: Result<TaskStatus, _> = serde_json::from_value(json!("BLOCKED"));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_patch_distinguishes_null_from_absent() {
        let cleared: TaskPatch = serde_json::from_value(json!({ "assigned_to": null })).unwrap();
        assert_eq!(cleared.assigned_to, Some(None));

        let untouched: TaskPatch = serde_json::from_value(json!({ "status": "DONE" })).unwrap();
        assert_eq!(untouched.assigned_to, None);

        let changes = TaskChanges::try_from(untouched).unwrap();
        assert_eq!(changes.status, Some(TaskStatus::Done));
        assert_eq!(changes.references(), (None, None));
    }

    #[test]
    fn test_explicit_null_rejected_on_non_nullable_fields() {
        let patch: TaskPatch = serde_json::from_value(json!({
            "title": null,
            "department": null,
            "status": null,
            "assigned_to": null
        }))
        .unwrap();
        match TaskChanges::try_from(patch) {
            Err(AppError::ValidationError(errors)) => {
                let fields = errors.field_errors();
                assert!(fields.contains_key("title"));
                assert!(fields.contains_key("department"));
                assert!(fields.contains_key("status"));
                assert!(!fields.contains_key("assigned_to"));
                assert_eq!(fields["status"][0].code, "null");
            }
            other => panic!("expected null field errors, got {:?}", other),
        }

        let input: TaskInput = serde_json::from_value(json!({
            "title": "Replace router",
            "department": 3,
            "description": null
        }))
        .unwrap();
        assert!(matches!(
            input.into_new_task(1),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_patch_title_length_still_validated() {
        let patch: TaskPatch = serde_json::from_value(json!({ "title": "" })).unwrap();
        assert!(patch.validate().is_err());
    }
}
