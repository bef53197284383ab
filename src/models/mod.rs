pub mod client;
pub mod comment;
pub mod department;
pub mod task;
pub mod task_log;
pub mod user;

pub use client::{
    Client, ClientInput, ClientPatch, ClientRequest, ClientRequestInput, ClientRequestPatch,
    RequestCategory,
};
pub use comment::{CommentInput, TaskComment};
pub use department::{Department, DepartmentInput};
pub use task::{NewTask, Task, TaskChanges, TaskInput, TaskPatch, TaskStatus};
pub use task_log::{LogAction, NewTaskLog, TaskLog, TaskLogInput};
pub use user::{NewUser, Role, User, UserInput, UserSummary};

use serde::{Deserialize, Deserializer};
use validator::{ValidationError, ValidationErrors};

use crate::error::AppError;

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
///
/// Use together with `#[serde(default)]` on an `Option<Option<T>>` field.
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Gathers a field error for every non-nullable field that arrived as an
/// explicit `null`. Pair with [`double_option`].
pub(crate) struct NullCheck {
    errors: ValidationErrors,
}

impl NullCheck {
    pub(crate) fn new() -> Self {
        Self {
            errors: ValidationErrors::new(),
        }
    }

    /// Unwraps one level of `Option`, recording an error for `Some(None)`.
    pub(crate) fn take<T>(&mut self, field: &'static str, value: Option<Option<T>>) -> Option<T> {
        match value {
            Some(None) => {
                let mut error = ValidationError::new("null");
                error.message = Some("This field may not be null.".into());
                self.errors.add(field, error);
                None
            }
            other => other.flatten(),
        }
    }

    pub(crate) fn finish(self) -> Result<(), AppError> {
        if self.errors.errors().is_empty() {
            Ok(())
        } else {
            Err(AppError::ValidationError(self.errors))
        }
    }
}
