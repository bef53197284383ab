//! Role predicates over an authenticated identity.

use crate::error::AppError;
use crate::models::{Role, User};

pub fn is_admin(user: &User) -> bool {
    user.has_role(Role::Admin)
}

pub fn is_manager(user: &User) -> bool {
    user.has_role(Role::Manager)
}

pub fn is_admin_or_manager(user: &User) -> bool {
    is_admin(user) || is_manager(user)
}

/// Gate for task mutations, department creation and manual log entries.
pub fn require_admin_or_manager(user: &User) -> Result<(), AppError> {
    if is_admin_or_manager(user) {
        Ok(())
    } else {
        log::warn!("user {} denied: Admin or Manager role required", user.username);
        Err(AppError::Forbidden(
            "You do not have permission to perform this action".into(),
        ))
    }
}

/// Gate for account management.
pub fn require_admin(user: &User) -> Result<(), AppError> {
    if is_admin(user) {
        Ok(())
    } else {
        log::warn!("user {} denied: Admin role required", user.username);
        Err(AppError::Forbidden(
            "You do not have permission to perform this action".into(),
        ))
    }
}
