use crate::auth::hash_password;
use crate::config::BootstrapAdmin;
use crate::error::AppError;
use crate::models::{NewUser, Role, User};
use crate::store::Store;

/// Creates the configured superuser unless an account with that username exists.
///
/// Returns the account either way. An existing account is left untouched, so
/// changing `ADMIN_PASSWORD` later has no effect on it.
pub async fn ensure_admin(store: &dyn Store, admin: &BootstrapAdmin) -> Result<User, AppError> {
    if let Some(existing) = store.find_user_by_username(&admin.username).await? {
        log::debug!("bootstrap admin {} already present", existing.username);
        return Ok(existing);
    }

    let user = store
        .create_user(NewUser {
            username: admin.username.clone(),
            email: admin.email.clone(),
            password_hash: hash_password(&admin.password)?,
            is_staff: true,
            is_superuser: true,
            roles: vec![Role::Admin],
        })
        .await?;
    log::info!("created bootstrap admin {}", user.username);
    Ok(user)
}
