use crate::{
    auth::{hash_password, require_admin, CurrentUser},
    error::AppError,
    models::{NewUser, UserInput},
    store::Store,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use validator::Validate;

/// Lists accounts as `{id, username, email}`.
#[get("/")]
pub async fn list_users(
    store: web::Data<dyn Store>,
    _user: CurrentUser,
) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(store.list_users().await?))
}

/// Creates an account with a password and group memberships.
///
/// Requires the Admin role. Usernames must be unique.
#[post("/")]
pub async fn create_user(
    store: web::Data<dyn Store>,
    user: CurrentUser,
    user_data: web::Json<UserInput>,
) -> Result<impl Responder, AppError> {
    require_admin(&user)?;
    user_data.validate()?;

    if store
        .find_user_by_username(&user_data.username)
        .await?
        .is_some()
    {
        return Err(AppError::invalid_field(
            "username",
            "unique",
            "A user with that username already exists",
        ));
    }

    let input = user_data.into_inner();
    let created = store
        .create_user(NewUser {
            password_hash: hash_password(&input.password)?,
            username: input.username,
            email: input.email,
            is_staff: input.is_staff,
            is_superuser: false,
            roles: input.roles,
        })
        .await?;

    log::info!("user {} created by {}", created.username, user.username);
    Ok(HttpResponse::Created().json(created))
}
