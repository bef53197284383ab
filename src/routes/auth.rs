use crate::{
    auth::{authenticate, AuthResponse, LoginRequest, RefreshRequest, RefreshResponse, TokenIssuer},
    error::AppError,
    store::Store,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Obtain a token pair
///
/// Accepts `{username, password}` where `username` may be a username or an email.
/// Unknown accounts, wrong passwords and blank or missing fields all get the
/// same 401 response.
#[post("/")]
pub async fn obtain_token_pair(
    store: web::Data<dyn Store>,
    issuer: web::Data<TokenIssuer>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let Some(user) = authenticate(store.get_ref(), &login_data.username, &login_data.password).await?
    else {
        log::warn!("refused login attempt");
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    };

    let pair = issuer.issue_pair(user.id)?;
    log::info!("issued token pair for user {}", user.id);

    Ok(HttpResponse::Ok().json(AuthResponse {
        refresh: pair.refresh,
        access: pair.access,
        user_id: user.id,
        username: user.username,
        email: user.email,
        is_staff: user.is_staff,
        is_superuser: user.is_superuser,
    }))
}

/// Exchange a refresh token for a new access token
#[post("/refresh/")]
pub async fn refresh_token(
    issuer: web::Data<TokenIssuer>,
    refresh_data: web::Json<RefreshRequest>,
) -> Result<impl Responder, AppError> {
    refresh_data.validate()?;
    let access = issuer.refresh_access(&refresh_data.refresh)?;
    Ok(HttpResponse::Ok().json(RefreshResponse { access }))
}
