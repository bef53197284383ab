use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use std::ops::Deref;

use crate::auth::token::Claims;
use crate::error::AppError;
use crate::models::User;
use crate::store::Store;

/// The authenticated caller, loaded fresh from the store with its roles.
///
/// Relies on `AuthMiddleware` having verified the access token and stored its
/// `Claims` in the request extensions. A token whose user no longer exists or
/// was deactivated is rejected with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl Deref for CurrentUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        let store = req.app_data::<web::Data<dyn Store>>().cloned();

        Box::pin(async move {
            let claims = claims.ok_or_else(|| {
                AppError::Unauthorized("Authentication credentials were not provided".into())
            })?;
            let store = store
                .ok_or_else(|| AppError::InternalServerError("Store not configured".into()))?;

            match store.find_user_by_id(claims.sub).await? {
                Some(user) if user.is_active => Ok(CurrentUser(user)),
                _ => Err(AppError::Unauthorized("User not found".into()).into()),
            }
        })
    }
}
