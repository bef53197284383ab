use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{ClientRequestInput, ClientRequestPatch},
    store::Store,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use validator::Validate;

#[get("/")]
pub async fn list_client_requests(
    store: web::Data<dyn Store>,
    _user: CurrentUser,
) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(store.list_client_requests().await?))
}

/// Files a request for an existing client. `submitted_at` is set by the server.
#[post("/")]
pub async fn create_client_request(
    store: web::Data<dyn Store>,
    user: CurrentUser,
    request_data: web::Json<ClientRequestInput>,
) -> Result<impl Responder, AppError> {
    request_data.validate()?;
    ensure_client(store.get_ref(), Some(request_data.client)).await?;

    let request = store
        .create_client_request(request_data.into_inner())
        .await?;
    log::info!(
        "client request {} filed for client {} by {}",
        request.id,
        request.client,
        user.username
    );
    Ok(HttpResponse::Created().json(request))
}

#[get("/{id}/")]
pub async fn get_client_request(
    store: web::Data<dyn Store>,
    _user: CurrentUser,
    request_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    match store.find_client_request(request_id.into_inner()).await? {
        Some(request) => Ok(HttpResponse::Ok().json(request)),
        None => Err(AppError::NotFound("Client request not found".into())),
    }
}

#[put("/{id}/")]
pub async fn update_client_request(
    store: web::Data<dyn Store>,
    _user: CurrentUser,
    request_id: web::Path<i32>,
    request_data: web::Json<ClientRequestInput>,
) -> Result<impl Responder, AppError> {
    request_data.validate()?;
    apply_changes(
        store.get_ref(),
        request_id.into_inner(),
        request_data.into_inner().into(),
    )
    .await
}

#[patch("/{id}/")]
pub async fn patch_client_request(
    store: web::Data<dyn Store>,
    _user: CurrentUser,
    request_id: web::Path<i32>,
    request_data: web::Json<ClientRequestPatch>,
) -> Result<impl Responder, AppError> {
    request_data.validate()?;
    apply_changes(
        store.get_ref(),
        request_id.into_inner(),
        request_data.into_inner(),
    )
    .await
}

#[delete("/{id}/")]
pub async fn delete_client_request(
    store: web::Data<dyn Store>,
    _user: CurrentUser,
    request_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    if !store.delete_client_request(request_id.into_inner()).await? {
        return Err(AppError::NotFound("Client request not found".into()));
    }
    Ok(HttpResponse::NoContent().finish())
}

async fn apply_changes(
    store: &dyn Store,
    request_id: i32,
    changes: ClientRequestPatch,
) -> Result<HttpResponse, AppError> {
    if store.find_client_request(request_id).await?.is_none() {
        return Err(AppError::NotFound("Client request not found".into()));
    }
    ensure_client(store, changes.client).await?;

    match store.update_client_request(request_id, changes).await? {
        Some(request) => Ok(HttpResponse::Ok().json(request)),
        None => Err(AppError::NotFound("Client request not found".into())),
    }
}

async fn ensure_client(store: &dyn Store, client: Option<i32>) -> Result<(), AppError> {
    if let Some(id) = client {
        if store.find_client(id).await?.is_none() {
            return Err(AppError::invalid_field(
                "client",
                "does_not_exist",
                format!("Invalid pk \"{}\" - object does not exist.", id),
            ));
        }
    }
    Ok(())
}
