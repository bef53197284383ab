use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{ClientInput, ClientPatch},
    store::Store,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use validator::Validate;

#[get("/")]
pub async fn list_clients(
    store: web::Data<dyn Store>,
    _user: CurrentUser,
) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(store.list_clients().await?))
}

#[post("/")]
pub async fn create_client(
    store: web::Data<dyn Store>,
    user: CurrentUser,
    client_data: web::Json<ClientInput>,
) -> Result<impl Responder, AppError> {
    client_data.validate()?;
    let client = store
        .create_client(&client_data.name, &client_data.department)
        .await?;
    log::info!("client {} created by {}", client.id, user.username);
    Ok(HttpResponse::Created().json(client))
}

#[get("/{id}/")]
pub async fn get_client(
    store: web::Data<dyn Store>,
    _user: CurrentUser,
    client_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    match store.find_client(client_id.into_inner()).await? {
        Some(client) => Ok(HttpResponse::Ok().json(client)),
        None => Err(AppError::NotFound("Client not found".into())),
    }
}

#[put("/{id}/")]
pub async fn update_client(
    store: web::Data<dyn Store>,
    _user: CurrentUser,
    client_id: web::Path<i32>,
    client_data: web::Json<ClientInput>,
) -> Result<impl Responder, AppError> {
    client_data.validate()?;
    apply_changes(
        store.get_ref(),
        client_id.into_inner(),
        client_data.into_inner().into(),
    )
    .await
}

#[patch("/{id}/")]
pub async fn patch_client(
    store: web::Data<dyn Store>,
    _user: CurrentUser,
    client_id: web::Path<i32>,
    client_data: web::Json<ClientPatch>,
) -> Result<impl Responder, AppError> {
    client_data.validate()?;
    apply_changes(store.get_ref(), client_id.into_inner(), client_data.into_inner()).await
}

/// Deletes a client and every request it submitted.
#[delete("/{id}/")]
pub async fn delete_client(
    store: web::Data<dyn Store>,
    user: CurrentUser,
    client_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let client_id = client_id.into_inner();
    if !store.delete_client(client_id).await? {
        return Err(AppError::NotFound("Client not found".into()));
    }
    log::info!("client {} deleted by {}", client_id, user.username);
    Ok(HttpResponse::NoContent().finish())
}

async fn apply_changes(
    store: &dyn Store,
    client_id: i32,
    changes: ClientPatch,
) -> Result<HttpResponse, AppError> {
    match store.update_client(client_id, changes).await? {
        Some(client) => Ok(HttpResponse::Ok().json(client)),
        None => Err(AppError::NotFound("Client not found".into())),
    }
}
