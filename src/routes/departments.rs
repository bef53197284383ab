use crate::{
    auth::{require_admin_or_manager, CurrentUser},
    error::AppError,
    models::DepartmentInput,
    store::Store,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use validator::Validate;

#[get("/")]
pub async fn list_departments(
    store: web::Data<dyn Store>,
    _user: CurrentUser,
) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(store.list_departments().await?))
}

/// Creates a department. Requires the Admin or Manager role.
#[post("/")]
pub async fn create_department(
    store: web::Data<dyn Store>,
    user: CurrentUser,
    department_data: web::Json<DepartmentInput>,
) -> Result<impl Responder, AppError> {
    require_admin_or_manager(&user)?;
    department_data.validate()?;

    let department = store.create_department(&department_data.name).await?;
    log::info!("department {} created by {}", department.id, user.username);
    Ok(HttpResponse::Created().json(department))
}
