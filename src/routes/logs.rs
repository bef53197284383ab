use crate::{
    auth::{require_admin_or_manager, CurrentUser},
    error::AppError,
    models::TaskLogInput,
    store::Store,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use validator::Validate;

/// Lists the audit entries of a task. A missing task is a 404.
#[get("/{task_id}/logs/")]
pub async fn list_logs(
    store: web::Data<dyn Store>,
    _user: CurrentUser,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    if store.find_task(task_id).await?.is_none() {
        return Err(AppError::NotFound("Task not found".into()));
    }
    let logs = store.list_logs(task_id).await?;
    Ok(HttpResponse::Ok().json(logs))
}

/// Records a manual audit entry on a task, attributed to the caller.
///
/// Requires the Admin or Manager role. Entries are never derived from task
/// updates automatically.
#[post("/{task_id}/logs/")]
pub async fn create_log(
    store: web::Data<dyn Store>,
    user: CurrentUser,
    task_id: web::Path<i32>,
    log_data: web::Json<TaskLogInput>,
) -> Result<impl Responder, AppError> {
    require_admin_or_manager(&user)?;
    let task_id = task_id.into_inner();
    if store.find_task(task_id).await?.is_none() {
        return Err(AppError::NotFound("Task not found".into()));
    }
    log_data.validate()?;

    let entry = store
        .create_log(log_data.into_inner().into_new_log(task_id, user.id))
        .await?;
    log::info!("log {} recorded on task {} by {}", entry.id, task_id, user.username);
    Ok(HttpResponse::Created().json(entry))
}
