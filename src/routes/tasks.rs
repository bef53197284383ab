use crate::{
    auth::{require_admin_or_manager, CurrentUser},
    error::AppError,
    models::{TaskChanges, TaskInput, TaskPatch},
    store::Store,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Retrieves every task, ordered by id.
///
/// Any authenticated user may list tasks.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects.
/// - `401 Unauthorized`: missing or invalid access token.
#[get("/")]
pub async fn list_tasks(
    store: web::Data<dyn Store>,
    _user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let tasks = store.list_tasks().await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task.
///
/// Requires the Admin or Manager role. `created_by` is always the caller,
/// whatever the body says.
///
/// ## Request Body:
/// - `title` (required, 1-255 chars)
/// - `department` (required, id of an existing department)
/// - `description` (optional)
/// - `assigned_to` (optional, id of an existing user)
/// - `status` (optional, `OPEN` | `IN_PROGRESS` | `DONE`, defaults to `OPEN`)
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `400 Bad Request`: malformed JSON or unknown status value.
/// - `401 Unauthorized` / `403 Forbidden`.
/// - `422 Unprocessable Entity`: field validation failed or a referenced row is missing.
#[post("/")]
pub async fn create_task(
    store: web::Data<dyn Store>,
    user: CurrentUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    require_admin_or_manager(&user)?;
    task_data.validate()?;

    let new_task = task_data.into_inner().into_new_task(user.id)?;
    ensure_references(store.get_ref(), Some(new_task.department), new_task.assigned_to).await?;

    let task = store.create_task(new_task).await?;
    log::info!("task {} created by {}", task.id, user.username);
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a specific task by its id.
///
/// ## Responses:
/// - `200 OK`: the `Task`.
/// - `404 Not Found`: no task with that id.
#[get("/{id}/")]
pub async fn get_task(
    store: web::Data<dyn Store>,
    _user: CurrentUser,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    match store.find_task(task_id.into_inner()).await? {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Replaces a task's editable fields. `title` and `department` are required;
/// omitted optional fields keep their current value.
#[put("/{id}/")]
pub async fn update_task(
    store: web::Data<dyn Store>,
    user: CurrentUser,
    task_id: web::Path<i32>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    require_admin_or_manager(&user)?;
    task_data.validate()?;
    apply_changes(
        store.get_ref(),
        &user,
        task_id.into_inner(),
        task_data.into_inner().into_changes()?,
    )
    .await
}

/// Partially updates a task. `"assigned_to": null` removes the assignee; `null`
/// on any other field is a 422.
#[patch("/{id}/")]
pub async fn patch_task(
    store: web::Data<dyn Store>,
    user: CurrentUser,
    task_id: web::Path<i32>,
    task_data: web::Json<TaskPatch>,
) -> Result<impl Responder, AppError> {
    require_admin_or_manager(&user)?;
    task_data.validate()?;
    apply_changes(
        store.get_ref(),
        &user,
        task_id.into_inner(),
        TaskChanges::try_from(task_data.into_inner())?,
    )
    .await
}

/// Deletes a task together with its comments and logs.
///
/// ## Responses:
/// - `204 No Content`: deleted.
/// - `403 Forbidden`: caller is neither Admin nor Manager.
/// - `404 Not Found`: no task with that id.
#[delete("/{id}/")]
pub async fn delete_task(
    store: web::Data<dyn Store>,
    user: CurrentUser,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    require_admin_or_manager(&user)?;
    let task_id = task_id.into_inner();

    if !store.delete_task(task_id).await? {
        return Err(AppError::NotFound("Task not found".into()));
    }

    log::info!("task {} deleted by {}", task_id, user.username);
    Ok(HttpResponse::NoContent().finish())
}

async fn apply_changes(
    store: &dyn Store,
    user: &CurrentUser,
    task_id: i32,
    changes: TaskChanges,
) -> Result<HttpResponse, AppError> {
    if store.find_task(task_id).await?.is_none() {
        return Err(AppError::NotFound("Task not found".into()));
    }

    let (department, assignee) = changes.references();
    ensure_references(store, department, assignee).await?;

    match store.update_task(task_id, changes).await? {
        Some(task) => {
            log::info!("task {} updated by {}", task.id, user.username);
            Ok(HttpResponse::Ok().json(task))
        }
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Rejects bodies pointing at a department or user that does not exist.
async fn ensure_references(
    store: &dyn Store,
    department: Option<i32>,
    assignee: Option<i32>,
) -> Result<(), AppError> {
    if let Some(id) = department {
        if store.find_department(id).await?.is_none() {
            return Err(AppError::invalid_field(
                "department",
                "does_not_exist",
                format!("Invalid pk \"{}\" - object does not exist.", id),
            ));
        }
    }
    if let Some(id) = assignee {
        if store.find_user_by_id(id).await?.is_none() {
            return Err(AppError::invalid_field(
                "assigned_to",
                "does_not_exist",
                format!("Invalid pk \"{}\" - object does not exist.", id),
            ));
        }
    }
    Ok(())
}
