use crate::{
    auth::CurrentUser,
    error::AppError,
    models::CommentInput,
    store::Store,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use validator::Validate;

/// Lists the comments of a task. A missing task is a 404, not an empty list.
#[get("/{task_id}/comments/")]
pub async fn list_comments(
    store: web::Data<dyn Store>,
    _user: CurrentUser,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    if store.find_task(task_id).await?.is_none() {
        return Err(AppError::NotFound("Task not found".into()));
    }
    let comments = store.list_comments(task_id).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// Adds a comment to a task, authored by the caller.
#[post("/{task_id}/comments/")]
pub async fn create_comment(
    store: web::Data<dyn Store>,
    user: CurrentUser,
    task_id: web::Path<i32>,
    comment_data: web::Json<CommentInput>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    if store.find_task(task_id).await?.is_none() {
        return Err(AppError::NotFound("Task not found".into()));
    }
    comment_data.validate()?;

    let comment = store
        .create_comment(task_id, user.id, &comment_data.comment)
        .await?;
    log::info!("comment {} added to task {} by {}", comment.id, task_id, user.username);
    Ok(HttpResponse::Created().json(comment))
}
