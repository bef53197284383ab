pub mod auth;
pub mod client_requests;
pub mod clients;
pub mod comments;
pub mod departments;
pub mod health;
pub mod logs;
pub mod root;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Registers every route plus the extractor configs on an app.
///
/// The caller provides `web::Data<dyn Store>` and `web::Data<TokenIssuer>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        // Non-numeric ids never match a resource.
        web::PathConfig::default()
            .error_handler(|_err, _req| AppError::NotFound("Not found".into()).into()),
    )
    .service(health::health)
    .service(web::scope("/api").wrap(AuthMiddleware).configure(api));
}

/// Routes mounted under `/api`.
pub fn api(cfg: &mut web::ServiceConfig) {
    cfg.service(root::api_root)
        .service(
            web::scope("/token")
                .service(auth::obtain_token_pair)
                .service(auth::refresh_token),
        )
        .service(
            web::scope("/tasks")
                .service(tasks::list_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::patch_task)
                .service(tasks::delete_task)
                .service(comments::list_comments)
                .service(comments::create_comment)
                .service(logs::list_logs)
                .service(logs::create_log),
        )
        .service(
            web::scope("/clients")
                .service(clients::list_clients)
                .service(clients::create_client)
                .service(clients::get_client)
                .service(clients::update_client)
                .service(clients::patch_client)
                .service(clients::delete_client),
        )
        .service(
            web::scope("/client-requests")
                .service(client_requests::list_client_requests)
                .service(client_requests::create_client_request)
                .service(client_requests::get_client_request)
                .service(client_requests::update_client_request)
                .service(client_requests::patch_client_request)
                .service(client_requests::delete_client_request),
        )
        .service(
            web::scope("/departments")
                .service(departments::list_departments)
                .service(departments::create_department),
        )
        .service(
            web::scope("/users")
                .service(users::list_users)
                .service(users::create_user),
        );
}
