use actix_web::{get, HttpRequest, HttpResponse, Responder};
use serde_json::json;

/// Endpoint discovery document with absolute URLs.
#[get("/")]
pub async fn api_root(req: HttpRequest) -> impl Responder {
    let info = req.connection_info();
    let base = format!("{}://{}", info.scheme(), info.host());

    HttpResponse::Ok().json(json!({
        "message": "Task Management API",
        "version": "1.0",
        "endpoints": {
            "tasks": format!("{}/api/tasks/", base),
            "token": format!("{}/api/token/", base),
            "token_refresh": format!("{}/api/token/refresh/", base),
        }
    }))
}
