use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::store::Store;

/// Liveness probe, outside `/api` and its authentication.
///
/// Answers 503 when the store cannot be reached.
#[get("/health")]
pub async fn health(store: web::Data<dyn Store>) -> impl Responder {
    match store.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "store": "ok",
            "timestamp": Utc::now()
        })),
        Err(err) => {
            log::error!("health check failed: {}", err);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "degraded",
                "store": "unreachable",
                "timestamp": Utc::now()
            }))
        }
    }
}
