#![allow(dead_code)]

use std::sync::Arc;

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::StatusCode,
    test, web, App,
};
use chrono::Duration;
use serde_json::Value;

use taskdesk::auth::{hash_password_with_cost, TokenIssuer};
use taskdesk::models::{Department, NewUser, Role, User};
use taskdesk::routes;
use taskdesk::store::{MemoryStore, Store};

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn issuer() -> TokenIssuer {
    TokenIssuer::new(TEST_SECRET, Duration::minutes(5), Duration::hours(24))
}

/// Builds the full application over `store`, exactly as `main` wires it.
pub async fn init_app(
    store: MemoryStore,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    let shared: Arc<dyn Store> = Arc::new(store);
    test::init_service(
        App::new()
            .app_data(web::Data::from(shared))
            .app_data(web::Data::new(issuer()))
            .configure(routes::configure),
    )
    .await
}

/// Inserts an account directly into the store. Hashes at the lowest bcrypt cost.
pub async fn seed_user(
    store: &MemoryStore,
    username: &str,
    email: &str,
    password: &str,
    roles: Vec<Role>,
) -> User {
    store
        .create_user(NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: hash_password_with_cost(password, 4).unwrap(),
            is_staff: false,
            is_superuser: false,
            roles,
        })
        .await
        .unwrap()
}

pub async fn seed_department(store: &MemoryStore, name: &str) -> Department {
    store.create_department(name).await.unwrap()
}

/// `Authorization` header carrying a fresh access token for `user`.
pub fn bearer(user: &User) -> (&'static str, String) {
    let access = issuer().issue_pair(user.id).unwrap().access;
    ("Authorization", format!("Bearer {}", access))
}

/// Sends `req` and returns the status and JSON body (`Value::Null` when empty).
///
/// Errors raised by middleware surface as `Err` from the service; they are
/// rendered into a response here so callers can assert on them uniformly.
pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    match test::try_call_service(app, req).await {
        Ok(resp) => {
            let status = resp.status();
            let bytes = test::read_body(resp).await;
            (status, parse_body(&bytes))
        }
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            let bytes = actix_web::body::to_bytes(resp.into_body())
                .await
                .unwrap_or_default();
            (status, parse_body(&bytes))
        }
    }
}

fn parse_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        })
    }
}
