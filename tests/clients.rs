mod common;

use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{bearer, init_app, seed_department, seed_user, send};
use taskdesk::models::Role;
use taskdesk::store::{MemoryStore, Store};

#[test_log::test(actix_rt::test)]
async fn test_client_crud_and_cascade() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "agent", "agent@example.com", "secret", vec![]).await;
    let app = init_app(store.clone()).await;

    let req = test::TestRequest::post()
        .uri("/api/clients/")
        .insert_header(bearer(&user))
        .set_json(json!({ "name": "Acme", "department": "Finance" }))
        .to_request();
    let (status, client) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", client);
    assert_eq!(client["name"], "Acme");
    assert_eq!(client["department"], "Finance");
    let client_id = client["id"].as_i64().unwrap() as i32;

    let req = test::TestRequest::patch()
        .uri(&format!("/api/clients/{}/", client_id))
        .insert_header(bearer(&user))
        .set_json(json!({ "department": "Legal" }))
        .to_request();
    let (status, patched) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["name"], "Acme");
    assert_eq!(patched["department"], "Legal");

    let req = test::TestRequest::put()
        .uri(&format!("/api/clients/{}/", client_id))
        .insert_header(bearer(&user))
        .set_json(json!({ "name": "Acme Corp", "department": "Legal" }))
        .to_request();
    let (status, replaced) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["name"], "Acme Corp");

    let req = test::TestRequest::post()
        .uri("/api/client-requests/")
        .insert_header(bearer(&user))
        .set_json(json!({ "client": client_id, "category": "HARDWARE", "description": "Laptop died" }))
        .to_request();
    let (status, request) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", request);
    assert_eq!(request["client"], json!(client_id));
    assert_eq!(request["category"], "HARDWARE");
    assert!(request["submitted_at"].is_string());
    let request_id = request["id"].as_i64().unwrap() as i32;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/clients/{}/", client_id))
        .insert_header(bearer(&user))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert!(store.find_client(client_id).await.unwrap().is_none());
    assert!(store.find_client_request(request_id).await.unwrap().is_none());

    let req = test::TestRequest::get()
        .uri(&format!("/api/clients/{}/", client_id))
        .insert_header(bearer(&user))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_client_request_validation() {
    let store = MemoryStore::new();
    let user = seed_user(&store, "agent", "agent@example.com", "secret", vec![]).await;
    let client = store.create_client("Acme", "Finance").await.unwrap();
    let app = init_app(store).await;

    let req = test::TestRequest::post()
        .uri("/api/client-requests/")
        .insert_header(bearer(&user))
        .set_json(json!({ "client": 404, "category": "NETWORK", "description": "VPN down" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"]["client"][0]["code"], "does_not_exist");

    let req = test::TestRequest::post()
        .uri("/api/client-requests/")
        .insert_header(bearer(&user))
        .set_json(json!({ "client": client.id, "category": "PRINTERS", "description": "Jam" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/client-requests/")
        .insert_header(bearer(&user))
        .set_json(json!({ "client": client.id, "category": "ACCOUNT", "description": "Reset" }))
        .to_request();
    let (_, created) = send(&app, req).await;
    let uri = format!("/api/client-requests/{}/", created["id"]);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(bearer(&user))
        .set_json(json!({ "client": 404 }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(bearer(&user))
        .set_json(json!({ "category": "OTHER" }))
        .to_request();
    let (status, patched) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["category"], "OTHER");
    assert_eq!(patched["description"], "Reset");
    assert_eq!(patched["submitted_at"], created["submitted_at"]);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&user))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let req = test::TestRequest::get()
        .uri("/api/client-requests/")
        .insert_header(bearer(&user))
        .to_request();
    let (_, list) = send(&app, req).await;
    assert_eq!(list, json!([]));
}

#[actix_rt::test]
async fn test_departments_require_manager_to_create() {
    let store = MemoryStore::new();
    let plain = seed_user(&store, "plain", "plain@example.com", "secret", vec![]).await;
    let manager = seed_user(&store, "mgr", "mgr@example.com", "secret", vec![Role::Manager]).await;
    let app = init_app(store).await;

    let req = test::TestRequest::post()
        .uri("/api/departments/")
        .insert_header(bearer(&plain))
        .set_json(json!({ "name": "IT" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/departments/")
        .insert_header(bearer(&manager))
        .set_json(json!({ "name": "IT" }))
        .to_request();
    let (status, dept) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dept["name"], "IT");

    let req = test::TestRequest::get()
        .uri("/api/departments/")
        .insert_header(bearer(&plain))
        .to_request();
    let (status, list) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([dept]));
}

#[actix_rt::test]
async fn test_users_admin_only_creation() {
    let store = MemoryStore::new();
    seed_department(&store, "Support").await;
    let admin = seed_user(&store, "root", "root@example.com", "secret", vec![Role::Admin]).await;
    let manager = seed_user(&store, "mgr", "mgr@example.com", "secret", vec![Role::Manager]).await;
    let app = init_app(store).await;

    let payload = json!({
        "username": "newbie",
        "email": "newbie@example.com",
        "password": "long-enough",
        "roles": ["Manager"],
    });

    let req = test::TestRequest::post()
        .uri("/api/users/")
        .insert_header(bearer(&manager))
        .set_json(&payload)
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/users/")
        .insert_header(bearer(&admin))
        .set_json(&payload)
        .to_request();
    let (status, created) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", created);
    assert_eq!(created["username"], "newbie");
    assert_eq!(created["roles"], json!(["Manager"]));
    assert!(created.get("password_hash").is_none());

    let req = test::TestRequest::post()
        .uri("/api/users/")
        .insert_header(bearer(&admin))
        .set_json(&payload)
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"]["username"][0]["code"], "unique");

    let req = test::TestRequest::post()
        .uri("/api/users/")
        .insert_header(bearer(&admin))
        .set_json(json!({ "username": "bad name!", "email": "nope", "password": "short" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["fields"]["username"].is_array());
    assert!(body["fields"]["email"].is_array());
    assert!(body["fields"]["password"].is_array());

    let req = test::TestRequest::post()
        .uri("/api/token/")
        .set_json(json!({ "username": "newbie@example.com", "password": "long-enough" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/users/")
        .insert_header(bearer(&manager))
        .to_request();
    let (_, users) = send(&app, req).await;
    assert_eq!(
        users[2],
        json!({ "id": created["id"], "username": "newbie", "email": "newbie@example.com" })
    );
}
