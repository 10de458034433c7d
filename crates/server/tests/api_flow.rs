use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use registry::repository::mock::MemoryStore;
use serde_json::{json, Value};
use tower::ServiceExt;

use server::{routes, state::ServerState};

fn app() -> Router {
    let state = ServerState::new(Arc::new(MemoryStore::new()));
    routes::build_router(state, tower_http::cors::CorsLayer::very_permissive())
}

async fn send_raw(app: &Router, method: &str, uri: &str, body: Option<String>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder.header("content-type", "application/json").body(Body::from(b)).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    send_raw(app, method, uri, body.map(|b| b.to_string())).await
}

async fn create_client(app: &Router, name: &str, email: &str) -> i64 {
    let (status, body) = send(app, "POST", "/client", Some(json!({"name": name, "email": email}))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["client"]["id"].as_i64().unwrap()
}

async fn create_service(app: &Router, name: &str, price: &str) -> i64 {
    let (status, body) = send(app, "POST", "/service", Some(json!({"name": name, "price": price}))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["service"]["id"].as_i64().unwrap()
}

async fn attach(app: &Router, client_id: i64, service_id: i64) -> (StatusCode, Value) {
    send(app, "POST", "/client/addService", Some(json!({"client_id": client_id, "service_id": service_id}))).await
}

#[tokio::test]
async fn health_is_public() {
    let (status, body) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn create_client_then_duplicate_email_is_rejected() {
    let app = app();
    let payload = json!({"name": "John Doe", "email": "john.doe@examp.com"});

    let (status, body) = send(&app, "POST", "/client", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Client created successfully");
    assert!(body["client"]["id"].is_i64());
    assert_eq!(body["client"]["services"], json!([]));

    let (status, body) = send(&app, "POST", "/client", Some(payload)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["email"][0], "The email has already been taken.");
    assert_eq!(body["message"], "The email has already been taken.");
}

#[tokio::test]
async fn list_is_bare_and_get_expands_services() {
    let app = app();
    let c = create_client(&app, "Ana", "ana@example.com").await;
    let s = create_service(&app, "Hosting", "10.50").await;
    attach(&app, c, s).await;

    let (status, body) = send(&app, "GET", "/client", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert!(body[0].get("services").is_none());

    let (status, body) = send(&app, "GET", &format!("/client/{c}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ana@example.com");
    assert_eq!(body["services"][0]["name"], "Hosting");
    assert_eq!(body["services"][0]["price"], "10.50");

    let (status, body) = send(&app, "GET", &format!("/service/{s}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clients"][0]["id"], c);
}

#[tokio::test]
async fn missing_and_malformed_ids() {
    let app = app();
    let (status, body) = send(&app, "GET", "/client/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "client not found");
    assert!(body.get("errors").is_none());

    let (status, _) = send(&app, "GET", "/service/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn validation_reports_every_field() {
    let app = app();
    let (status, body) = send(&app, "POST", "/client", Some(json!({"email": "not-an-email"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["name"][0], "The name field is required.");
    assert_eq!(body["errors"]["email"][0], "The email field must be a valid email address.");

    let (status, body) = send(&app, "POST", "/service", Some(json!({"name": "Hosting", "price": "10.5"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["price"][0], "The price field must have 2 decimal places.");
}

#[tokio::test]
async fn malformed_body_is_unprocessable() {
    let app = app();
    let (status, body) = send_raw(&app, "POST", "/client", Some("{\"name\":".into())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"].is_string());
    assert!(body.get("errors").is_none());
}

#[tokio::test]
async fn mistyped_fields_are_reported_per_field() {
    let app = app();
    let (status, body) = send(&app, "POST", "/client", Some(json!({"name": 42, "email": 7}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["name"][0], "The name field must be a string.");
    assert_eq!(body["errors"]["email"][0], "The email field must be a string.");

    let c = create_client(&app, "Ana", "ana@example.com").await;
    let (status, body) = send(&app, "PATCH", &format!("/client/{c}"), Some(json!({"phone": ["555"]}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["phone"][0], "The phone field must be a string.");

    let (status, body) = send(&app, "POST", "/client/addService", Some(json!({"client_id": "x", "service_id": 1.5}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["client_id"][0], "The client id field must be an integer.");
    assert_eq!(body["errors"]["service_id"][0], "The service id field must be an integer.");
}

#[tokio::test]
async fn add_service_accepts_numeric_string_ids() {
    let app = app();
    let c = create_client(&app, "Ana", "ana@example.com").await;
    let s = create_service(&app, "Hosting", "10.00").await;

    let pair = json!({"client_id": c.to_string(), "service_id": s.to_string()});
    let (status, body) = send(&app, "POST", "/client/addService", Some(pair)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Service added successfully");
    assert_eq!(body["client"]["services"][0]["id"], s);
}

#[tokio::test]
async fn put_and_patch_are_partial_updates() {
    let app = app();
    let c = create_client(&app, "Ana", "ana@example.com").await;

    let (status, body) = send(&app, "PUT", &format!("/client/{c}"), Some(json!({"phone": "555-0100"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Client updated successfully");
    assert_eq!(body["client"]["name"], "Ana");
    assert_eq!(body["client"]["phone"], "555-0100");

    let (status, body) = send(&app, "PATCH", &format!("/client/{c}"), Some(json!({"name": "Ana B", "email": "ana@example.com"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["client"]["name"], "Ana B");
    assert_eq!(body["client"]["phone"], "555-0100");

    let s = create_service(&app, "Hosting", "10.00").await;
    let (status, body) = send(&app, "PATCH", &format!("/service/{s}"), Some(json!({"price": "12.25"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"]["price"], "12.25");

    let (status, _) = send(&app, "PUT", "/client/99", Some(json!({"name": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn client_delete_guard_and_force() {
    let app = app();
    let c = create_client(&app, "Ana", "ana@example.com").await;
    let s = create_service(&app, "Hosting", "10.00").await;
    assert_eq!(attach(&app, c, s).await.0, StatusCode::OK);

    let (status, body) = send(&app, "DELETE", &format!("/client/{c}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "client has registered services");

    let (status, body) = send(&app, "DELETE", &format!("/client/{c}?force=true"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Client deleted successfully");

    assert_eq!(send(&app, "GET", &format!("/client/{c}"), None).await.0, StatusCode::NOT_FOUND);
    let (_, body) = send(&app, "GET", &format!("/service/{s}"), None).await;
    assert_eq!(body["clients"], json!([]));
}

#[tokio::test]
async fn service_delete_accepts_path_flag() {
    let app = app();
    let c = create_client(&app, "Ana", "ana@example.com").await;
    let s = create_service(&app, "Hosting", "10.00").await;
    attach(&app, c, s).await;

    let (status, body) = send(&app, "DELETE", &format!("/service/{s}/false"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "some clients have this service registered");

    let (status, _) = send(&app, "DELETE", &format!("/service/{s}/true"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, "GET", &format!("/client/{c}"), None).await;
    assert_eq!(body["services"], json!([]));
}

#[tokio::test]
async fn attach_twice_conflicts() {
    let app = app();
    let c = create_client(&app, "Ana", "ana@example.com").await;
    let s = create_service(&app, "Hosting", "10.00").await;

    let (status, body) = attach(&app, c, s).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["client"]["services"].as_array().unwrap().len(), 1);

    let (status, body) = attach(&app, c, s).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "client already has this service registered");
}

#[tokio::test]
async fn attach_validates_and_checks_existence() {
    let app = app();
    let c = create_client(&app, "Ana", "ana@example.com").await;

    let (status, body) = send(&app, "POST", "/client/addService", Some(json!({"client_id": c}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["service_id"][0], "The service id field is required.");

    let (status, body) = attach(&app, c, 77).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "service not found");
}

#[tokio::test]
async fn remove_service_requires_attachment() {
    let app = app();
    let c = create_client(&app, "Ana", "ana@example.com").await;
    let s = create_service(&app, "Hosting", "10.00").await;
    let pair = json!({"client_id": c, "service_id": s});

    let (status, _) = send(&app, "POST", "/client/removeService", Some(pair.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    attach(&app, c, s).await;
    let (status, body) = send(&app, "POST", "/client/removeService", Some(pair)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["client"]["services"], json!([]));
}

#[tokio::test]
async fn remove_all_endpoints_clear_relations() {
    let app = app();
    let c = create_client(&app, "Ana", "ana@example.com").await;
    let d = create_client(&app, "Bo", "bo@example.com").await;
    let s1 = create_service(&app, "Hosting", "10.00").await;
    let s2 = create_service(&app, "Backups", "5.00").await;
    for (client, service) in [(c, s1), (c, s2), (d, s1)] {
        assert_eq!(attach(&app, client, service).await.0, StatusCode::OK);
    }

    let (status, body) = send(&app, "POST", &format!("/client/removeAllService/{c}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["client"]["services"], json!([]));
    let (_, body) = send(&app, "GET", &format!("/client/{c}"), None).await;
    assert_eq!(body["services"], json!([]));

    let (status, body) = send(&app, "POST", &format!("/service/removeAllClient/{s1}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"]["clients"], json!([]));

    let (status, _) = send(&app, "POST", "/service/removeAllClient/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
