//! Shared helpers for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use autoshop_api::auth::jwt::{generate_token, JwtConfig};
use autoshop_api::auth::password::hash_password;
use autoshop_api::config::ServerConfig;
use autoshop_api::router::build_app_router;
use autoshop_api::state::AppState;
use autoshop_db::models::employee::{CreateEmployee, Employee};
use autoshop_db::repositories::EmployeeRepo;
use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "shop-password-1";

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        db_max_connections: 5,
        db_acquire_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            expiry_hours: 8,
        },
    }
}

/// The production router and middleware stack over the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, None, Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None, None).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Read the response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert an employee with [`TEST_PASSWORD`] and return it with a valid token.
pub async fn seed_employee(pool: &PgPool, email: &str, role: &str) -> (Employee, String) {
    let input = CreateEmployee {
        employee_email: email.to_string(),
        employee_password: TEST_PASSWORD.to_string(),
        employee_first_name: "Alex".to_string(),
        employee_last_name: "Rivera".to_string(),
        employee_phone: "555-010-3000".to_string(),
        company_role_name: role.to_string(),
        active_employee: true,
    };
    let hash = hash_password(TEST_PASSWORD).unwrap();
    let employee = EmployeeRepo::create(pool, &input, &hash).await.unwrap();
    let token = generate_token(
        employee.employee_id,
        &employee.employee_email,
        &employee.company_role_name,
        &test_config().jwt,
    )
    .unwrap();
    (employee, token)
}

pub async fn seed_admin(pool: &PgPool) -> (Employee, String) {
    seed_employee(pool, "admin@shop.test", "Admin").await
}

/// Create a customer with one vehicle over HTTP. Returns `(customer_id, vehicle_id)`.
pub async fn seed_customer_with_vehicle(pool: &PgPool, email: &str, tag: &str) -> (i64, i64) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/customers",
        serde_json::json!({
            "customer_first_name": "Jane",
            "customer_last_name": "Doe",
            "customer_email": email,
            "customer_phone_number": "5551234567",
            "active_customer_status": 1
        }),
    )
    .await;
    assert_eq!(response.status(), 201);
    let customer_id = body_json(response).await["data"]["customer_id"].as_i64().unwrap();

    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/customers/{customer_id}/vehicles"),
        serde_json::json!({
            "vehicle_year": 2020,
            "vehicle_make": "Honda",
            "vehicle_model": "Civic",
            "vehicle_type": "Sedan",
            "vehicle_tag": tag,
            "vehicle_serial": format!("SN-{tag}")
        }),
    )
    .await;
    assert_eq!(response.status(), 201);
    let vehicle_id = body_json(response).await["data"]["vehicle_id"].as_i64().unwrap();

    (customer_id, vehicle_id)
}

/// Create a catalog service over HTTP and return its id.
pub async fn seed_service(pool: &PgPool, name: &str) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/services",
        serde_json::json!({
            "service_name": name,
            "service_description": format!("{name} service")
        }),
    )
    .await;
    assert_eq!(response.status(), 201);
    body_json(response).await["data"]["service_id"].as_i64().unwrap()
}
