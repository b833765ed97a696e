//! Customers and vehicles over HTTP.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json, put_json};
use sqlx::PgPool;

fn jane() -> serde_json::Value {
    serde_json::json!({
        "customer_first_name": "Jane",
        "customer_last_name": "Doe",
        "customer_email": "jane@x.com",
        "customer_phone_number": "5551234567",
        "active_customer_status": 1
    })
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_get_customer(pool: PgPool) {
    let response = post_json(common::build_test_app(pool.clone()), "/api/customers", jane()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = body_json(response).await;
    let id = created["data"]["customer_id"].as_i64().unwrap();
    assert_eq!(created["data"]["active_customer_status"], true);
    assert_eq!(created["data"]["customer_hash"].as_str().unwrap().len(), 32);

    let response = get(common::build_test_app(pool), &format!("/api/customers/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["customer_email"], "jane@x.com");
    assert_eq!(json["data"]["customer_first_name"], "Jane");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_email_is_400(pool: PgPool) {
    post_json(common::build_test_app(pool.clone()), "/api/customers", jane()).await;

    let response = post_json(common::build_test_app(pool), "/api/customers", jane()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "DUPLICATE_KEY");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_customer_is_400(pool: PgPool) {
    let mut body = jane();
    body["customer_email"] = "not-an-email".into();
    let response = post_json(common::build_test_app(pool.clone()), "/api/customers", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let missing = serde_json::json!({ "customer_email": "a@x.com" });
    let response = post_json(common::build_test_app(pool), "/api/customers", missing).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_customer_is_404(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/customers/9999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_customers_is_paged(pool: PgPool) {
    for i in 0..12 {
        let mut body = jane();
        body["customer_email"] = format!("c{i}@x.com").into();
        post_json(common::build_test_app(pool.clone()), "/api/customers", body).await;
    }

    let response = get(
        common::build_test_app(pool.clone()),
        "/api/customers?page=2&limit=5",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 5);
    assert_eq!(json["total"], 12);
    assert_eq!(json["page"], 2);
    assert_eq!(json["limit"], 5);

    let response = get(common::build_test_app(pool), "/api/customers?search=c11%40").await;
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_customer(pool: PgPool) {
    let (customer_id, _) = common::seed_customer_with_vehicle(&pool, "jane@x.com", "ABC123").await;
    let uri = format!("/api/customers/{customer_id}");

    let body = serde_json::json!({ "customer_last_name": "Smith", "active_customer_status": "0" });
    let response = put_json(common::build_test_app(pool.clone()), &uri, body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["customer_last_name"], "Smith");
    assert_eq!(json["data"]["active_customer_status"], false);

    let response = put_json(common::build_test_app(pool), &uri, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "NO_OP_UPDATE");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_customer_removes_vehicles(pool: PgPool) {
    let (customer_id, vehicle_id) =
        common::seed_customer_with_vehicle(&pool, "jane@x.com", "ABC123").await;

    let response = delete(
        common::build_test_app(pool.clone()),
        &format!("/api/customers/{customer_id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(
        common::build_test_app(pool),
        &format!("/api/vehicles/{vehicle_id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Vehicles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_customer_vehicles(pool: PgPool) {
    let (customer_id, vehicle_id) =
        common::seed_customer_with_vehicle(&pool, "jane@x.com", "ABC123").await;

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/customers/{customer_id}/vehicles"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["vehicle_id"], vehicle_id);

    let response = get(common::build_test_app(pool), "/api/customers/9999/vehicles").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_vehicle_for_missing_customer_is_404(pool: PgPool) {
    let body = serde_json::json!({
        "vehicle_year": 2020,
        "vehicle_make": "Honda",
        "vehicle_model": "Civic",
        "vehicle_type": "Sedan",
        "vehicle_serial": "SN1"
    });
    let response = post_json(
        common::build_test_app(pool),
        "/api/customers/9999/vehicles",
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_vehicle_is_400_and_not_inserted(pool: PgPool) {
    let (customer_id, _) = common::seed_customer_with_vehicle(&pool, "jane@x.com", "ABC123").await;

    let body = serde_json::json!({
        "vehicle_year": 2018,
        "vehicle_make": "Ford",
        "vehicle_model": "Focus",
        "vehicle_type": "Hatchback",
        "vehicle_tag": "ABC123",
        "vehicle_serial": "SN-OTHER"
    });
    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/customers/{customer_id}/vehicles"),
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "DUPLICATE_KEY");

    let response = get(
        common::build_test_app(pool),
        &format!("/api/customers/{customer_id}/vehicles"),
    )
    .await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_vehicle_year_out_of_range_is_400(pool: PgPool) {
    let (customer_id, _) = common::seed_customer_with_vehicle(&pool, "jane@x.com", "ABC123").await;

    let body = serde_json::json!({
        "vehicle_year": 1800,
        "vehicle_make": "Benz",
        "vehicle_model": "Wagen",
        "vehicle_type": "Carriage",
        "vehicle_serial": "SN-OLD"
    });
    let response = post_json(
        common::build_test_app(pool),
        &format!("/api/customers/{customer_id}/vehicles"),
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_and_delete_vehicle(pool: PgPool) {
    let (_, vehicle_id) = common::seed_customer_with_vehicle(&pool, "jane@x.com", "ABC123").await;
    let uri = format!("/api/vehicles/{vehicle_id}");

    let body = serde_json::json!({ "vehicle_mileage": 51000, "vehicle_color": "Red" });
    let response = put_json(common::build_test_app(pool.clone()), &uri, body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["vehicle_mileage"], 51000);
    assert_eq!(json["data"]["vehicle_color"], "Red");

    let response = delete(common::build_test_app(pool.clone()), &uri).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete(common::build_test_app(pool), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
