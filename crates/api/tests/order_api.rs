//! Repair orders over HTTP.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, delete_auth, get, get_auth, post_json_auth, put_json_auth};
use sqlx::PgPool;

/// Everything an order needs: an admin, a customer with a vehicle, and one service.
struct Shop {
    token: String,
    admin_id: i64,
    customer_id: i64,
    vehicle_id: i64,
    service_id: i64,
}

async fn shop(pool: &PgPool) -> Shop {
    let (admin, token) = common::seed_admin(pool).await;
    let (customer_id, vehicle_id) =
        common::seed_customer_with_vehicle(pool, "jane@x.com", "ABC123").await;
    let service_id = common::seed_service(pool, "Oil change").await;
    Shop {
        token,
        admin_id: admin.employee_id,
        customer_id,
        vehicle_id,
        service_id,
    }
}

fn order_body(shop: &Shop) -> serde_json::Value {
    serde_json::json!({
        "customer_id": shop.customer_id.to_string(),
        "vehicle_id": shop.vehicle_id.to_string(),
        "order_description": "Oil change",
        "order_total_price": 49.99,
        "order_services": [{ "service_id": shop.service_id.to_string() }]
    })
}

async fn create_order(pool: &PgPool, shop: &Shop) -> i64 {
    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/orders",
        order_body(shop),
        &shop.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["order_id"].as_i64().unwrap()
}

async fn count_rows(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Create / read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_order_returns_full_detail(pool: PgPool) {
    let shop = shop(&pool).await;

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/orders",
        order_body(&shop),
        &shop.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let order = &json["data"];
    assert_eq!(order["employee_id"], shop.admin_id);
    assert_eq!(order["customer_id"], shop.customer_id);
    assert_eq!(order["vehicle_id"], shop.vehicle_id);
    assert_eq!(order["order_total_price"], 49.99);
    assert_eq!(order["order_status"], "received");
    assert_eq!(order["active_order"], true);
    assert_eq!(order["customer_first_name"], "Jane");
    assert_eq!(order["vehicle_make"], "Honda");
    assert_eq!(order["employee_first_name"], "Alex");
    assert_eq!(order["services"][0]["service_id"], shop.service_id);
    assert_eq!(order["services"][0]["service_name"], "Oil change");
    assert_eq!(order["completed_services"].as_array().unwrap().len(), 0);

    let order_id = order["order_id"].as_i64().unwrap();
    let response = get_auth(
        common::build_test_app(pool),
        &format!("/api/orders/{order_id}"),
        &shop.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["data"]["order_hash"], order["order_hash"]);
    assert_eq!(fetched["data"]["order_description"], "Oil change");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_service_writes_nothing(pool: PgPool) {
    let shop = shop(&pool).await;
    let mut body = order_body(&shop);
    body["order_services"] = serde_json::json!([{ "service_id": 9999 }]);

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/orders",
        body,
        &shop.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    for table in ["orders", "order_info", "order_status", "order_services"] {
        assert_eq!(count_rows(&pool, table).await, 0, "{table} should be empty");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_missing_vehicle_is_400(pool: PgPool) {
    let shop = shop(&pool).await;
    let mut body = order_body(&shop);
    body.as_object_mut().unwrap().remove("vehicle_id");

    let response = post_json_auth(
        common::build_test_app(pool),
        "/api/orders",
        body,
        &shop.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_price_beyond_column_range_is_400(pool: PgPool) {
    let shop = shop(&pool).await;
    let mut body = order_body(&shop);
    body["order_total_price"] = serde_json::json!(100000000);

    let response = post_json_auth(
        common::build_test_app(pool.clone()),
        "/api/orders",
        body,
        &shop.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert_eq!(count_rows(&pool, "orders").await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_orders_require_a_token(pool: PgPool) {
    let response = get(common::build_test_app(pool.clone()), "/api/orders").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = delete(common::build_test_app(pool), "/api/orders/1").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_orders_second_page(pool: PgPool) {
    let shop = shop(&pool).await;
    for _ in 0..12 {
        create_order(&pool, &shop).await;
    }

    let response = get_auth(
        common::build_test_app(pool),
        "/api/orders?limit=10&page=2",
        &shop.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
    assert_eq!(json["total"], 12);
    assert_eq!(json["page"], 2);
    assert_eq!(json["limit"], 10);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_orders_filters_and_sorts(pool: PgPool) {
    let shop = shop(&pool).await;
    let first = create_order(&pool, &shop).await;
    let second = create_order(&pool, &shop).await;

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/orders/{first}"),
        serde_json::json!({ "order_status": "completed" }),
        &shop.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/orders?active_order=true",
        &shop.token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["data"][0]["order_id"], second);

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/orders?status=Completed",
        &shop.token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["data"][0]["order_id"], first);

    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/orders?sortby=order_id%20ASC",
        &shop.token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["order_id"], first);
    assert_eq!(json["data"][1]["order_id"], second);

    let response = get_auth(
        common::build_test_app(pool),
        "/api/orders?sortby=drop%20table",
        &shop.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_active_order_filters_by_activity(pool: PgPool) {
    let shop = shop(&pool).await;
    create_order(&pool, &shop).await;

    // `completed` is not a list filter.
    let response = get_auth(
        common::build_test_app(pool.clone()),
        "/api/orders?completed=1",
        &shop.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["total"], 1);

    let response = get_auth(
        common::build_test_app(pool),
        "/api/orders?active_order=0",
        &shop.token,
    )
    .await;
    assert_eq!(body_json(response).await["total"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_customer_orders_are_public(pool: PgPool) {
    let shop = shop(&pool).await;
    create_order(&pool, &shop).await;

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/orders/customer/{}", shop.customer_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["data"][0]["customer_id"], shop.customer_id);

    let response = get(common::build_test_app(pool), "/api/orders/customer/9999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_complete_order(pool: PgPool) {
    let shop = shop(&pool).await;
    let order_id = create_order(&pool, &shop).await;
    let uri = format!("/api/orders/{order_id}");

    let body = serde_json::json!({
        "order_status": "Completed",
        "order_services": [{ "service_id": shop.service_id, "service_completed": true }]
    });
    let response = put_json_auth(common::build_test_app(pool.clone()), &uri, body, &shop.token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["order_status"], "completed");
    assert_eq!(json["data"]["active_order"], false);
    assert!(json["data"]["completion_date"].is_string());
    assert_eq!(json["data"]["services"].as_array().unwrap().len(), 0);
    assert_eq!(json["data"]["completed_services"][0]["service_id"], shop.service_id);

    // No way back once completed.
    let body = serde_json::json!({ "order_status": "received" });
    let response = put_json_auth(common::build_test_app(pool), &uri, body, &shop.token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_update_is_no_op(pool: PgPool) {
    let shop = shop(&pool).await;
    let order_id = create_order(&pool, &shop).await;

    let response = put_json_auth(
        common::build_test_app(pool),
        &format!("/api/orders/{order_id}"),
        serde_json::json!({}),
        &shop.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "NO_OP_UPDATE");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_order(pool: PgPool) {
    let shop = shop(&pool).await;
    let order_id = create_order(&pool, &shop).await;
    let uri = format!("/api/orders/{order_id}");

    let response = delete_auth(common::build_test_app(pool.clone()), &uri, &shop.token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(common::build_test_app(pool.clone()), &uri, &shop.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete_auth(common::build_test_app(pool.clone()), &uri, &shop.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    for table in ["orders", "order_info", "order_status", "order_services"] {
        assert_eq!(count_rows(&pool, table).await, 0, "{table} should be empty");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_customer_with_orders_cannot_be_deleted(pool: PgPool) {
    let shop = shop(&pool).await;
    create_order(&pool, &shop).await;
    create_order(&pool, &shop).await;

    let response = delete(
        common::build_test_app(pool.clone()),
        &format!("/api/customers/{}", shop.customer_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["count"], 2);

    let response = delete(
        common::build_test_app(pool),
        &format!("/api/vehicles/{}", shop.vehicle_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
