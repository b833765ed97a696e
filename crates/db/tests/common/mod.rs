//! Fixtures shared by the repository integration tests.

#![allow(dead_code)]

use autoshop_core::identity::Identity;
use autoshop_core::input::LooseId;
use autoshop_db::models::customer::{CreateCustomer, Customer};
use autoshop_db::models::employee::{CreateEmployee, Employee};
use autoshop_db::models::order::{CreateOrder, OrderServiceInput};
use autoshop_db::models::service::{CreateService, Service};
use autoshop_db::models::vehicle::{CreateVehicle, Vehicle};
use autoshop_db::repositories::{CustomerRepo, EmployeeRepo, ServiceRepo, VehicleRepo};
use sqlx::PgPool;

/// Stand-in for an argon2 PHC string; these tests never verify passwords.
pub const FAKE_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA";

pub fn new_customer(email: &str) -> CreateCustomer {
    CreateCustomer {
        customer_email: email.to_string(),
        customer_phone_number: "5551234567".to_string(),
        customer_first_name: "Jane".to_string(),
        customer_last_name: "Doe".to_string(),
        active_customer_status: true,
    }
}

pub fn new_vehicle(tag: &str, serial: &str) -> CreateVehicle {
    CreateVehicle {
        vehicle_year: 2020,
        vehicle_make: "Honda".to_string(),
        vehicle_model: "Civic".to_string(),
        vehicle_type: "Sedan".to_string(),
        vehicle_mileage: Some(42_000),
        vehicle_tag: Some(tag.to_string()),
        vehicle_serial: serial.to_string(),
        vehicle_color: Some("Blue".to_string()),
    }
}

pub fn new_employee(email: &str, role: &str) -> CreateEmployee {
    CreateEmployee {
        employee_email: email.to_string(),
        employee_password: "correct-horse".to_string(),
        employee_first_name: "Sam".to_string(),
        employee_last_name: "Lee".to_string(),
        employee_phone: "555-010-2000".to_string(),
        company_role_name: role.to_string(),
        active_employee: true,
    }
}

pub fn new_service(name: &str) -> CreateService {
    CreateService {
        service_name: name.to_string(),
        service_description: format!("{name} service"),
    }
}

pub async fn seed_customer(pool: &PgPool, email: &str) -> Customer {
    CustomerRepo::create(pool, &new_customer(email)).await.unwrap()
}

pub async fn seed_vehicle(pool: &PgPool, customer_id: i64, tag: &str, serial: &str) -> Vehicle {
    VehicleRepo::create(pool, customer_id, &new_vehicle(tag, serial))
        .await
        .unwrap()
}

pub async fn seed_employee(pool: &PgPool, email: &str, role: &str) -> Employee {
    EmployeeRepo::create(pool, &new_employee(email, role), FAKE_HASH)
        .await
        .unwrap()
}

pub async fn seed_service(pool: &PgPool, name: &str) -> Service {
    ServiceRepo::create(pool, &new_service(name)).await.unwrap()
}

pub fn identity_of(employee: &Employee) -> Identity {
    Identity::new(
        employee.employee_id,
        employee.employee_email.clone(),
        employee.company_role_name.clone(),
    )
}

/// Everything an order needs: an admin, a customer with one vehicle, and a service.
pub struct OrderFixture {
    pub admin: Identity,
    pub customer: Customer,
    pub vehicle: Vehicle,
    pub service: Service,
}

pub async fn order_fixture(pool: &PgPool) -> OrderFixture {
    let admin = seed_employee(pool, "admin@shop.test", "Admin").await;
    let customer = seed_customer(pool, "jane@x.com").await;
    let vehicle = seed_vehicle(pool, customer.customer_id, "ABC123", "SN1").await;
    let service = seed_service(pool, "Oil change").await;
    OrderFixture {
        admin: identity_of(&admin),
        customer,
        vehicle,
        service,
    }
}

pub fn order_for(fixture: &OrderFixture, service_ids: &[i64]) -> CreateOrder {
    CreateOrder {
        customer_id: Some(LooseId::Int(fixture.customer.customer_id)),
        vehicle_id: Some(LooseId::Int(fixture.vehicle.vehicle_id)),
        order_description: Some("Oil change".to_string()),
        order_services: service_ids
            .iter()
            .map(|&id| OrderServiceInput {
                service_id: Some(LooseId::Int(id)),
                service_completed: false,
            })
            .collect(),
        ..Default::default()
    }
}

pub async fn count(pool: &PgPool, table: &str) -> i64 {
    let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap();
    row.0
}
