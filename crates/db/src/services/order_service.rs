//! The order aggregate service.
//!
//! Owns the transaction boundary for every order write and the checks
//! that span repositories: referenced customer, vehicle, employees and
//! services must exist, and the vehicle must belong to the customer.
//! Mutating operations take the caller's [`Identity`], already
//! authenticated and authorized by the HTTP layer, and record it in the log.

use autoshop_core::error::CoreError;
use autoshop_core::hashing::generate_order_hash;
use autoshop_core::identity::Identity;
use autoshop_core::pagination::PageWindow;
use autoshop_core::sorting::OrderSort;
use autoshop_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{log_sqlx_failure, DbError, DbResult};
use crate::models::order::{
    CreateOrder, OrderChanges, OrderDetail, OrderFilter, OrderPlan, OrderQuery, OrderRow,
    UpdateOrder,
};
use crate::models::Page;
use crate::repositories::{CustomerRepo, EmployeeRepo, OrderRepo, ServiceRepo, VehicleRepo};
use crate::settle;

/// Coordinates writes across the four order tables.
pub struct OrderService;

impl OrderService {
    /// Create an order and all of its parts in one transaction.
    ///
    /// Returns the new order id.
    pub async fn create_order(
        pool: &PgPool,
        caller: &Identity,
        input: CreateOrder,
    ) -> DbResult<DbId> {
        let order = input.resolve(caller)?;

        ensure_employee(pool, order.employee_id, "employee_id").await?;
        if let Some(assigned) = order.assigned_employee_id {
            ensure_employee(pool, assigned, "assigned_employee_id").await?;
        }
        if !CustomerRepo::exists(pool, order.customer_id).await? {
            return Err(CoreError::Validation(format!(
                "customer_id: customer {} does not exist",
                order.customer_id
            ))
            .into());
        }
        let vehicle = VehicleRepo::find_by_id(pool, order.vehicle_id)
            .await?
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "vehicle_id: vehicle {} does not exist",
                    order.vehicle_id
                ))
            })?;
        if vehicle.customer_id != order.customer_id {
            return Err(CoreError::Validation(format!(
                "vehicle_id: vehicle {} does not belong to customer {}",
                order.vehicle_id, order.customer_id
            ))
            .into());
        }
        ensure_services(pool, &order.service_ids()).await?;

        let now = chrono::Utc::now();
        let order_hash = generate_order_hash(now);

        let mut tx = pool.begin().await?;
        let result = OrderRepo::insert(&mut tx, &order, &order_hash, now).await;
        let order_id = settle(tx, result)
            .await
            .map_err(DbError::from)
            .inspect_err(|e| e.log_storage_failure("order.create", &order))?;

        tracing::info!(
            order_id,
            customer_id = order.customer_id,
            vehicle_id = order.vehicle_id,
            services = order.services.len(),
            created_by = caller.employee_id,
            "Order created",
        );
        Ok(order_id)
    }

    /// The order with its joined names and service lines, or `None`.
    pub async fn get_order(pool: &PgPool, id: DbId) -> Result<Option<OrderDetail>, sqlx::Error> {
        OrderRepo::find_detail(pool, id).await
    }

    /// A filtered, sorted page of orders and the filtered total.
    pub async fn list_orders(
        pool: &PgPool,
        query: &OrderQuery,
    ) -> Result<Page<OrderRow>, sqlx::Error> {
        OrderRepo::list(pool, query).await
    }

    /// Orders of one customer. [`CoreError::NotFound`] if the customer is absent.
    pub async fn orders_by_customer(
        pool: &PgPool,
        customer_id: DbId,
        sort: OrderSort,
        window: PageWindow,
    ) -> DbResult<Page<OrderRow>> {
        if !CustomerRepo::exists(pool, customer_id).await? {
            return Err(CoreError::NotFound {
                entity: "Customer",
                id: customer_id,
            }
            .into());
        }
        let query = OrderQuery {
            filter: OrderFilter {
                customer_id: Some(customer_id),
                ..Default::default()
            },
            sort,
            window,
        };
        Ok(OrderRepo::list(pool, &query).await?)
    }

    /// Apply a patch to every part of an order in one transaction.
    ///
    /// The order rows are locked for the duration. Fails with
    /// [`CoreError::NotFound`] if the order is absent and
    /// [`CoreError::NoOpUpdate`] if nothing would change.
    pub async fn modify_order(
        pool: &PgPool,
        caller: &Identity,
        id: DbId,
        input: UpdateOrder,
    ) -> DbResult<OrderDetail> {
        let changes = input.resolve()?;
        if let Some(Some(assigned)) = changes.assigned_employee_id {
            ensure_employee(pool, assigned, "assigned_employee_id").await?;
        }
        if let Some(lines) = &changes.services {
            let ids: Vec<DbId> = lines.iter().map(|l| l.service_id).collect();
            ensure_services(pool, &ids).await?;
        }

        let mut tx = pool.begin().await?;
        let result = Self::modify_in(&mut tx, id, &changes).await;
        let plan = settle(tx, result)
            .await
            .inspect_err(|e| e.log_storage_failure("order.modify", &(id, &changes)))?;

        tracing::info!(
            order_id = id,
            status = %plan.next.order_status,
            status_changed = plan.status_changed,
            services_added = plan.services_to_add.len(),
            services_removed = plan.services_to_remove.len(),
            updated_by = caller.employee_id,
            "Order updated",
        );

        Self::get_order(pool, id)
            .await?
            .ok_or_else(|| CoreError::NotFound { entity: "Order", id }.into())
    }

    /// Delete an order and all of its parts, children first, in one transaction.
    pub async fn remove_order(pool: &PgPool, caller: &Identity, id: DbId) -> DbResult<()> {
        let mut tx = pool.begin().await?;
        let result = OrderRepo::delete(&mut tx, id).await;
        let deleted = settle(tx, result)
            .await
            .inspect_err(|e| log_sqlx_failure(e, "order.remove", &id))?;
        if !deleted {
            return Err(CoreError::NotFound { entity: "Order", id }.into());
        }
        tracing::info!(order_id = id, deleted_by = caller.employee_id, "Order deleted");
        Ok(())
    }

    async fn modify_in(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        changes: &OrderChanges,
    ) -> DbResult<OrderPlan> {
        let state = OrderRepo::lock_state(tx, id)
            .await?
            .ok_or(CoreError::NotFound { entity: "Order", id })?;
        let lines = OrderRepo::lines(tx, id).await?;

        let now = chrono::Utc::now();
        let plan = changes.plan(&state, &lines, now)?;
        if plan.is_noop() {
            return Err(CoreError::NoOpUpdate.into());
        }
        OrderRepo::apply(tx, id, &plan, now).await?;
        Ok(plan)
    }
}

async fn ensure_employee(pool: &PgPool, id: DbId, field: &str) -> DbResult<()> {
    if EmployeeRepo::exists(pool, id).await? {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("{field}: employee {id} does not exist")).into())
    }
}

async fn ensure_services(pool: &PgPool, ids: &[DbId]) -> DbResult<()> {
    let missing = ServiceRepo::missing_ids(pool, ids).await?;
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "order_services: unknown service id(s) {missing:?}"
        ))
        .into())
    }
}
