//! Repository for the order aggregate (`orders`, `order_info`,
//! `order_status`, `order_services`).
//!
//! Writes take an open transaction; [`crate::services::OrderService`] owns
//! the transaction boundary and the business checks around it.

use autoshop_core::types::{DbId, Timestamp};
use sqlx::{PgPool, Postgres, Transaction};

use crate::begin_snapshot;
use crate::models::order::{
    NewOrder, OrderDetail, OrderFilter, OrderPlan, OrderQuery, OrderRow, OrderServiceLine,
    OrderState, ServiceLine,
};
use crate::models::Page;

const SELECT_COLUMNS: &str = "SELECT o.order_id, o.employee_id, o.customer_id, o.vehicle_id, \
     o.assigned_employee_id, o.order_date, o.last_updated, o.active_order, o.order_hash, \
     oi.order_description, oi.estimated_completion_date, oi.completion_date, \
     oi.order_total_price, oi.additional_request, oi.notes_for_internal_use, \
     oi.notes_for_customer, oi.additional_requests_completed, \
     os.order_status, \
     cf.customer_first_name, cf.customer_last_name, ci.customer_email, \
     ci.customer_phone_number, cf.active_customer_status, \
     v.vehicle_year, v.vehicle_make, v.vehicle_model, v.vehicle_type, v.vehicle_mileage, \
     v.vehicle_tag, v.vehicle_serial, v.vehicle_color, \
     e.employee_first_name, e.employee_last_name, \
     ae.employee_first_name AS assigned_employee_first_name, \
     ae.employee_last_name AS assigned_employee_last_name";

/// Aliases here are the ones `OrderSortField::as_sql` refers to.
const FROM: &str = "FROM orders o \
     JOIN order_info oi ON oi.order_id = o.order_id \
     JOIN order_status os ON os.order_id = o.order_id \
     JOIN customer_identifier ci ON ci.customer_id = o.customer_id \
     JOIN customer_info cf ON cf.customer_id = o.customer_id \
     JOIN customer_vehicle_info v ON v.vehicle_id = o.vehicle_id \
     JOIN employee_info e ON e.employee_id = o.employee_id \
     LEFT JOIN employee_info ae ON ae.employee_id = o.assigned_employee_id";

/// `$1` active flag, `$2` status, `$3` customer id; NULL means "any".
const FILTER: &str = "($1::boolean IS NULL OR o.active_order = $1) \
     AND ($2::text IS NULL OR os.order_status = $2) \
     AND ($3::bigint IS NULL OR o.customer_id = $3)";

const LINE_COLUMNS: &str = "ors.order_service_id, ors.order_id, ors.service_id, \
     ors.service_completed, cs.service_name, cs.service_description";

/// Reads and transactional writes for orders.
pub struct OrderRepo;

impl OrderRepo {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// An order with all of its service lines, read from one snapshot.
    pub async fn find_detail(pool: &PgPool, id: DbId) -> Result<Option<OrderDetail>, sqlx::Error> {
        let mut tx = begin_snapshot(pool).await?;
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "{SELECT_COLUMNS} {FROM} WHERE o.order_id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            tx.commit().await?;
            return Ok(None);
        };
        let lines = sqlx::query_as::<_, OrderServiceLine>(&format!(
            "SELECT {LINE_COLUMNS}
             FROM order_services ors
             JOIN common_services cs ON cs.service_id = ors.service_id
             WHERE ors.order_id = $1
             ORDER BY ors.order_service_id"
        ))
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(Some(OrderDetail::new(row, lines)))
    }

    /// One filtered, sorted page plus the filtered total, both from one
    /// `REPEATABLE READ` snapshot.
    pub async fn list(pool: &PgPool, query: &OrderQuery) -> Result<Page<OrderRow>, sqlx::Error> {
        let OrderFilter {
            active_order,
            status,
            customer_id,
        } = query.filter;
        let status = status.map(|s| s.as_str());

        let mut tx = begin_snapshot(pool).await?;
        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {FROM} WHERE {FILTER}"))
            .bind(active_order)
            .bind(status)
            .bind(customer_id)
            .fetch_one(&mut *tx)
            .await?;
        let items = sqlx::query_as::<_, OrderRow>(&format!(
            "{SELECT_COLUMNS} {FROM} WHERE {FILTER} ORDER BY {} LIMIT $4 OFFSET $5",
            query.sort.to_sql()
        ))
        .bind(active_order)
        .bind(status)
        .bind(customer_id)
        .bind(query.window.limit)
        .bind(query.window.offset)
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(Page { items, total })
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM orders WHERE order_id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Transactional writes
    // -----------------------------------------------------------------------

    /// Insert all four parts of a new order. Returns the order id.
    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        order: &NewOrder,
        order_hash: &str,
        now: Timestamp,
    ) -> Result<DbId, sqlx::Error> {
        let order_id: DbId = sqlx::query_scalar(
            "INSERT INTO orders
                (employee_id, customer_id, vehicle_id, assigned_employee_id,
                 order_date, active_order, order_hash)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING order_id",
        )
        .bind(order.employee_id)
        .bind(order.customer_id)
        .bind(order.vehicle_id)
        .bind(order.assigned_employee_id)
        .bind(now)
        .bind(order.active_order())
        .bind(order_hash)
        .fetch_one(&mut **tx)
        .await?;

        let completion_date = order.status.is_completed().then_some(now);
        sqlx::query(
            "INSERT INTO order_info
                (order_id, order_description, estimated_completion_date, completion_date,
                 order_total_price, additional_request, notes_for_internal_use,
                 notes_for_customer)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(order_id)
        .bind(&order.order_description)
        .bind(order.estimated_completion_date)
        .bind(completion_date)
        .bind(order.order_total_price)
        .bind(&order.additional_request)
        .bind(&order.notes_for_internal_use)
        .bind(&order.notes_for_customer)
        .execute(&mut **tx)
        .await?;

        Self::insert_lines(tx, order_id, &order.services).await?;

        sqlx::query("INSERT INTO order_status (order_id, order_status) VALUES ($1, $2)")
            .bind(order_id)
            .bind(order.status.as_str())
            .execute(&mut **tx)
            .await?;

        Ok(order_id)
    }

    /// Lock an order's rows and read its mutable state. `None` if absent.
    pub async fn lock_state(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<OrderState>, sqlx::Error> {
        sqlx::query_as::<_, OrderState>(
            "SELECT o.order_id, o.assigned_employee_id, o.active_order,
                    oi.order_description, oi.estimated_completion_date, oi.completion_date,
                    oi.order_total_price, oi.additional_request, oi.notes_for_internal_use,
                    oi.notes_for_customer, oi.additional_requests_completed,
                    os.order_status
             FROM orders o
             JOIN order_info oi ON oi.order_id = o.order_id
             JOIN order_status os ON os.order_id = o.order_id
             WHERE o.order_id = $1
             FOR UPDATE OF o, oi, os",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
    }

    /// Current service lines of a locked order.
    pub async fn lines(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Vec<ServiceLine>, sqlx::Error> {
        let rows: Vec<(DbId, bool)> = sqlx::query_as(
            "SELECT service_id, service_completed FROM order_services
             WHERE order_id = $1
             ORDER BY order_service_id
             FOR UPDATE",
        )
        .bind(id)
        .fetch_all(&mut **tx)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(service_id, service_completed)| ServiceLine {
                service_id,
                service_completed,
            })
            .collect())
    }

    /// Write a non-empty plan and bump `last_updated`.
    pub async fn apply(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        plan: &OrderPlan,
        now: Timestamp,
    ) -> Result<(), sqlx::Error> {
        let next = &plan.next;
        sqlx::query(
            "UPDATE orders SET
                assigned_employee_id = $2,
                active_order = $3,
                last_updated = $4
             WHERE order_id = $1",
        )
        .bind(id)
        .bind(next.assigned_employee_id)
        .bind(next.active_order)
        .bind(now)
        .execute(&mut **tx)
        .await?;

        if plan.info_changed {
            sqlx::query(
                "UPDATE order_info SET
                    order_description = $2,
                    estimated_completion_date = $3,
                    completion_date = $4,
                    order_total_price = $5,
                    additional_request = $6,
                    notes_for_internal_use = $7,
                    notes_for_customer = $8,
                    additional_requests_completed = $9
                 WHERE order_id = $1",
            )
            .bind(id)
            .bind(&next.order_description)
            .bind(next.estimated_completion_date)
            .bind(next.completion_date)
            .bind(next.order_total_price)
            .bind(&next.additional_request)
            .bind(&next.notes_for_internal_use)
            .bind(&next.notes_for_customer)
            .bind(next.additional_requests_completed)
            .execute(&mut **tx)
            .await?;
        }

        if plan.status_changed {
            sqlx::query("UPDATE order_status SET order_status = $2 WHERE order_id = $1")
                .bind(id)
                .bind(next.order_status.as_str())
                .execute(&mut **tx)
                .await?;
        }

        if !plan.services_to_remove.is_empty() {
            sqlx::query("DELETE FROM order_services WHERE order_id = $1 AND service_id = ANY($2)")
                .bind(id)
                .bind(&plan.services_to_remove)
                .execute(&mut **tx)
                .await?;
        }

        if !plan.services_to_flag.is_empty() {
            let (ids, flags) = split_lines(&plan.services_to_flag);
            sqlx::query(
                "UPDATE order_services AS ors SET service_completed = f.done
                 FROM UNNEST($2::bigint[], $3::boolean[]) AS f(service_id, done)
                 WHERE ors.order_id = $1 AND ors.service_id = f.service_id",
            )
            .bind(id)
            .bind(&ids)
            .bind(&flags)
            .execute(&mut **tx)
            .await?;
        }

        Self::insert_lines(tx, id, &plan.services_to_add).await
    }

    /// Delete an order, children first. Returns `true` if the order existed.
    pub async fn delete(tx: &mut Transaction<'_, Postgres>, id: DbId) -> Result<bool, sqlx::Error> {
        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT order_id FROM orders WHERE order_id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?;
        if locked.is_none() {
            return Ok(false);
        }

        for statement in [
            "DELETE FROM order_services WHERE order_id = $1",
            "DELETE FROM order_status WHERE order_id = $1",
            "DELETE FROM order_info WHERE order_id = $1",
            "DELETE FROM orders WHERE order_id = $1",
        ] {
            sqlx::query(statement).bind(id).execute(&mut **tx).await?;
        }
        Ok(true)
    }

    async fn insert_lines(
        tx: &mut Transaction<'_, Postgres>,
        order_id: DbId,
        lines: &[ServiceLine],
    ) -> Result<(), sqlx::Error> {
        if lines.is_empty() {
            return Ok(());
        }
        let (ids, flags) = split_lines(lines);
        sqlx::query(
            "INSERT INTO order_services (order_id, service_id, service_completed)
             SELECT $1, l.service_id, l.done
             FROM UNNEST($2::bigint[], $3::boolean[]) AS l(service_id, done)",
        )
        .bind(order_id)
        .bind(&ids)
        .bind(&flags)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

fn split_lines(lines: &[ServiceLine]) -> (Vec<DbId>, Vec<bool>) {
    lines
        .iter()
        .map(|l| (l.service_id, l.service_completed))
        .unzip()
}
