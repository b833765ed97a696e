//! Repair order aggregate models.
//!
//! An order spans four tables written together: `orders`, `order_info`,
//! `order_status` and `order_services`. Request DTOs arrive loosely typed
//! from the admin console and are resolved into [`NewOrder`] and
//! [`OrderChanges`] before any SQL runs. [`OrderChanges::plan`] compares a
//! patch against the locked [`OrderState`] and yields the exact writes.

use std::collections::BTreeMap;

use autoshop_core::error::CoreError;
use autoshop_core::identity::Identity;
use autoshop_core::input::{
    deserialize_date_patch, deserialize_decimal_patch, deserialize_flag,
    deserialize_optional_date, deserialize_optional_decimal, deserialize_optional_flag,
    deserialize_present, deserialize_timestamp_patch, optional_id, require_id, LooseId,
};
use autoshop_core::order_status::OrderStatus;
use autoshop_core::pagination::PageWindow;
use autoshop_core::sorting::OrderSort;
use autoshop_core::types::{Date, DbId, Timestamp};
use autoshop_core::validation::validate_price;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// One selected service as posted by the console.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderServiceInput {
    pub service_id: Option<LooseId>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub service_completed: bool,
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateOrder {
    /// Receiving employee. Defaults to the caller.
    pub employee_id: Option<LooseId>,
    pub customer_id: Option<LooseId>,
    pub vehicle_id: Option<LooseId>,
    pub assigned_employee_id: Option<LooseId>,
    pub order_description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub estimated_completion_date: Option<Date>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub order_total_price: Option<Decimal>,
    pub additional_request: Option<String>,
    pub notes_for_internal_use: Option<String>,
    pub notes_for_customer: Option<String>,
    pub order_status: Option<OrderStatus>,
    #[serde(default)]
    pub order_services: Vec<OrderServiceInput>,
}

/// Body of `PUT /api/orders/{id}`. Absent fields are left unchanged;
/// an explicit `null` clears a nullable column.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateOrder {
    /// `null`, `0` or `""` unassigns.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub assigned_employee_id: Option<Option<LooseId>>,
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    pub active_order: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub order_description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_date_patch")]
    pub estimated_completion_date: Option<Option<Date>>,
    #[serde(default, deserialize_with = "deserialize_timestamp_patch")]
    pub completion_date: Option<Option<Timestamp>>,
    #[serde(default, deserialize_with = "deserialize_decimal_patch")]
    pub order_total_price: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub additional_request: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub notes_for_internal_use: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub notes_for_customer: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_optional_flag")]
    pub additional_requests_completed: Option<bool>,
    pub order_status: Option<OrderStatus>,
    /// When present, the order's service list is reconciled to exactly this set.
    pub order_services: Option<Vec<OrderServiceInput>>,
}

// ---------------------------------------------------------------------------
// Resolved inputs
// ---------------------------------------------------------------------------

/// A service line with a resolved id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceLine {
    pub service_id: DbId,
    pub service_completed: bool,
}

/// A validated create request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub employee_id: DbId,
    pub customer_id: DbId,
    pub vehicle_id: DbId,
    pub assigned_employee_id: Option<DbId>,
    pub order_description: Option<String>,
    pub estimated_completion_date: Option<Date>,
    pub order_total_price: Option<Decimal>,
    pub additional_request: Option<String>,
    pub notes_for_internal_use: Option<String>,
    pub notes_for_customer: Option<String>,
    pub status: OrderStatus,
    pub services: Vec<ServiceLine>,
}

impl NewOrder {
    /// Completed-on-arrival orders are closed immediately.
    pub fn active_order(&self) -> bool {
        !self.status.is_completed()
    }

    pub fn service_ids(&self) -> Vec<DbId> {
        self.services.iter().map(|l| l.service_id).collect()
    }
}

impl CreateOrder {
    /// Coerce ids and validate fields. The receiving employee defaults to `caller`.
    pub fn resolve(self, caller: &Identity) -> Result<NewOrder, CoreError> {
        let employee_id = match optional_id(self.employee_id.as_ref(), "employee_id")? {
            Some(id) => id,
            None => caller.employee_id,
        };
        let customer_id = require_id(self.customer_id.as_ref(), "customer_id")?;
        let vehicle_id = require_id(self.vehicle_id.as_ref(), "vehicle_id")?;
        let assigned_employee_id =
            optional_id(self.assigned_employee_id.as_ref(), "assigned_employee_id")?;
        if let Some(price) = self.order_total_price {
            validate_price(price, "order_total_price")?;
        }
        Ok(NewOrder {
            employee_id,
            customer_id,
            vehicle_id,
            assigned_employee_id,
            order_description: non_blank(self.order_description),
            estimated_completion_date: self.estimated_completion_date,
            order_total_price: self.order_total_price,
            additional_request: non_blank(self.additional_request),
            notes_for_internal_use: non_blank(self.notes_for_internal_use),
            notes_for_customer: non_blank(self.notes_for_customer),
            status: self.order_status.unwrap_or_default(),
            services: resolve_service_lines(&self.order_services)?,
        })
    }
}

/// A validated update request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderChanges {
    pub assigned_employee_id: Option<Option<DbId>>,
    pub active_order: Option<bool>,
    pub order_description: Option<Option<String>>,
    pub estimated_completion_date: Option<Option<Date>>,
    pub completion_date: Option<Option<Timestamp>>,
    pub order_total_price: Option<Option<Decimal>>,
    pub additional_request: Option<Option<String>>,
    pub notes_for_internal_use: Option<Option<String>>,
    pub notes_for_customer: Option<Option<String>>,
    pub additional_requests_completed: Option<bool>,
    pub status: Option<OrderStatus>,
    pub services: Option<Vec<ServiceLine>>,
}

impl UpdateOrder {
    pub fn resolve(self) -> Result<OrderChanges, CoreError> {
        let assigned_employee_id = match &self.assigned_employee_id {
            None => None,
            Some(raw) => Some(optional_id(raw.as_ref(), "assigned_employee_id")?),
        };
        if let Some(Some(price)) = self.order_total_price {
            validate_price(price, "order_total_price")?;
        }
        let services = match &self.order_services {
            None => None,
            Some(lines) => Some(resolve_service_lines(lines)?),
        };
        Ok(OrderChanges {
            assigned_employee_id,
            active_order: self.active_order,
            order_description: self.order_description.map(non_blank),
            estimated_completion_date: self.estimated_completion_date,
            completion_date: self.completion_date,
            order_total_price: self.order_total_price,
            additional_request: self.additional_request.map(non_blank),
            notes_for_internal_use: self.notes_for_internal_use.map(non_blank),
            notes_for_customer: self.notes_for_customer.map(non_blank),
            additional_requests_completed: self.additional_requests_completed,
            status: self.order_status,
            services,
        })
    }
}

/// Coerce service ids, dropping entries without one and collapsing repeats.
///
/// A repeated service is kept once, in first-seen position, and counts as
/// completed if any of its entries is.
fn resolve_service_lines(input: &[OrderServiceInput]) -> Result<Vec<ServiceLine>, CoreError> {
    let mut lines: Vec<ServiceLine> = Vec::with_capacity(input.len());
    for entry in input {
        let Some(service_id) = optional_id(entry.service_id.as_ref(), "service_id")? else {
            continue;
        };
        match lines.iter_mut().find(|l| l.service_id == service_id) {
            Some(existing) => existing.service_completed |= entry.service_completed,
            None => lines.push(ServiceLine {
                service_id,
                service_completed: entry.service_completed,
            }),
        }
    }
    Ok(lines)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Change planning
// ---------------------------------------------------------------------------

/// The mutable columns of one order, as read under `FOR UPDATE`.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct OrderState {
    pub order_id: DbId,
    pub assigned_employee_id: Option<DbId>,
    pub active_order: bool,
    pub order_description: Option<String>,
    pub estimated_completion_date: Option<Date>,
    pub completion_date: Option<Timestamp>,
    pub order_total_price: Option<Decimal>,
    pub additional_request: Option<String>,
    pub notes_for_internal_use: Option<String>,
    pub notes_for_customer: Option<String>,
    pub additional_requests_completed: bool,
    #[sqlx(try_from = "String")]
    pub order_status: OrderStatus,
}

/// The writes needed to apply an [`OrderChanges`] to an [`OrderState`].
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPlan {
    /// State after the update.
    pub next: OrderState,
    pub orders_changed: bool,
    pub info_changed: bool,
    pub status_changed: bool,
    pub services_to_add: Vec<ServiceLine>,
    pub services_to_remove: Vec<DbId>,
    pub services_to_flag: Vec<ServiceLine>,
}

impl OrderPlan {
    pub fn is_noop(&self) -> bool {
        !self.orders_changed
            && !self.info_changed
            && !self.status_changed
            && self.services_to_add.is_empty()
            && self.services_to_remove.is_empty()
            && self.services_to_flag.is_empty()
    }
}

impl OrderChanges {
    /// Work out the writes for this patch.
    ///
    /// Rejects backward status moves. Moving into `completed` stamps
    /// `completion_date` with `now` and closes the order, unless the patch
    /// sets those columns itself.
    pub fn plan(
        &self,
        current: &OrderState,
        current_lines: &[ServiceLine],
        now: Timestamp,
    ) -> Result<OrderPlan, CoreError> {
        let mut next = current.clone();

        if let Some(status) = self.status {
            current.order_status.validate_transition(status)?;
            next.order_status = status;
        }
        let completing = next.order_status.is_completed() && !current.order_status.is_completed();

        if let Some(v) = self.assigned_employee_id {
            next.assigned_employee_id = v;
        }
        match self.active_order {
            Some(v) => next.active_order = v,
            None if completing => next.active_order = false,
            None => {}
        }
        if let Some(v) = &self.order_description {
            next.order_description.clone_from(v);
        }
        if let Some(v) = self.estimated_completion_date {
            next.estimated_completion_date = v;
        }
        match self.completion_date {
            Some(v) => next.completion_date = v,
            None if completing && current.completion_date.is_none() => {
                next.completion_date = Some(now);
            }
            None => {}
        }
        if let Some(v) = self.order_total_price {
            next.order_total_price = v;
        }
        if let Some(v) = &self.additional_request {
            next.additional_request.clone_from(v);
        }
        if let Some(v) = &self.notes_for_internal_use {
            next.notes_for_internal_use.clone_from(v);
        }
        if let Some(v) = &self.notes_for_customer {
            next.notes_for_customer.clone_from(v);
        }
        if let Some(v) = self.additional_requests_completed {
            next.additional_requests_completed = v;
        }

        let orders_changed = next.assigned_employee_id != current.assigned_employee_id
            || next.active_order != current.active_order;
        let info_changed = next.order_description != current.order_description
            || next.estimated_completion_date != current.estimated_completion_date
            || next.completion_date != current.completion_date
            || next.order_total_price != current.order_total_price
            || next.additional_request != current.additional_request
            || next.notes_for_internal_use != current.notes_for_internal_use
            || next.notes_for_customer != current.notes_for_customer
            || next.additional_requests_completed != current.additional_requests_completed;
        let status_changed = next.order_status != current.order_status;

        let (services_to_add, services_to_remove, services_to_flag) = match &self.services {
            None => (Vec::new(), Vec::new(), Vec::new()),
            Some(wanted) => reconcile_services(current_lines, wanted),
        };

        Ok(OrderPlan {
            next,
            orders_changed,
            info_changed,
            status_changed,
            services_to_add,
            services_to_remove,
            services_to_flag,
        })
    }
}

/// Diff the stored service lines against the wanted set.
///
/// Returns `(add, remove, flag)`: lines to insert, service ids to delete, and
/// kept lines whose completed flag changes.
fn reconcile_services(
    current: &[ServiceLine],
    wanted: &[ServiceLine],
) -> (Vec<ServiceLine>, Vec<DbId>, Vec<ServiceLine>) {
    let existing: BTreeMap<DbId, bool> = current
        .iter()
        .map(|l| (l.service_id, l.service_completed))
        .collect();
    let mut add = Vec::new();
    let mut flag = Vec::new();
    for line in wanted {
        match existing.get(&line.service_id) {
            None => add.push(*line),
            Some(&done) if done != line.service_completed => flag.push(*line),
            Some(_) => {}
        }
    }
    let remove = current
        .iter()
        .filter(|l| !wanted.iter().any(|w| w.service_id == l.service_id))
        .map(|l| l.service_id)
        .collect();
    (add, remove, flag)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// An order denormalized with its customer, vehicle and employee names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderRow {
    pub order_id: DbId,
    pub employee_id: DbId,
    pub customer_id: DbId,
    pub vehicle_id: DbId,
    pub assigned_employee_id: Option<DbId>,
    pub order_date: Timestamp,
    pub last_updated: Option<Timestamp>,
    pub active_order: bool,
    pub order_hash: String,

    pub order_description: Option<String>,
    pub estimated_completion_date: Option<Date>,
    pub completion_date: Option<Timestamp>,
    #[serde(serialize_with = "rust_decimal::serde::float_option::serialize")]
    pub order_total_price: Option<Decimal>,
    pub additional_request: Option<String>,
    pub notes_for_internal_use: Option<String>,
    pub notes_for_customer: Option<String>,
    pub additional_requests_completed: bool,

    #[sqlx(try_from = "String")]
    pub order_status: OrderStatus,

    pub customer_first_name: String,
    pub customer_last_name: String,
    pub customer_email: String,
    pub customer_phone_number: String,
    pub active_customer_status: bool,

    pub vehicle_year: i32,
    pub vehicle_make: String,
    pub vehicle_model: String,
    pub vehicle_type: String,
    pub vehicle_mileage: Option<i32>,
    pub vehicle_tag: Option<String>,
    pub vehicle_serial: String,
    pub vehicle_color: Option<String>,

    pub employee_first_name: String,
    pub employee_last_name: String,
    pub assigned_employee_first_name: Option<String>,
    pub assigned_employee_last_name: Option<String>,
}

/// A service line joined with its catalog entry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrderServiceLine {
    pub order_service_id: DbId,
    pub order_id: DbId,
    pub service_id: DbId,
    pub service_completed: bool,
    pub service_name: String,
    pub service_description: String,
}

/// `getOrder` result: the order plus its service lines.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: OrderRow,
    /// Lines still to be done.
    pub services: Vec<OrderServiceLine>,
    pub completed_services: Vec<OrderServiceLine>,
}

impl OrderDetail {
    pub fn new(order: OrderRow, lines: Vec<OrderServiceLine>) -> Self {
        let (completed_services, services) = lines.into_iter().partition(|l| l.service_completed);
        Self {
            order,
            services,
            completed_services,
        }
    }
}

/// List filters. `None` means "any".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub active_order: Option<bool>,
    pub status: Option<OrderStatus>,
    pub customer_id: Option<DbId>,
}

/// A fully resolved list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderQuery {
    pub filter: OrderFilter,
    pub sort: OrderSort,
    pub window: PageWindow,
}
