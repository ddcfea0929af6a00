//! Transactional order workflow
//!
//! Each operation runs in a single transaction; an early return drops the
//! transaction and rolls everything back.

use shared::error::{AppError, ErrorCode};
use shared::models::{Order, OrderStatus, TABLE_AVAILABLE, TABLE_OCCUPIED};
use sqlx::PgPool;

use super::edit::OrderEdit;
use super::{
    ManualOrder, NewOrder, Placement, PlacementOutcome, StatusTransition, final_status,
    plan_placement,
};
use crate::db::orders::{self as store, ContactBackfill};
use crate::error::{
    ServiceError, ServiceResult, is_foreign_key_violation, is_out_of_range, is_unique_violation,
};

/// Partial unique index keeping one unpaid order per table
const ONE_OPEN_PER_TABLE: &str = "idx_orders_one_open_per_table";

fn order_not_found(order_id: i64) -> AppError {
    AppError::new(ErrorCode::OrderNotFound).with_detail("orderId", order_id)
}

fn table_occupied(table_number: Option<&str>) -> ServiceError {
    AppError::new(ErrorCode::TableOccupied)
        .with_detail("tableNumber", table_number.unwrap_or_default())
        .into()
}

/// Running totals past the column range are a client error
fn amount_or_db(e: sqlx::Error) -> ServiceError {
    if is_out_of_range(&e) {
        AppError::with_message(ErrorCode::InvalidAmount, "Order total is too large").into()
    } else {
        e.into()
    }
}

/// Create a new order or merge into the table's open one.
pub async fn place_order(pool: &PgPool, order: &NewOrder) -> ServiceResult<PlacementOutcome> {
    let mut tx = pool.begin().await?;

    let open = match order.table() {
        Some((number, category)) => {
            store::lock_table(&mut *tx, order.restaurant_id, number, category).await?;
            store::find_open_order(&mut *tx, order.restaurant_id, number, category).await?
        }
        None => None,
    };

    let outcome = match plan_placement(open) {
        Placement::Merge(existing) => {
            store::merge_into(&mut *tx, existing.id, order.subtotal)
                .await
                .map_err(amount_or_db)?;
            PlacementOutcome::Merged {
                order_id: existing.id,
                bill_no: existing.bill_no,
            }
        }
        Placement::Create => {
            let bill_no = store::next_bill_no(&mut *tx, order.restaurant_id)
                .await
                .map_err(|e| tenant_or_db(e, order.restaurant_id))?;
            let order_id = match store::insert_order(&mut *tx, order, bill_no).await {
                Ok(id) => id,
                Err(e) if is_unique_violation(&e, Some(ONE_OPEN_PER_TABLE)) => {
                    return Err(table_occupied(order.table_number.as_deref()));
                }
                Err(e) => return Err(e.into()),
            };
            if let Some((number, category)) = order.table() {
                store::set_table_status(
                    &mut *tx,
                    order.restaurant_id,
                    number,
                    category,
                    TABLE_OCCUPIED,
                )
                .await?;
            }
            PlacementOutcome::Created { order_id, bill_no }
        }
    };

    for item in &order.items {
        store::upsert_line(&mut *tx, outcome.order_id(), item)
            .await
            .map_err(amount_or_db)?;
    }

    tx.commit().await?;

    tracing::info!(
        restaurant_id = order.restaurant_id,
        order_id = outcome.order_id(),
        bill_no = outcome.bill_no(),
        merged = matches!(outcome, PlacementOutcome::Merged { .. }),
        "Order placed"
    );
    Ok(outcome)
}

fn tenant_or_db(e: sqlx::Error, restaurant_id: i64) -> crate::error::ServiceError {
    if is_foreign_key_violation(&e) {
        AppError::new(ErrorCode::RestaurantNotFound)
            .with_detail("restaurantId", restaurant_id)
            .into()
    } else {
        e.into()
    }
}

/// Apply a status change with its side effects.
pub async fn change_status(
    pool: &PgPool,
    restaurant_id: i64,
    order_id: i64,
    status: OrderStatus,
) -> ServiceResult<Order> {
    let updated = match StatusTransition::from(status) {
        StatusTransition::Accept => store::mark_accepted(pool, restaurant_id, order_id).await?,
        StatusTransition::Serve => {
            let mut tx = pool.begin().await?;
            let Some(order) = store::mark_served(&mut *tx, restaurant_id, order_id).await? else {
                return Err(order_not_found(order_id).into());
            };
            store::serve_all_lines(&mut *tx, order_id).await?;
            tx.commit().await?;
            Some(order)
        }
        StatusTransition::Assign(other) => {
            store::assign_status(pool, restaurant_id, order_id, other.as_str()).await?
        }
    };

    let order = updated.ok_or_else(|| order_not_found(order_id))?;
    tracing::info!(restaurant_id, order_id, status = %status, "Order status changed");
    Ok(order)
}

/// Payment details for [`finalize`]
#[derive(Debug, Clone)]
pub struct Payment {
    pub payment_type: String,
    pub contact: ContactBackfill,
}

/// Finalized order, and whether a table was released
#[derive(Debug)]
pub struct Finalized {
    pub order: Order,
    pub released_table: bool,
}

/// Record payment, set the terminal status and free the table.
pub async fn finalize(
    pool: &PgPool,
    restaurant_id: i64,
    order_id: i64,
    payment: &Payment,
) -> ServiceResult<Finalized> {
    let mut tx = pool.begin().await?;

    let target = store::lock_order(&mut *tx, restaurant_id, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;
    if target.is_paid {
        return Err(AppError::new(ErrorCode::OrderAlreadyPaid)
            .with_detail("orderId", order_id)
            .into());
    }

    let status = final_status(&target.delivery_type);
    let order = store::mark_paid(
        &mut *tx,
        order_id,
        &payment.payment_type,
        status.as_str(),
        &payment.contact,
    )
    .await?;

    let released_table = match (target.table_number.as_deref(), target.table_category_id) {
        (Some(number), Some(category)) => {
            let released =
                store::set_table_status(&mut *tx, restaurant_id, number, category, TABLE_AVAILABLE)
                    .await?;
            released > 0
        }
        _ => false,
    };

    tx.commit().await?;

    tracing::info!(
        restaurant_id,
        order_id,
        bill_no = order.bill_no,
        status = %status,
        released_table,
        "Order finalized"
    );
    Ok(Finalized {
        order,
        released_table,
    })
}

/// Table an unpaid order holds
fn held_table(
    is_paid: bool,
    number: Option<&str>,
    category: Option<i64>,
) -> Option<(String, i64)> {
    match (is_paid, number, category) {
        (false, Some(number), Some(category)) => Some((number.to_owned(), category)),
        _ => None,
    }
}

/// Apply a single-field edit, keeping table occupancy in step when the
/// edit pays, reopens or moves the order.
pub async fn edit_order(
    pool: &PgPool,
    restaurant_id: i64,
    order_id: i64,
    edit: &OrderEdit,
) -> ServiceResult<Order> {
    let mut tx = pool.begin().await?;

    let before = store::lock_order(&mut *tx, restaurant_id, order_id)
        .await?
        .ok_or_else(|| order_not_found(order_id))?;

    let order = match store::apply_edit(&mut *tx, restaurant_id, order_id, edit).await {
        Ok(Some(order)) => order,
        Ok(None) => return Err(order_not_found(order_id).into()),
        Err(e) if is_unique_violation(&e, Some(ONE_OPEN_PER_TABLE)) => {
            return Err(table_occupied(before.table_number.as_deref()));
        }
        Err(e) => return Err(amount_or_db(e)),
    };

    let held_before = held_table(
        before.is_paid,
        before.table_number.as_deref(),
        before.table_category_id,
    );
    let held_after = held_table(
        order.is_paid,
        order.table_number.as_deref(),
        order.table_category_id,
    );
    let table_changed = held_before != held_after;
    if table_changed {
        if let Some((number, category)) = &held_before {
            store::set_table_status(&mut *tx, restaurant_id, number, *category, TABLE_AVAILABLE)
                .await?;
        }
        if let Some((number, category)) = &held_after {
            store::set_table_status(&mut *tx, restaurant_id, number, *category, TABLE_OCCUPIED)
                .await?;
        }
    }

    tx.commit().await?;

    tracing::info!(
        restaurant_id,
        order_id,
        field = edit.column,
        table_changed,
        "Order field updated"
    );
    Ok(order)
}

/// Record an order that was paid outside the normal flow.
pub async fn record_manual_order(pool: &PgPool, order: &ManualOrder) -> ServiceResult<Order> {
    let mut tx = pool.begin().await?;

    let bill_no = store::next_bill_no(&mut *tx, order.restaurant_id)
        .await
        .map_err(|e| tenant_or_db(e, order.restaurant_id))?;
    let saved = store::insert_manual_order(&mut *tx, order, bill_no).await?;
    for item in &order.items {
        store::upsert_line(&mut *tx, saved.id, item).await?;
    }

    tx.commit().await?;

    tracing::info!(
        restaurant_id = order.restaurant_id,
        order_id = saved.id,
        bill_no,
        "Manual order recorded"
    );
    Ok(saved)
}
