//! Order statements
//!
//! Steps that run inside a workflow transaction take `&mut PgConnection`
//! (call with `&mut *tx`); plain reads take the pool.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::models::{Customer, Order, OrderItemInput, OrderLine};
use sqlx::{PgConnection, PgPool};

use crate::orders::edit::{EditValue, OrderEdit};
use crate::orders::kitchen::KitchenRow;
use crate::orders::{ManualOrder, NewOrder, OpenOrder};

// ── Placement ──

/// Lock the table row(s) so concurrent submissions for one table serialize.
pub async fn lock_table(
    conn: &mut PgConnection,
    restaurant_id: i64,
    table_number: &str,
    category_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        SELECT id FROM restauranttables
        WHERE restaurant_id = $1 AND table_number = $2 AND category_id = $3
        FOR UPDATE
        "#,
    )
    .bind(restaurant_id)
    .bind(table_number)
    .bind(category_id)
    .fetch_all(conn)
    .await?;
    Ok(())
}

pub async fn find_open_order(
    conn: &mut PgConnection,
    restaurant_id: i64,
    table_number: &str,
    category_id: i64,
) -> Result<Option<OpenOrder>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT id, bill_no FROM orders
        WHERE restaurant_id = $1 AND table_number = $2 AND table_category_id = $3
          AND NOT is_paid
        ORDER BY order_date DESC
        LIMIT 1
        FOR UPDATE
        "#,
    )
    .bind(restaurant_id)
    .bind(table_number)
    .bind(category_id)
    .fetch_optional(conn)
    .await
}

/// Next bill number of a tenant (starts at 1, never reused)
pub async fn next_bill_no(conn: &mut PgConnection, restaurant_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO bill_counters (restaurant_id, last_bill_no)
        VALUES ($1, 1)
        ON CONFLICT (restaurant_id)
        DO UPDATE SET last_bill_no = bill_counters.last_bill_no + 1
        RETURNING last_bill_no
        "#,
    )
    .bind(restaurant_id)
    .fetch_one(conn)
    .await
}

pub async fn insert_order(
    conn: &mut PgConnection,
    order: &NewOrder,
    bill_no: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO orders (
            restaurant_id, bill_no, table_number, table_category_id,
            customer_name, customer_phone, customer_email,
            delivery_type, payment_type, total_amount, is_opted_in, staff_id, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'pending')
        RETURNING id
        "#,
    )
    .bind(order.restaurant_id)
    .bind(bill_no)
    .bind(&order.table_number)
    .bind(order.table_category_id)
    .bind(&order.customer_name)
    .bind(&order.customer_phone)
    .bind(&order.customer_email)
    .bind(order.delivery_type.as_str())
    .bind(&order.payment_type)
    .bind(order.subtotal)
    .bind(order.is_opted_in)
    .bind(order.staff_id)
    .fetch_one(conn)
    .await
}

/// Add a submission to an open order: it re-enters the kitchen queue.
pub async fn merge_into(
    conn: &mut PgConnection,
    order_id: i64,
    subtotal: Decimal,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE orders SET
            total_amount = total_amount + $1,
            status = 'pending',
            accepted_at = NULL,
            served_at = NULL
        WHERE id = $2
        "#,
    )
    .bind(subtotal)
    .bind(order_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Insert a line, or add to the quantity of the order's line for the same item.
/// An existing line keeps its price snapshot.
pub async fn upsert_line(
    conn: &mut PgConnection,
    order_id: i64,
    item: &OrderItemInput,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO order_details (order_id, menu_item_id, item_name, quantity, quantity_served, price)
        VALUES ($1, $2, $3, $4, 0, $5)
        ON CONFLICT (order_id, menu_item_id)
        DO UPDATE SET quantity = order_details.quantity + EXCLUDED.quantity
        "#,
    )
    .bind(order_id)
    .bind(item.menu_item_id)
    .bind(&item.item_name)
    .bind(item.quantity)
    .bind(item.price)
    .execute(conn)
    .await?;
    Ok(())
}

/// Returns the number of table rows changed.
pub async fn set_table_status(
    conn: &mut PgConnection,
    restaurant_id: i64,
    table_number: &str,
    category_id: i64,
    status: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE restauranttables SET status = $1
        WHERE restaurant_id = $2 AND table_number = $3 AND category_id = $4
        "#,
    )
    .bind(status)
    .bind(restaurant_id)
    .bind(table_number)
    .bind(category_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

// ── Status ──

pub async fn mark_accepted(
    pool: &PgPool,
    restaurant_id: i64,
    order_id: i64,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE orders SET status = 'accepted', accepted_at = now()
        WHERE id = $1 AND restaurant_id = $2
        RETURNING *
        "#,
    )
    .bind(order_id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await
}

pub async fn mark_served(
    conn: &mut PgConnection,
    restaurant_id: i64,
    order_id: i64,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE orders SET status = 'served', served_at = now()
        WHERE id = $1 AND restaurant_id = $2
        RETURNING *
        "#,
    )
    .bind(order_id)
    .bind(restaurant_id)
    .fetch_optional(conn)
    .await
}

pub async fn serve_all_lines(conn: &mut PgConnection, order_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE order_details SET quantity_served = quantity WHERE order_id = $1")
        .bind(order_id)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

pub async fn assign_status(
    pool: &PgPool,
    restaurant_id: i64,
    order_id: i64,
    status: &str,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("UPDATE orders SET status = $1 WHERE id = $2 AND restaurant_id = $3 RETURNING *")
        .bind(status)
        .bind(order_id)
        .bind(restaurant_id)
        .fetch_optional(pool)
        .await
}

// ── Finalize ──

/// Order fields finalize and edits decide on, read under a row lock
#[derive(Debug, sqlx::FromRow)]
pub struct LockedOrder {
    pub delivery_type: String,
    pub is_paid: bool,
    pub table_number: Option<String>,
    pub table_category_id: Option<i64>,
}

pub async fn lock_order(
    conn: &mut PgConnection,
    restaurant_id: i64,
    order_id: i64,
) -> Result<Option<LockedOrder>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT delivery_type, is_paid, table_number, table_category_id
        FROM orders
        WHERE id = $1 AND restaurant_id = $2
        FOR UPDATE
        "#,
    )
    .bind(order_id)
    .bind(restaurant_id)
    .fetch_optional(conn)
    .await
}

/// Customer contact backfilled on payment (absent fields keep their value)
#[derive(Debug, Default, Clone)]
pub struct ContactBackfill {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

pub async fn mark_paid(
    conn: &mut PgConnection,
    order_id: i64,
    payment_type: &str,
    status: &str,
    contact: &ContactBackfill,
) -> Result<Order, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE orders SET
            is_paid = TRUE,
            payment_type = $1,
            status = $2,
            customer_name = COALESCE($3, customer_name),
            customer_phone = COALESCE($4, customer_phone),
            customer_email = COALESCE($5, customer_email)
        WHERE id = $6
        RETURNING *
        "#,
    )
    .bind(payment_type)
    .bind(status)
    .bind(&contact.name)
    .bind(&contact.phone)
    .bind(&contact.email)
    .bind(order_id)
    .fetch_one(conn)
    .await
}

// ── Manual orders ──

pub async fn insert_manual_order(
    conn: &mut PgConnection,
    order: &ManualOrder,
    bill_no: i64,
) -> Result<Order, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO orders (
            restaurant_id, bill_no, customer_name, customer_phone, customer_email,
            delivery_type, payment_type, total_amount, is_paid, status, order_date
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE, 'paid', COALESCE($9::date::timestamptz, now()))
        RETURNING *
        "#,
    )
    .bind(order.restaurant_id)
    .bind(bill_no)
    .bind(&order.customer_name)
    .bind(&order.customer_phone)
    .bind(&order.customer_email)
    .bind(order.delivery_type.as_str())
    .bind(&order.payment_type)
    .bind(order.total)
    .bind(order.order_date)
    .fetch_one(conn)
    .await
}

// ── Reads ──

pub async fn find_by_bill_no(
    pool: &PgPool,
    restaurant_id: i64,
    bill_no: i64,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE restaurant_id = $1 AND bill_no = $2")
        .bind(restaurant_id)
        .bind(bill_no)
        .fetch_optional(pool)
        .await
}

pub async fn find_open_for_table(
    pool: &PgPool,
    restaurant_id: i64,
    table_number: &str,
    category_id: i64,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM orders
        WHERE restaurant_id = $1 AND table_number = $2 AND table_category_id = $3
          AND NOT is_paid
        ORDER BY order_date DESC
        LIMIT 1
        "#,
    )
    .bind(restaurant_id)
    .bind(table_number)
    .bind(category_id)
    .fetch_optional(pool)
    .await
}

pub async fn lines(pool: &PgPool, order_id: i64) -> Result<Vec<OrderLine>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_details WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(pool)
        .await
}

pub async fn lines_for_orders(
    pool: &PgPool,
    order_ids: &[i64],
) -> Result<Vec<OrderLine>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM order_details WHERE order_id = ANY($1) ORDER BY order_id, id")
        .bind(order_ids)
        .fetch_all(pool)
        .await
}

/// Orders newest first; the date range (local calendar days, inclusive) is optional.
pub async fn list(
    pool: &PgPool,
    restaurant_id: i64,
    range: Option<(NaiveDate, NaiveDate)>,
) -> Result<Vec<Order>, sqlx::Error> {
    let (start, end) = range.unzip();
    sqlx::query_as(
        r#"
        SELECT * FROM orders
        WHERE restaurant_id = $1
          AND ($2::date IS NULL OR order_date::date BETWEEN $2 AND $3)
        ORDER BY order_date DESC, id DESC
        "#,
    )
    .bind(restaurant_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await
}

pub async fn kitchen_rows(pool: &PgPool, restaurant_id: i64) -> Result<Vec<KitchenRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT
            o.id AS order_id, o.bill_no, o.table_number,
            c.name AS category_name, s.full_name AS waiter_name,
            o.order_date, o.status, o.accepted_at, o.served_at,
            d.item_name, d.quantity, d.quantity_served
        FROM orders o
        LEFT JOIN categories c ON c.id = o.table_category_id
        LEFT JOIN staff s ON s.id = o.staff_id
        LEFT JOIN order_details d ON d.order_id = o.id
        WHERE o.restaurant_id = $1 AND NOT o.is_paid
        ORDER BY o.order_date DESC, o.id DESC, d.id
        "#,
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await
}

pub async fn apply_edit(
    conn: &mut PgConnection,
    restaurant_id: i64,
    order_id: i64,
    edit: &OrderEdit,
) -> Result<Option<Order>, sqlx::Error> {
    let target = match edit.value {
        EditValue::Date(_) => "$1::date",
        _ => "$1",
    };
    // `column` comes from a fixed whitelist
    let sql = format!(
        "UPDATE orders SET {} = {target} WHERE id = $2 AND restaurant_id = $3 RETURNING *",
        edit.column
    );
    let query = sqlx::query_as::<_, Order>(&sql);
    let query = match &edit.value {
        EditValue::Text(v) => query.bind(v.clone()),
        EditValue::Amount(v) => query.bind(*v),
        EditValue::Date(v) => query.bind(*v),
        EditValue::Flag(v) => query.bind(*v),
    };
    query
        .bind(order_id)
        .bind(restaurant_id)
        .fetch_optional(conn)
        .await
}

pub async fn customers(pool: &PgPool, restaurant_id: i64) -> Result<Vec<Customer>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT DISTINCT customer_name, customer_phone, customer_email
        FROM orders
        WHERE restaurant_id = $1 AND customer_name IS NOT NULL AND customer_name <> ''
        ORDER BY customer_name
        "#,
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await
}
