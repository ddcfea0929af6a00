//! Dashboard aggregates
//!
//! Every query takes the tenant and an inclusive local-date range; dates are
//! cast in the session time zone. Only paid orders count as sales.

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::dashboard::{
    CustomerTypes, DailySalesExpenses, DailyValue, DateRange, HourCount, Kpis, NamedAmount,
    NamedCount, NamedQuantity, StaffAttendance, StockLevel,
};

const TOP_N: i64 = 5;

pub async fn kpis(pool: &PgPool, restaurant_id: i64, range: DateRange) -> Result<Kpis, sqlx::Error> {
    let (total_sales, order_count): (Decimal, i64) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(total_amount), 0), COUNT(*)
        FROM orders
        WHERE restaurant_id = $1 AND is_paid AND order_date::date BETWEEN $2 AND $3
        "#,
    )
    .bind(restaurant_id)
    .bind(range.start)
    .bind(range.end)
    .fetch_one(pool)
    .await?;

    let total_expenses: Decimal = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(amount), 0) FROM expenses
        WHERE restaurant_id = $1 AND expense_date BETWEEN $2 AND $3
        "#,
    )
    .bind(restaurant_id)
    .bind(range.start)
    .bind(range.end)
    .fetch_one(pool)
    .await?;

    let customers = customer_types(pool, restaurant_id, range).await?;
    Ok(Kpis::from_totals(
        total_sales,
        order_count,
        total_expenses,
        customers.new_customers,
    ))
}

pub async fn sales_vs_expenses(
    pool: &PgPool,
    restaurant_id: i64,
    range: DateRange,
) -> Result<Vec<DailySalesExpenses>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT
            d::date AS date,
            COALESCE((
                SELECT SUM(total_amount) FROM orders
                WHERE restaurant_id = $1 AND is_paid AND order_date::date = d::date
            ), 0) AS sales,
            COALESCE((
                SELECT SUM(amount) FROM expenses
                WHERE restaurant_id = $1 AND expense_date = d::date
            ), 0) AS expenses
        FROM generate_series($2::date, $3::date, INTERVAL '1 day') AS d
        ORDER BY d
        "#,
    )
    .bind(restaurant_id)
    .bind(range.start)
    .bind(range.end)
    .fetch_all(pool)
    .await
}

pub async fn top_dishes(
    pool: &PgPool,
    restaurant_id: i64,
    range: DateRange,
) -> Result<Vec<NamedQuantity>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT d.item_name AS name, SUM(d.quantity)::BIGINT AS quantity
        FROM order_details d
        JOIN orders o ON o.id = d.order_id
        WHERE o.restaurant_id = $1 AND o.is_paid AND o.order_date::date BETWEEN $2 AND $3
        GROUP BY d.item_name
        ORDER BY quantity DESC, name
        LIMIT $4
        "#,
    )
    .bind(restaurant_id)
    .bind(range.start)
    .bind(range.end)
    .bind(TOP_N)
    .fetch_all(pool)
    .await
}

pub async fn staff_attendance(
    pool: &PgPool,
    restaurant_id: i64,
    range: DateRange,
) -> Result<StaffAttendance, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(DISTINCT a.staff_id)
             FROM attendance a JOIN staff s ON s.id = a.staff_id
             WHERE s.restaurant_id = $1 AND a.attendance_date BETWEEN $2 AND $3) AS present,
            (SELECT COUNT(*) FROM staff WHERE restaurant_id = $1) AS total
        "#,
    )
    .bind(restaurant_id)
    .bind(range.start)
    .bind(range.end)
    .fetch_one(pool)
    .await
}

pub async fn peak_order_times(
    pool: &PgPool,
    restaurant_id: i64,
    range: DateRange,
) -> Result<Vec<HourCount>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT EXTRACT(HOUR FROM order_date)::INT AS hour, COUNT(*) AS orders
        FROM orders
        WHERE restaurant_id = $1 AND order_date::date BETWEEN $2 AND $3
        GROUP BY hour
        ORDER BY hour
        "#,
    )
    .bind(restaurant_id)
    .bind(range.start)
    .bind(range.end)
    .fetch_all(pool)
    .await
}

/// Customers (by phone) ordering in the range: first order inside it means new.
pub async fn customer_types(
    pool: &PgPool,
    restaurant_id: i64,
    range: DateRange,
) -> Result<CustomerTypes, sqlx::Error> {
    sqlx::query_as(
        r#"
        WITH in_range AS (
            SELECT DISTINCT customer_phone FROM orders
            WHERE restaurant_id = $1 AND customer_phone IS NOT NULL AND customer_phone <> ''
              AND order_date::date BETWEEN $2 AND $3
        ),
        first_seen AS (
            SELECT customer_phone, MIN(order_date::date) AS first_day
            FROM orders
            WHERE restaurant_id = $1 AND customer_phone IN (SELECT customer_phone FROM in_range)
            GROUP BY customer_phone
        )
        SELECT
            COUNT(*) FILTER (WHERE first_day >= $2) AS new_customers,
            COUNT(*) FILTER (WHERE first_day < $2) AS returning_customers
        FROM first_seen
        "#,
    )
    .bind(restaurant_id)
    .bind(range.start)
    .bind(range.end)
    .fetch_one(pool)
    .await
}

pub async fn average_order_value(
    pool: &PgPool,
    restaurant_id: i64,
    range: DateRange,
) -> Result<Vec<DailyValue>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT d::date AS date, COALESCE(ROUND(AVG(o.total_amount), 2), 0) AS value
        FROM generate_series($2::date, $3::date, INTERVAL '1 day') AS d
        LEFT JOIN orders o
            ON o.restaurant_id = $1 AND o.is_paid AND o.order_date::date = d::date
        GROUP BY d
        ORDER BY d
        "#,
    )
    .bind(restaurant_id)
    .bind(range.start)
    .bind(range.end)
    .fetch_all(pool)
    .await
}

pub async fn top_spenders(
    pool: &PgPool,
    restaurant_id: i64,
    range: DateRange,
) -> Result<Vec<NamedAmount>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT customer_name AS name, SUM(total_amount) AS amount
        FROM orders
        WHERE restaurant_id = $1 AND is_paid AND order_date::date BETWEEN $2 AND $3
          AND customer_name IS NOT NULL AND customer_name <> ''
        GROUP BY customer_name, customer_phone
        ORDER BY amount DESC, name
        LIMIT $4
        "#,
    )
    .bind(restaurant_id)
    .bind(range.start)
    .bind(range.end)
    .bind(TOP_N)
    .fetch_all(pool)
    .await
}

pub async fn popular_categories(
    pool: &PgPool,
    restaurant_id: i64,
    range: DateRange,
) -> Result<Vec<NamedQuantity>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT COALESCE(m.category, 'Uncategorized') AS name, SUM(d.quantity)::BIGINT AS quantity
        FROM order_details d
        JOIN orders o ON o.id = d.order_id
        LEFT JOIN menuitems m ON m.id = d.menu_item_id AND m.restaurant_id = o.restaurant_id
        WHERE o.restaurant_id = $1 AND o.is_paid AND o.order_date::date BETWEEN $2 AND $3
        GROUP BY 1
        ORDER BY quantity DESC, name
        "#,
    )
    .bind(restaurant_id)
    .bind(range.start)
    .bind(range.end)
    .fetch_all(pool)
    .await
}

pub async fn most_tipped_staff(
    pool: &PgPool,
    restaurant_id: i64,
    range: DateRange,
) -> Result<Vec<NamedAmount>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT s.full_name AS name, SUM(t.amount) AS amount
        FROM tips t
        JOIN staff s ON s.id = t.staff_id
        WHERE t.restaurant_id = $1 AND t.tip_date BETWEEN $2 AND $3
        GROUP BY s.id, s.full_name
        ORDER BY amount DESC, name
        LIMIT $4
        "#,
    )
    .bind(restaurant_id)
    .bind(range.start)
    .bind(range.end)
    .bind(TOP_N)
    .fetch_all(pool)
    .await
}

pub async fn inventory_levels(
    pool: &PgPool,
    restaurant_id: i64,
) -> Result<Vec<StockLevel>, sqlx::Error> {
    sqlx::query_as(
        "SELECT item, quantity, threshold, unit FROM inventory WHERE restaurant_id = $1 ORDER BY item",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await
}

pub async fn low_stock_alerts(
    pool: &PgPool,
    restaurant_id: i64,
) -> Result<Vec<StockLevel>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT item, quantity, threshold, unit FROM inventory
        WHERE restaurant_id = $1 AND quantity <= threshold
        ORDER BY quantity - threshold, item
        "#,
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await
}

pub async fn feedback_sentiment(
    pool: &PgPool,
    restaurant_id: i64,
    range: DateRange,
) -> Result<Vec<NamedCount>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT feedback_type AS name, COUNT(*) AS count
        FROM feedback
        WHERE restaurant_id = $1 AND created_at::date BETWEEN $2 AND $3
        GROUP BY feedback_type
        ORDER BY count DESC, name
        "#,
    )
    .bind(restaurant_id)
    .bind(range.start)
    .bind(range.end)
    .fetch_all(pool)
    .await
}

pub async fn revenue_by_source(
    pool: &PgPool,
    restaurant_id: i64,
    range: DateRange,
) -> Result<Vec<NamedAmount>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT delivery_type AS name, SUM(total_amount) AS amount
        FROM orders
        WHERE restaurant_id = $1 AND is_paid AND order_date::date BETWEEN $2 AND $3
        GROUP BY delivery_type
        ORDER BY amount DESC, name
        "#,
    )
    .bind(restaurant_id)
    .bind(range.start)
    .bind(range.end)
    .fetch_all(pool)
    .await
}

pub async fn order_status_funnel(
    pool: &PgPool,
    restaurant_id: i64,
    range: DateRange,
) -> Result<Vec<NamedCount>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT status AS name, COUNT(*) AS count
        FROM orders
        WHERE restaurant_id = $1 AND order_date::date BETWEEN $2 AND $3
        GROUP BY status
        ORDER BY count DESC, name
        "#,
    )
    .bind(restaurant_id)
    .bind(range.start)
    .bind(range.end)
    .fetch_all(pool)
    .await
}
