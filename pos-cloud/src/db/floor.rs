//! Table categories, tables and waiter calls

use shared::models::{RestaurantTable, TableCategory, WaiterCall};
use sqlx::PgPool;

// ── Categories ──

pub async fn list_categories(
    pool: &PgPool,
    restaurant_id: i64,
) -> Result<Vec<TableCategory>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM categories WHERE restaurant_id = $1 ORDER BY name")
        .bind(restaurant_id)
        .fetch_all(pool)
        .await
}

pub async fn create_category(
    pool: &PgPool,
    restaurant_id: i64,
    name: &str,
) -> Result<TableCategory, sqlx::Error> {
    sqlx::query_as("INSERT INTO categories (restaurant_id, name) VALUES ($1, $2) RETURNING *")
        .bind(restaurant_id)
        .bind(name)
        .fetch_one(pool)
        .await
}

pub async fn rename_category(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
    name: &str,
) -> Result<Option<TableCategory>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE categories SET name = $1 WHERE id = $2 AND restaurant_id = $3 RETURNING *",
    )
    .bind(name)
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await
}

/// Detach the category's tables, then delete it. Returns false if unknown.
pub async fn delete_category(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE restauranttables SET category_id = NULL WHERE category_id = $1 AND restaurant_id = $2",
    )
    .bind(id)
    .bind(restaurant_id)
    .execute(&mut *tx)
    .await?;

    let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(false);
    }

    tx.commit().await?;
    Ok(true)
}

// ── Tables ──

const TABLE_SELECT: &str = r#"
    SELECT t.id, t.restaurant_id, t.table_number, t.category_id,
           c.name AS category_name, t.status
    FROM restauranttables t
    LEFT JOIN categories c ON c.id = t.category_id
"#;

pub async fn list_tables(
    pool: &PgPool,
    restaurant_id: i64,
) -> Result<Vec<RestaurantTable>, sqlx::Error> {
    let sql = format!(
        "{TABLE_SELECT} WHERE t.restaurant_id = $1 ORDER BY c.name NULLS LAST, t.table_number"
    );
    sqlx::query_as(&sql).bind(restaurant_id).fetch_all(pool).await
}

pub async fn find_table(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
) -> Result<Option<RestaurantTable>, sqlx::Error> {
    let sql = format!("{TABLE_SELECT} WHERE t.restaurant_id = $1 AND t.id = $2");
    sqlx::query_as(&sql)
        .bind(restaurant_id)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn category_belongs(
    pool: &PgPool,
    restaurant_id: i64,
    category_id: i64,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1 AND restaurant_id = $2)",
    )
    .bind(category_id)
    .bind(restaurant_id)
    .fetch_one(pool)
    .await
}

pub async fn create_table(
    pool: &PgPool,
    restaurant_id: i64,
    table_number: &str,
    category_id: Option<i64>,
    status: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO restauranttables (restaurant_id, table_number, category_id, status)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(restaurant_id)
    .bind(table_number)
    .bind(category_id)
    .bind(status)
    .fetch_one(pool)
    .await
}

/// Partial update; returns false if the table is unknown.
pub async fn update_table(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
    table_number: Option<&str>,
    category_id: Option<i64>,
    status: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE restauranttables SET
            table_number = COALESCE($1, table_number),
            category_id = COALESCE($2, category_id),
            status = COALESCE($3, status)
        WHERE id = $4 AND restaurant_id = $5
        "#,
    )
    .bind(table_number)
    .bind(category_id)
    .bind(status)
    .bind(id)
    .bind(restaurant_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_table(pool: &PgPool, restaurant_id: i64, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM restauranttables WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ── Waiter calls ──

pub async fn insert_waiter_call(
    pool: &PgPool,
    restaurant_id: i64,
    category_id: Option<i64>,
    table_id: &str,
    message: &str,
) -> Result<WaiterCall, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO waiter_calls (restaurant_id, category_id, table_id, message)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(restaurant_id)
    .bind(category_id)
    .bind(table_id)
    .bind(message)
    .fetch_one(pool)
    .await
}

pub async fn recent_waiter_calls(
    pool: &PgPool,
    restaurant_id: i64,
    limit: i64,
) -> Result<Vec<WaiterCall>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM waiter_calls WHERE restaurant_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2",
    )
    .bind(restaurant_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn delete_waiter_call(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM waiter_calls WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
