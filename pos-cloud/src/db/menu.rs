//! Menu items

use rust_decimal::Decimal;
use shared::models::{MenuItem, UNCATEGORIZED};
use sqlx::PgPool;

/// Validated menu item fields
#[derive(Debug, Clone)]
pub struct MenuItemFields {
    pub menu_id: String,
    pub item_name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: String,
    pub ingredients: Option<String>,
    pub image: Option<String>,
    pub is_available: bool,
}

/// Items sorted by category then name; unavailable ones only with `show_all`.
pub async fn list(
    pool: &PgPool,
    restaurant_id: i64,
    show_all: bool,
) -> Result<Vec<MenuItem>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT * FROM menuitems
        WHERE restaurant_id = $1 AND ($2 OR is_available)
        ORDER BY category, item_name
        "#,
    )
    .bind(restaurant_id)
    .bind(show_all)
    .fetch_all(pool)
    .await
}

pub async fn create(
    pool: &PgPool,
    restaurant_id: i64,
    item: &MenuItemFields,
) -> Result<MenuItem, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO menuitems (
            restaurant_id, menu_id, item_name, description, price,
            category, ingredients, image, is_available
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(restaurant_id)
    .bind(&item.menu_id)
    .bind(&item.item_name)
    .bind(&item.description)
    .bind(item.price)
    .bind(&item.category)
    .bind(&item.ingredients)
    .bind(&item.image)
    .bind(item.is_available)
    .fetch_one(pool)
    .await
}

pub async fn replace(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
    item: &MenuItemFields,
) -> Result<Option<MenuItem>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE menuitems SET
            menu_id = $1, item_name = $2, description = $3, price = $4,
            category = $5, ingredients = $6, image = $7, is_available = $8
        WHERE id = $9 AND restaurant_id = $10
        RETURNING *
        "#,
    )
    .bind(&item.menu_id)
    .bind(&item.item_name)
    .bind(&item.description)
    .bind(item.price)
    .bind(&item.category)
    .bind(&item.ingredients)
    .bind(&item.image)
    .bind(item.is_available)
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await
}

pub async fn toggle_availability(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
) -> Result<Option<MenuItem>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE menuitems SET is_available = NOT is_available
        WHERE id = $1 AND restaurant_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await
}

/// Soft delete: the item stays for order history but is hidden from the menu.
pub async fn retire(pool: &PgPool, restaurant_id: i64, id: i64) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE menuitems SET is_available = FALSE WHERE id = $1 AND restaurant_id = $2")
            .bind(id)
            .bind(restaurant_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn categories(pool: &PgPool, restaurant_id: i64) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT DISTINCT category FROM menuitems WHERE restaurant_id = $1 ORDER BY category",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await
}

/// Move a category's items to `Uncategorized`; returns how many moved.
pub async fn dissolve_category(
    pool: &PgPool,
    restaurant_id: i64,
    category: &str,
) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("UPDATE menuitems SET category = $1 WHERE restaurant_id = $2 AND category = $3")
            .bind(UNCATEGORIZED)
            .bind(restaurant_id)
            .bind(category)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}
