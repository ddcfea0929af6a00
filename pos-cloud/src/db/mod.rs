//! Database access layer

pub mod dashboard;
pub mod floor;
pub mod guest;
pub mod inventory;
pub mod menu;
pub mod orders;
pub mod restaurants;
pub mod staff;

/// Store round trip used by health checks
pub async fn now(pool: &sqlx::PgPool) -> Result<chrono::DateTime<chrono::Utc>, sqlx::Error> {
    sqlx::query_scalar("SELECT now()").fetch_one(pool).await
}
