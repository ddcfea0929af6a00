//! Restaurant (tenant) rows and their logins

use chrono::{DateTime, Utc};
use shared::models::{Restaurant, RestaurantCreate, RestaurantStatus, RestaurantUpdate, UserCredential};
use sqlx::{PgConnection, PgPool};

pub async fn list(pool: &PgPool) -> Result<Vec<Restaurant>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM restaurants ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Restaurant>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM restaurants WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM restaurants WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn insert(
    conn: &mut PgConnection,
    data: &RestaurantCreate,
) -> Result<Restaurant, sqlx::Error> {
    let status = data.status.unwrap_or(RestaurantStatus::Active);
    sqlx::query_as(
        r#"
        INSERT INTO restaurants (id, name, admin_email, start_date, expiry_date, status, plan)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(data.id)
    .bind(data.name.trim())
    .bind(data.admin_email.trim().to_lowercase())
    .bind(data.start_date)
    .bind(data.expiry_date)
    .bind(status.as_str())
    .bind(&data.plan)
    .fetch_one(conn)
    .await
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &RestaurantUpdate,
) -> Result<Option<Restaurant>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE restaurants SET
            name = $1, admin_email = $2, start_date = $3, expiry_date = $4,
            status = $5, plan = $6
        WHERE id = $7
        RETURNING *
        "#,
    )
    .bind(data.name.trim())
    .bind(data.admin_email.trim().to_lowercase())
    .bind(data.start_date)
    .bind(data.expiry_date)
    .bind(data.status.as_str())
    .bind(&data.plan)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn set_status(pool: &PgPool, id: i64, status: RestaurantStatus) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE restaurants SET status = $1 WHERE id = $2")
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_gst_number(
    pool: &PgPool,
    id: i64,
    gst_number: &str,
) -> Result<Option<Restaurant>, sqlx::Error> {
    sqlx::query_as("UPDATE restaurants SET gst_number = $1 WHERE id = $2 RETURNING *")
        .bind(gst_number)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM restaurants WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ── Credentials ──

pub async fn insert_credential(
    conn: &mut PgConnection,
    restaurant_id: i64,
    staff_id: Option<i64>,
    email: &str,
    password_hash: &str,
    role: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO usercredentials (restaurant_id, staff_id, email, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(restaurant_id)
    .bind(staff_id)
    .bind(email.trim().to_lowercase())
    .bind(password_hash)
    .bind(role)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn find_credential(
    pool: &PgPool,
    restaurant_id: i64,
    email: &str,
) -> Result<Option<UserCredential>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT id, restaurant_id, email, password_hash, role, staff_id
        FROM usercredentials
        WHERE restaurant_id = $1 AND lower(email) = lower($2)
        "#,
    )
    .bind(restaurant_id)
    .bind(email.trim())
    .fetch_optional(pool)
    .await
}

pub async fn credential_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM usercredentials WHERE lower(email) = lower($1))")
        .bind(email.trim())
        .fetch_one(pool)
        .await
}

/// Returns false when no credential has that email.
pub async fn update_password(
    conn: &mut PgConnection,
    email: &str,
    password_hash: &str,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE usercredentials SET password_hash = $1 WHERE lower(email) = lower($2)")
            .bind(password_hash)
            .bind(email.trim())
            .execute(conn)
            .await?;
    Ok(result.rows_affected() > 0)
}

// ── Password reset codes ──

#[derive(Debug, sqlx::FromRow)]
pub struct ResetCode {
    pub email: String,
    pub code_hash: String,
    pub attempts: i32,
    pub expires_at: DateTime<Utc>,
}

pub async fn upsert_reset_code(
    pool: &PgPool,
    email: &str,
    code_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO password_reset_codes (email, code_hash, attempts, expires_at, created_at)
        VALUES ($1, $2, 0, $3, now())
        ON CONFLICT (email) DO UPDATE SET
            code_hash = EXCLUDED.code_hash, attempts = 0,
            expires_at = EXCLUDED.expires_at, created_at = now()
        "#,
    )
    .bind(email)
    .bind(code_hash)
    .bind(expires_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_reset_code(pool: &PgPool, email: &str) -> Result<Option<ResetCode>, sqlx::Error> {
    sqlx::query_as(
        "SELECT email, code_hash, attempts, expires_at FROM password_reset_codes WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn increment_reset_attempts(pool: &PgPool, email: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE password_reset_codes SET attempts = attempts + 1 WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete_reset_code<'e, E>(executor: E, email: &str) -> Result<(), sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query("DELETE FROM password_reset_codes WHERE email = $1")
        .bind(email)
        .execute(executor)
        .await?;
    Ok(())
}

/// Returns the number of purged codes.
pub async fn purge_expired_reset_codes(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM password_reset_codes WHERE expires_at < now()")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
