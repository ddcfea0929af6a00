//! Polls, feedback and valet tickets

use shared::models::{Feedback, PollOption, ValetInput, ValetTicket};
use sqlx::PgPool;

// ── Polls ──

#[derive(Debug, sqlx::FromRow)]
pub struct PollRow {
    pub id: i64,
    pub restaurant_id: i64,
    pub question: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Insert the question and its options together.
pub async fn create_poll(
    pool: &PgPool,
    restaurant_id: i64,
    question: &str,
    options: &[String],
) -> Result<(PollRow, Vec<PollOption>), sqlx::Error> {
    let mut tx = pool.begin().await?;

    let poll: PollRow = sqlx::query_as(
        "INSERT INTO polls (restaurant_id, question) VALUES ($1, $2) RETURNING *",
    )
    .bind(restaurant_id)
    .bind(question)
    .fetch_one(&mut *tx)
    .await?;

    let mut created = Vec::with_capacity(options.len());
    for text in options {
        let option: PollOption = sqlx::query_as(
            "INSERT INTO poll_options (poll_id, option_text) VALUES ($1, $2) RETURNING *",
        )
        .bind(poll.id)
        .bind(text)
        .fetch_one(&mut *tx)
        .await?;
        created.push(option);
    }

    tx.commit().await?;
    Ok((poll, created))
}

pub async fn list_polls(pool: &PgPool, restaurant_id: i64) -> Result<Vec<PollRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM polls WHERE restaurant_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(restaurant_id)
        .fetch_all(pool)
        .await
}

pub async fn options_for_polls(
    pool: &PgPool,
    poll_ids: &[i64],
) -> Result<Vec<PollOption>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM poll_options WHERE poll_id = ANY($1) ORDER BY poll_id, id")
        .bind(poll_ids)
        .fetch_all(pool)
        .await
}

pub async fn vote(
    pool: &PgPool,
    restaurant_id: i64,
    option_id: i64,
) -> Result<Option<PollOption>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE poll_options SET votes = votes + 1
        WHERE id = $1 AND poll_id IN (SELECT id FROM polls WHERE restaurant_id = $2)
        RETURNING *
        "#,
    )
    .bind(option_id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await
}

pub async fn delete_poll(pool: &PgPool, restaurant_id: i64, id: i64) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let owned: Option<i64> =
        sqlx::query_scalar("SELECT id FROM polls WHERE id = $1 AND restaurant_id = $2 FOR UPDATE")
            .bind(id)
            .bind(restaurant_id)
            .fetch_optional(&mut *tx)
            .await?;
    if owned.is_none() {
        return Ok(false);
    }

    sqlx::query("DELETE FROM poll_options WHERE poll_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM polls WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

// ── Feedback ──

pub async fn create_feedback(
    pool: &PgPool,
    restaurant_id: i64,
    customer_name: Option<&str>,
    email: Option<&str>,
    feedback_type: &str,
    message: &str,
    rating: Option<i32>,
) -> Result<Feedback, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO feedback (restaurant_id, customer_name, email, feedback_type, message, rating)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(restaurant_id)
    .bind(customer_name)
    .bind(email)
    .bind(feedback_type)
    .bind(message)
    .bind(rating)
    .fetch_one(pool)
    .await
}

pub async fn list_feedback(pool: &PgPool, restaurant_id: i64) -> Result<Vec<Feedback>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM feedback WHERE restaurant_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await
}

// ── Valet ──

pub async fn create_valet(
    pool: &PgPool,
    restaurant_id: i64,
    token_number: &str,
    owner_name: &str,
    car_number: &str,
    input: &ValetInput,
) -> Result<ValetTicket, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO valet_parking (
            restaurant_id, token_number, owner_name, phone_number, car_number, email, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 'With Us'))
        RETURNING *
        "#,
    )
    .bind(restaurant_id)
    .bind(token_number)
    .bind(owner_name)
    .bind(&input.phone_number)
    .bind(car_number)
    .bind(&input.email)
    .bind(&input.status)
    .fetch_one(pool)
    .await
}

pub async fn list_valet(pool: &PgPool, restaurant_id: i64) -> Result<Vec<ValetTicket>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM valet_parking WHERE restaurant_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await
}

pub async fn update_valet(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
    input: &ValetInput,
) -> Result<Option<ValetTicket>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE valet_parking SET
            token_number = COALESCE($1, token_number),
            owner_name = COALESCE($2, owner_name),
            phone_number = COALESCE($3, phone_number),
            car_number = COALESCE($4, car_number),
            email = COALESCE($5, email),
            status = COALESCE($6, status)
        WHERE id = $7 AND restaurant_id = $8
        RETURNING *
        "#,
    )
    .bind(&input.token_number)
    .bind(&input.owner_name)
    .bind(&input.phone_number)
    .bind(&input.car_number)
    .bind(&input.email)
    .bind(&input.status)
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await
}

pub async fn delete_valet(pool: &PgPool, restaurant_id: i64, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM valet_parking WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
