//! Staff, attendance, payroll and tips

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::models::{Attendance, PayrollEntry, Staff, Tip};
use sqlx::{PgConnection, PgPool};

/// Validated staff fields
#[derive(Debug, Clone)]
pub struct StaffFields {
    pub full_name: String,
    pub role: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub monthly_salary: Decimal,
    pub join_date: Option<NaiveDate>,
    pub shift: Option<String>,
}

pub async fn list(pool: &PgPool, restaurant_id: i64) -> Result<Vec<Staff>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM staff WHERE restaurant_id = $1 ORDER BY full_name")
        .bind(restaurant_id)
        .fetch_all(pool)
        .await
}

pub async fn insert(
    conn: &mut PgConnection,
    restaurant_id: i64,
    staff: &StaffFields,
) -> Result<Staff, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO staff (restaurant_id, full_name, role, phone, email, monthly_salary, join_date, shift)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(restaurant_id)
    .bind(&staff.full_name)
    .bind(&staff.role)
    .bind(&staff.phone)
    .bind(&staff.email)
    .bind(staff.monthly_salary)
    .bind(staff.join_date)
    .bind(&staff.shift)
    .fetch_one(conn)
    .await
}

pub async fn update(
    conn: &mut PgConnection,
    restaurant_id: i64,
    id: i64,
    staff: &StaffFields,
) -> Result<Option<Staff>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE staff SET
            full_name = $1, role = $2, phone = $3, email = $4,
            monthly_salary = $5, join_date = $6, shift = $7
        WHERE id = $8 AND restaurant_id = $9
        RETURNING *
        "#,
    )
    .bind(&staff.full_name)
    .bind(&staff.role)
    .bind(&staff.phone)
    .bind(&staff.email)
    .bind(staff.monthly_salary)
    .bind(staff.join_date)
    .bind(&staff.shift)
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(conn)
    .await
}

/// Keep the staff login in step with the staff row.
///
/// Updates email and role (and the hash when given); creates the login when
/// none exists and a hash is given. Returns false when nothing was stored.
pub async fn sync_credential(
    conn: &mut PgConnection,
    restaurant_id: i64,
    staff: &Staff,
    password_hash: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let updated = sqlx::query(
        r#"
        UPDATE usercredentials SET
            email = COALESCE(lower($1), email),
            role = $2,
            password_hash = COALESCE($3, password_hash)
        WHERE staff_id = $4 AND restaurant_id = $5
        "#,
    )
    .bind(&staff.email)
    .bind(&staff.role)
    .bind(password_hash)
    .bind(staff.id)
    .bind(restaurant_id)
    .execute(&mut *conn)
    .await?
    .rows_affected();
    if updated > 0 {
        return Ok(true);
    }

    match (password_hash, staff.email.as_deref()) {
        (Some(hash), Some(email)) => {
            super::restaurants::insert_credential(
                conn,
                restaurant_id,
                Some(staff.id),
                email,
                hash,
                &staff.role,
            )
            .await?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Remove a staff member with attendance and login; tips stay, unassigned.
pub async fn delete(pool: &PgPool, restaurant_id: i64, id: i64) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let owned: Option<i64> =
        sqlx::query_scalar("SELECT id FROM staff WHERE id = $1 AND restaurant_id = $2 FOR UPDATE")
            .bind(id)
            .bind(restaurant_id)
            .fetch_optional(&mut *tx)
            .await?;
    if owned.is_none() {
        return Ok(false);
    }

    sqlx::query("DELETE FROM attendance WHERE staff_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE tips SET staff_id = NULL WHERE staff_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("UPDATE orders SET staff_id = NULL WHERE staff_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM usercredentials WHERE staff_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM staff WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

// ── Attendance ──

const ATTENDANCE_COLUMNS: &str = r#"
    a.id, a.staff_id, s.full_name AS staff_name, a.attendance_date, a.shift,
    a.check_in, a.check_out, a.shift_duration_secs
"#;

/// Check a tenant's staff member in now; `None` when the staff member is not theirs.
pub async fn check_in(
    pool: &PgPool,
    restaurant_id: i64,
    staff_id: i64,
    shift: Option<&str>,
) -> Result<Option<Attendance>, sqlx::Error> {
    let sql = format!(
        r#"
        WITH a AS (
            INSERT INTO attendance (staff_id, shift)
            SELECT id, COALESCE($3, shift) FROM staff WHERE id = $1 AND restaurant_id = $2
            RETURNING *
        )
        SELECT {ATTENDANCE_COLUMNS} FROM a JOIN staff s ON s.id = a.staff_id
        "#
    );
    sqlx::query_as(&sql)
        .bind(staff_id)
        .bind(restaurant_id)
        .bind(shift)
        .fetch_optional(pool)
        .await
}

pub async fn find_attendance(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
) -> Result<Option<Attendance>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {ATTENDANCE_COLUMNS}
        FROM attendance a JOIN staff s ON s.id = a.staff_id
        WHERE a.id = $1 AND s.restaurant_id = $2
        "#
    );
    sqlx::query_as(&sql)
        .bind(id)
        .bind(restaurant_id)
        .fetch_optional(pool)
        .await
}

/// Stamp check-out and the shift length; `None` if already checked out.
pub async fn check_out(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
) -> Result<Option<Attendance>, sqlx::Error> {
    let sql = format!(
        r#"
        WITH a AS (
            UPDATE attendance SET
                check_out = now(),
                shift_duration_secs = EXTRACT(EPOCH FROM (now() - check_in))::BIGINT
            WHERE id = $1 AND check_out IS NULL
              AND staff_id IN (SELECT id FROM staff WHERE restaurant_id = $2)
            RETURNING *
        )
        SELECT {ATTENDANCE_COLUMNS} FROM a JOIN staff s ON s.id = a.staff_id
        "#
    );
    sqlx::query_as(&sql)
        .bind(id)
        .bind(restaurant_id)
        .fetch_optional(pool)
        .await
}

pub async fn attendance_on(
    pool: &PgPool,
    restaurant_id: i64,
    date: NaiveDate,
) -> Result<Vec<Attendance>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {ATTENDANCE_COLUMNS}
        FROM attendance a JOIN staff s ON s.id = a.staff_id
        WHERE s.restaurant_id = $1 AND a.attendance_date = $2
        ORDER BY a.check_in
        "#
    );
    sqlx::query_as(&sql)
        .bind(restaurant_id)
        .bind(date)
        .fetch_all(pool)
        .await
}

pub async fn delete_attendance(
    pool: &PgPool,
    restaurant_id: i64,
    id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM attendance
        WHERE id = $1 AND staff_id IN (SELECT id FROM staff WHERE restaurant_id = $2)
        "#,
    )
    .bind(id)
    .bind(restaurant_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

// ── Payroll ──

/// Every staff member with the month's attendance and stored payroll values.
pub async fn payroll(
    pool: &PgPool,
    restaurant_id: i64,
    month_start: NaiveDate,
    days_in_month: i64,
) -> Result<Vec<PayrollEntry>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT
            s.id AS staff_id, s.full_name, s.role, s.monthly_salary,
            COALESCE(a.present_days, 0) AS present_days,
            GREATEST($3 - COALESCE(a.present_days, 0), 0) AS absent_days,
            COALESCE(p.bonus, 0) AS bonus,
            COALESCE(p.already_paid, 0) AS already_paid,
            COALESCE(p.status, 'Pending') AS status
        FROM staff s
        LEFT JOIN (
            SELECT staff_id, COUNT(DISTINCT attendance_date) AS present_days
            FROM attendance
            WHERE attendance_date >= $2
              AND attendance_date < ($2 + INTERVAL '1 month')::date
            GROUP BY staff_id
        ) a ON a.staff_id = s.id
        LEFT JOIN payroll p ON p.staff_id = s.id AND p.payroll_month = $2
        WHERE s.restaurant_id = $1
        ORDER BY s.full_name
        "#,
    )
    .bind(restaurant_id)
    .bind(month_start)
    .bind(days_in_month)
    .fetch_all(pool)
    .await
}

/// Upsert a payroll record; `false` when the staff member is not the tenant's.
pub async fn upsert_payroll(
    pool: &PgPool,
    restaurant_id: i64,
    staff_id: i64,
    month_start: NaiveDate,
    bonus: Decimal,
    already_paid: Decimal,
    status: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO payroll (restaurant_id, staff_id, payroll_month, bonus, already_paid, status)
        SELECT $1, id, $3, $4, $5, $6 FROM staff WHERE id = $2 AND restaurant_id = $1
        ON CONFLICT (staff_id, payroll_month) DO UPDATE SET
            bonus = EXCLUDED.bonus,
            already_paid = EXCLUDED.already_paid,
            status = EXCLUDED.status
        "#,
    )
    .bind(restaurant_id)
    .bind(staff_id)
    .bind(month_start)
    .bind(bonus)
    .bind(already_paid)
    .bind(status)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

// ── Tips ──

/// One tip per order; `None` when the order is not the tenant's.
pub async fn upsert_tip(
    pool: &PgPool,
    restaurant_id: i64,
    order_id: i64,
    staff_id: Option<i64>,
    amount: Decimal,
) -> Result<Option<Tip>, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO tips (restaurant_id, order_id, staff_id, amount)
        SELECT $1, id, $3, $4 FROM orders WHERE id = $2 AND restaurant_id = $1
        ON CONFLICT (order_id) DO UPDATE SET
            staff_id = EXCLUDED.staff_id,
            amount = EXCLUDED.amount
        RETURNING *
        "#,
    )
    .bind(restaurant_id)
    .bind(order_id)
    .bind(staff_id)
    .bind(amount)
    .fetch_optional(pool)
    .await
}

pub async fn find_tip(
    pool: &PgPool,
    restaurant_id: i64,
    order_id: i64,
) -> Result<Option<Tip>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM tips WHERE restaurant_id = $1 AND order_id = $2")
        .bind(restaurant_id)
        .bind(order_id)
        .fetch_optional(pool)
        .await
}
