//! Staff, attendance, payroll and tips

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Attendance, PayrollEntry, PayrollUpsert, Staff, StaffInput, Tip, TipUpsert};
use shared::tenant::{TenantQuery, lenient_string, parse_optional_id, parse_restaurant_id};

use crate::auth::check_new_password;
use crate::db::staff::{self as store, StaffFields};
use crate::error::{conflict_or_internal, internal};
use crate::state::AppState;
use crate::util::{hash_password, non_empty};

use super::{ApiResult, CreatedResult, PathId, created, parse_date};

const DEFAULT_PAYROLL_STATUS: &str = "Pending";

fn staff_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::StaffNotFound).with_detail("staffId", id)
}

fn attendance_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::AttendanceNotFound).with_detail("id", id)
}

/// Validated staff payload plus the optional new login password hash
struct StaffPayload {
    restaurant_id: i64,
    fields: StaffFields,
    password_hash: Option<String>,
}

fn staff_payload(input: &StaffInput) -> AppResult<StaffPayload> {
    let restaurant_id = parse_restaurant_id(input.restaurant_id.as_deref())?;
    let full_name = non_empty(input.full_name.as_deref()).ok_or_else(|| AppError::required("fullName"))?;
    let role = non_empty(input.role.as_deref()).ok_or_else(|| AppError::required("role"))?;
    let monthly_salary = input.monthly_salary.unwrap_or(Decimal::ZERO);
    if monthly_salary < Decimal::ZERO {
        return Err(AppError::new(ErrorCode::InvalidAmount).with_detail("field", "monthlySalary"));
    }
    let email = non_empty(input.email.as_deref()).map(str::to_lowercase);

    let password_hash = match input.password.as_deref().filter(|p| !p.is_empty()) {
        None => None,
        Some(password) => {
            if email.is_none() {
                return Err(AppError::required("email"));
            }
            check_new_password(password)?;
            Some(hash_password(password).map_err(internal)?)
        }
    };

    Ok(StaffPayload {
        restaurant_id,
        fields: StaffFields {
            full_name: full_name.to_owned(),
            role: role.to_owned(),
            phone: non_empty(input.phone.as_deref()).map(str::to_owned),
            email,
            monthly_salary,
            join_date: input.join_date,
            shift: non_empty(input.shift.as_deref()).map(str::to_owned),
        },
        password_hash,
    })
}

fn email_taken(e: sqlx::Error) -> AppError {
    conflict_or_internal(e, AppError::new(ErrorCode::StaffEmailExists))
}

// ── Staff ──

/// GET /api/staff
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> ApiResult<Vec<Staff>> {
    let restaurant_id = query.restaurant_id()?;
    let staff = store::list(&state.pool, restaurant_id)
        .await
        .map_err(internal)?;
    Ok(Json(staff))
}

/// POST /api/staff
///
/// Staff row and (with a password) its login are written together.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<StaffInput>,
) -> CreatedResult<Staff> {
    let payload = staff_payload(&input)?;

    let mut tx = state.pool.begin().await.map_err(internal)?;
    let staff = store::insert(&mut *tx, payload.restaurant_id, &payload.fields)
        .await
        .map_err(email_taken)?;
    if let Some(hash) = payload.password_hash.as_deref() {
        store::sync_credential(&mut *tx, payload.restaurant_id, &staff, Some(hash))
            .await
            .map_err(email_taken)?;
    }
    tx.commit().await.map_err(internal)?;

    tracing::info!(restaurant_id = payload.restaurant_id, staff_id = staff.id, "Staff created");
    Ok(created(staff))
}

/// PUT /api/staff/{id}
pub async fn update(
    State(state): State<AppState>,
    PathId(id): PathId,
    Json(input): Json<StaffInput>,
) -> ApiResult<Staff> {
    let payload = staff_payload(&input)?;

    let mut tx = state.pool.begin().await.map_err(internal)?;
    let staff = store::update(&mut *tx, payload.restaurant_id, id, &payload.fields)
        .await
        .map_err(email_taken)?
        .ok_or_else(|| staff_not_found(id))?;
    store::sync_credential(
        &mut *tx,
        payload.restaurant_id,
        &staff,
        payload.password_hash.as_deref(),
    )
    .await
    .map_err(email_taken)?;
    tx.commit().await.map_err(internal)?;

    Ok(Json(staff))
}

/// DELETE /api/staff/{id}
pub async fn remove(
    State(state): State<AppState>,
    PathId(id): PathId,
    Query(query): Query<TenantQuery>,
) -> Result<StatusCode, AppError> {
    let restaurant_id = query.restaurant_id()?;
    if !store::delete(&state.pool, restaurant_id, id)
        .await
        .map_err(internal)?
    {
        return Err(staff_not_found(id));
    }
    tracing::info!(restaurant_id, staff_id = id, "Staff removed");
    Ok(StatusCode::NO_CONTENT)
}

// ── Attendance ──

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub staff_id: Option<String>,
    #[serde(default)]
    pub shift: Option<String>,
}

/// POST /api/attendance
pub async fn check_in(
    State(state): State<AppState>,
    Json(req): Json<CheckInRequest>,
) -> CreatedResult<Attendance> {
    let restaurant_id = parse_restaurant_id(req.restaurant_id.as_deref())?;
    let staff_id = parse_optional_id("staffId", req.staff_id.as_deref())?
        .ok_or_else(|| AppError::required("staffId"))?;

    let attendance = store::check_in(
        &state.pool,
        restaurant_id,
        staff_id,
        non_empty(req.shift.as_deref()),
    )
    .await
    .map_err(internal)?
    .ok_or_else(|| staff_not_found(staff_id))?;
    Ok(created(attendance))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
}

/// PUT /api/attendance/{id}
pub async fn check_out(
    State(state): State<AppState>,
    PathId(id): PathId,
    Json(req): Json<CheckOutRequest>,
) -> ApiResult<Attendance> {
    let restaurant_id = parse_restaurant_id(req.restaurant_id.as_deref())?;
    if let Some(attendance) = store::check_out(&state.pool, restaurant_id, id)
        .await
        .map_err(internal)?
    {
        return Ok(Json(attendance));
    }

    // Nothing updated: either unknown or already checked out
    match store::find_attendance(&state.pool, restaurant_id, id)
        .await
        .map_err(internal)?
    {
        Some(_) => Err(AppError::new(ErrorCode::AlreadyCheckedOut).with_detail("id", id)),
        None => Err(attendance_not_found(id)),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceQuery {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    pub date: Option<String>,
}

/// GET /api/attendance
pub async fn attendance_on(
    State(state): State<AppState>,
    Query(query): Query<AttendanceQuery>,
) -> ApiResult<Vec<Attendance>> {
    let restaurant_id = parse_restaurant_id(query.restaurant_id.as_deref())?;
    let date = parse_date("date", query.date.as_deref())?.unwrap_or_else(|| state.today());
    let records = store::attendance_on(&state.pool, restaurant_id, date)
        .await
        .map_err(internal)?;
    Ok(Json(records))
}

/// DELETE /api/attendance/{id}
pub async fn delete_attendance(
    State(state): State<AppState>,
    PathId(id): PathId,
    Query(query): Query<TenantQuery>,
) -> Result<StatusCode, AppError> {
    let restaurant_id = query.restaurant_id()?;
    if !store::delete_attendance(&state.pool, restaurant_id, id)
        .await
        .map_err(internal)?
    {
        return Err(attendance_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ── Payroll ──

/// First day of a `YYYY-MM` month and the number of days in it.
fn parse_month(raw: Option<&str>) -> AppResult<(NaiveDate, i64)> {
    let raw = non_empty(raw).ok_or_else(|| AppError::required("month"))?;
    let invalid = || {
        AppError::validation("month must be formatted YYYY-MM").with_detail("month", raw)
    };
    let start = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d").map_err(|_| invalid())?;
    let next = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
    }
    .ok_or_else(invalid)?;
    Ok((start, (next - start).num_days()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollQuery {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    pub month: Option<String>,
}

/// GET /api/payroll
pub async fn payroll(
    State(state): State<AppState>,
    Query(query): Query<PayrollQuery>,
) -> ApiResult<Vec<PayrollEntry>> {
    let restaurant_id = parse_restaurant_id(query.restaurant_id.as_deref())?;
    let (month_start, days) = parse_month(query.month.as_deref())?;
    let entries = store::payroll(&state.pool, restaurant_id, month_start, days)
        .await
        .map_err(internal)?;
    Ok(Json(entries))
}

#[derive(Debug, Serialize)]
pub struct SavedResponse {
    pub message: &'static str,
}

/// POST /api/payroll
pub async fn upsert_payroll(
    State(state): State<AppState>,
    Json(req): Json<PayrollUpsert>,
) -> ApiResult<SavedResponse> {
    let restaurant_id = parse_restaurant_id(req.restaurant_id.as_deref())?;
    let (month_start, _) = parse_month(Some(&req.month))?;
    let bonus = req.bonus.unwrap_or(Decimal::ZERO);
    let already_paid = req.already_paid.unwrap_or(Decimal::ZERO);
    if bonus < Decimal::ZERO || already_paid < Decimal::ZERO {
        return Err(AppError::new(ErrorCode::InvalidAmount));
    }
    let status = non_empty(req.status.as_deref()).unwrap_or(DEFAULT_PAYROLL_STATUS);

    let saved = store::upsert_payroll(
        &state.pool,
        restaurant_id,
        req.staff_id,
        month_start,
        bonus,
        already_paid,
        status,
    )
    .await
    .map_err(internal)?;
    if !saved {
        return Err(staff_not_found(req.staff_id));
    }
    Ok(Json(SavedResponse {
        message: "Payroll saved",
    }))
}

// ── Tips ──

/// POST /api/tips
pub async fn upsert_tip(
    State(state): State<AppState>,
    Json(req): Json<TipUpsert>,
) -> ApiResult<Tip> {
    let restaurant_id = parse_restaurant_id(req.restaurant_id.as_deref())?;
    if req.amount < Decimal::ZERO {
        return Err(AppError::new(ErrorCode::InvalidAmount).with_detail("field", "amount"));
    }
    store::upsert_tip(&state.pool, restaurant_id, req.order_id, req.staff_id, req.amount)
        .await
        .map_err(|e| {
            if crate::error::is_foreign_key_violation(&e) {
                staff_not_found(req.staff_id.unwrap_or_default())
            } else {
                internal(e)
            }
        })?
        .map(Json)
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound).with_detail("orderId", req.order_id))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipQuery {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub order_id: Option<String>,
}

/// A stored tip, or a zero amount for orders without one
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TipView {
    Found(Tip),
    None { amount: Decimal },
}

/// GET /api/tips
pub async fn find_tip(
    State(state): State<AppState>,
    Query(query): Query<TipQuery>,
) -> ApiResult<TipView> {
    let restaurant_id = parse_restaurant_id(query.restaurant_id.as_deref())?;
    let order_id = parse_optional_id("orderId", query.order_id.as_deref())?
        .ok_or_else(|| AppError::required("orderId"))?;
    let tip = store::find_tip(&state.pool, restaurant_id, order_id)
        .await
        .map_err(internal)?;
    Ok(Json(match tip {
        Some(tip) => TipView::Found(tip),
        None => TipView::None {
            amount: Decimal::ZERO,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn months() {
        let (start, days) = parse_month(Some("2025-02")).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(days, 28);
        assert_eq!(parse_month(Some("2024-02")).unwrap().1, 29);
        assert_eq!(parse_month(Some("2025-12")).unwrap().1, 31);

        assert_eq!(parse_month(None).unwrap_err().code, ErrorCode::RequiredField);
        assert!(parse_month(Some("2025-13")).is_err());
        assert!(parse_month(Some("July")).is_err());
    }

    #[test]
    fn staff_payload_rules() {
        let input: StaffInput = serde_json::from_value(serde_json::json!({
            "restaurantId": "1", "fullName": "Ravi", "role": "waiter",
            "email": " Ravi@Spice.Example ", "monthlySalary": 15000
        }))
        .unwrap();
        let payload = staff_payload(&input).unwrap();
        assert_eq!(payload.fields.email.as_deref(), Some("ravi@spice.example"));
        assert!(payload.password_hash.is_none());

        let no_email: StaffInput = serde_json::from_value(serde_json::json!({
            "restaurantId": 1, "fullName": "Ravi", "role": "waiter", "password": "secret1"
        }))
        .unwrap();
        assert_eq!(staff_payload(&no_email).err().unwrap().code, ErrorCode::RequiredField);

        let short: StaffInput = serde_json::from_value(serde_json::json!({
            "restaurantId": 1, "fullName": "Ravi", "role": "waiter",
            "email": "r@s.example", "password": "abc"
        }))
        .unwrap();
        assert_eq!(staff_payload(&short).err().unwrap().code, ErrorCode::PasswordTooShort);
    }

    #[test]
    fn missing_tip_reads_as_zero() {
        let json = serde_json::to_value(TipView::None {
            amount: Decimal::ZERO,
        })
        .unwrap();
        assert_eq!(json["amount"].as_f64(), Some(0.0));
        assert_eq!(json.as_object().unwrap().len(), 1);
    }
}
