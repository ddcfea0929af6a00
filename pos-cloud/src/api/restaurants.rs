//! Restaurant (tenant) administration

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Restaurant, RestaurantCreate, RestaurantUpdate};

use crate::auth::check_new_password;
use crate::db::restaurants as store;
use crate::error::{conflict_or_internal, internal};
use crate::state::AppState;
use crate::util::hash_password;

use super::{ApiResult, CreatedResult, PathId, created};

const ADMIN_ROLE: &str = "admin";

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::RestaurantNotFound).with_detail("restaurantId", id)
}

fn check_fields(name: &str, admin_email: &str, start: chrono::NaiveDate, expiry: chrono::NaiveDate) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::required("name"));
    }
    if !admin_email.contains('@') {
        return Err(AppError::validation("adminEmail must be an email address")
            .with_detail("field", "adminEmail"));
    }
    if expiry < start {
        return Err(AppError::validation("expiryDate must not be before startDate"));
    }
    Ok(())
}

/// GET /api/restaurants
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Restaurant>> {
    let restaurants = store::list(&state.pool).await.map_err(internal)?;
    Ok(Json(restaurants))
}

/// GET /api/restaurants/{id}
pub async fn get_one(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Restaurant> {
    store::find(&state.pool, id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// POST /api/restaurants
///
/// Creates the restaurant and its admin login in one transaction.
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<RestaurantCreate>,
) -> CreatedResult<Restaurant> {
    if req.id <= 0 {
        return Err(AppError::new(ErrorCode::InvalidRestaurantId).with_detail("restaurantId", req.id));
    }
    check_fields(&req.name, &req.admin_email, req.start_date, req.expiry_date)?;
    check_new_password(&req.admin_password)?;

    let password_hash = hash_password(&req.admin_password).map_err(internal)?;
    let duplicate = || {
        AppError::with_message(ErrorCode::AlreadyExists, "Restaurant id or admin email already exists")
    };

    let mut tx = state.pool.begin().await.map_err(internal)?;
    let restaurant = store::insert(&mut *tx, &req)
        .await
        .map_err(|e| conflict_or_internal(e, duplicate()))?;
    store::insert_credential(
        &mut *tx,
        restaurant.id,
        None,
        &req.admin_email,
        &password_hash,
        ADMIN_ROLE,
    )
    .await
    .map_err(|e| conflict_or_internal(e, duplicate()))?;
    tx.commit().await.map_err(internal)?;

    tracing::info!(restaurant_id = restaurant.id, "Restaurant created");
    Ok(created(restaurant))
}

/// PUT /api/restaurants/{id}
pub async fn update(
    State(state): State<AppState>,
    PathId(id): PathId,
    Json(req): Json<RestaurantUpdate>,
) -> ApiResult<Restaurant> {
    check_fields(&req.name, &req.admin_email, req.start_date, req.expiry_date)?;
    store::update(&state.pool, id, &req)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// DELETE /api/restaurants/{id}
pub async fn remove(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<StatusCode, AppError> {
    if !store::delete(&state.pool, id).await.map_err(internal)? {
        return Err(not_found(id));
    }
    tracing::warn!(restaurant_id = id, "Restaurant deleted with all its data");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GstRequest {
    #[serde(default, alias = "gst_number")]
    pub gst_number: Option<String>,
}

/// PUT /api/restaurants/{id}/gst
pub async fn set_gst(
    State(state): State<AppState>,
    PathId(id): PathId,
    Json(req): Json<GstRequest>,
) -> ApiResult<Restaurant> {
    let gst_number = req
        .gst_number
        .as_deref()
        .map(|s| s.trim().to_ascii_uppercase())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::required("gstNumber"))?;
    if !is_valid_gstin(&gst_number) {
        return Err(AppError::new(ErrorCode::InvalidGstNumber).with_detail("gstNumber", gst_number));
    }

    store::set_gst_number(&state.pool, id, &gst_number)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// Indian GSTIN: 2-digit state code, PAN (5 letters, 4 digits, 1 letter),
/// entity number, a literal `Z`, then a check character.
pub fn is_valid_gstin(gstin: &str) -> bool {
    let b = gstin.as_bytes();
    if b.len() != 15 {
        return false;
    }
    let digit = |c: u8| c.is_ascii_digit();
    let upper = |c: u8| c.is_ascii_uppercase();

    b[0..2].iter().all(|&c| digit(c))
        && b[2..7].iter().all(|&c| upper(c))
        && b[7..11].iter().all(|&c| digit(c))
        && upper(b[11])
        && (upper(b[12]) || (digit(b[12]) && b[12] != b'0'))
        && b[13] == b'Z'
        && (upper(b[14]) || digit(b[14]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gstin_shapes() {
        assert!(is_valid_gstin("27AAPFU0939F1ZV"));
        assert!(is_valid_gstin("29ABCDE1234FAZ5"));

        // entity number 0 is not issued
        assert!(!is_valid_gstin("27AAPFU0939F0ZV"));
        // 14th character must be Z
        assert!(!is_valid_gstin("27AAPFU0939F1XV"));
        assert!(!is_valid_gstin("27aapfu0939f1zv"));
        assert!(!is_valid_gstin("27AAPFU0939F1Z"));
        assert!(!is_valid_gstin(""));
    }

    #[test]
    fn field_checks() {
        let d = |m, day| chrono::NaiveDate::from_ymd_opt(2025, m, day).unwrap();
        assert!(check_fields("Spice Route", "a@b.example", d(1, 1), d(12, 31)).is_ok());
        assert_eq!(
            check_fields(" ", "a@b.example", d(1, 1), d(12, 31)).unwrap_err().code,
            ErrorCode::RequiredField
        );
        assert!(check_fields("Spice Route", "nope", d(1, 1), d(12, 31)).is_err());
        assert!(check_fields("Spice Route", "a@b.example", d(12, 31), d(1, 1)).is_err());
    }
}
