//! Login, guest link validation and password reset

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{LoginUser, RestaurantStatus};
use shared::tenant::{TenantQuery, lenient_string, parse_restaurant_id};

use crate::auth::{CodeCheck, check_code, check_new_password, check_restaurant};
use crate::db::restaurants as store;
use crate::email::templates;
use crate::error::internal;
use crate::state::AppState;
use crate::util::{generate_code, hash_password, non_empty, verify_password};

use super::ApiResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: LoginUser,
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let restaurant_id = parse_restaurant_id(req.restaurant_id.as_deref())?;
    let email = non_empty(req.email.as_deref()).ok_or_else(|| AppError::required("email"))?;
    let password = req
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::required("password"))?;

    let restaurant = store::find(&state.pool, restaurant_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            AppError::new(ErrorCode::RestaurantNotFound).with_detail("restaurantId", restaurant_id)
        })?;

    if let Err(e) = check_restaurant(&restaurant, state.today()) {
        if e.code == ErrorCode::SubscriptionExpired {
            store::set_status(&state.pool, restaurant_id, RestaurantStatus::OnHold)
                .await
                .map_err(internal)?;
            tracing::warn!(restaurant_id, "Subscription expired, restaurant put on hold");
        }
        return Err(e);
    }

    let credential = store::find_credential(&state.pool, restaurant_id, email)
        .await
        .map_err(internal)?;
    let Some(credential) = credential.filter(|c| verify_password(password, &c.password_hash)) else {
        tracing::warn!(restaurant_id, "Login failed");
        return Err(AppError::new(ErrorCode::InvalidCredentials));
    };

    tracing::info!(restaurant_id, user_id = credential.id, role = %credential.role, "Login");
    Ok(Json(LoginResponse {
        user: credential.into(),
    }))
}

#[derive(Debug, Serialize)]
pub struct GuestValidity {
    pub valid: bool,
}

/// GET /api/validate-guest
pub async fn validate_guest(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> ApiResult<GuestValidity> {
    let restaurant_id = query.restaurant_id()?;
    let valid = store::exists(&state.pool, restaurant_id)
        .await
        .map_err(internal)?;
    Ok(Json(GuestValidity { valid }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "code")]
    pub otp: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

impl ResetRequest {
    /// Codes are keyed by the normalized address
    fn email(&self) -> Result<String, AppError> {
        non_empty(self.email.as_deref())
            .map(str::to_lowercase)
            .ok_or_else(|| AppError::required("email"))
    }

    fn otp(&self) -> Result<&str, AppError> {
        non_empty(self.otp.as_deref()).ok_or_else(|| AppError::required("otp"))
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// POST /api/forgot-password/send-otp
pub async fn send_otp(
    State(state): State<AppState>,
    Json(req): Json<ResetRequest>,
) -> ApiResult<MessageResponse> {
    let email = req.email()?;
    if !store::credential_exists(&state.pool, &email)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::EmailNotRegistered));
    }

    let code = generate_code();
    let code_hash = hash_password(&code).map_err(internal)?;
    let expires_at = Utc::now() + Duration::seconds(state.otp_ttl_secs);
    store::upsert_reset_code(&state.pool, &email, &code_hash, expires_at)
        .await
        .map_err(internal)?;

    // Without the mail the user cannot continue, so delivery failure is an error
    state
        .mailer
        .send(templates::password_reset_code(&email, &code, state.otp_ttl_secs))
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Reset code email not delivered");
            AppError::new(ErrorCode::EmailDeliveryFailed)
        })?;

    Ok(Json(MessageResponse {
        message: "A verification code has been sent to your email",
    }))
}

/// Check a submitted code, counting wrong attempts and discarding used-up codes.
async fn verify_code(state: &AppState, email: &str, otp: &str) -> Result<(), AppError> {
    let record = store::find_reset_code(&state.pool, email)
        .await
        .map_err(internal)?;
    let check = check_code(record.as_ref(), otp, Utc::now());
    match check {
        CodeCheck::Wrong => {
            store::increment_reset_attempts(&state.pool, email)
                .await
                .map_err(internal)?;
        }
        CodeCheck::Exhausted => {
            store::delete_reset_code(&state.pool, email)
                .await
                .map_err(internal)?;
            tracing::warn!("Reset code discarded after too many attempts");
        }
        CodeCheck::Valid | CodeCheck::Expired => {}
    }
    check.into_result()
}

/// POST /api/forgot-password/verify-otp
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<ResetRequest>,
) -> ApiResult<MessageResponse> {
    let email = req.email()?;
    verify_code(&state, &email, req.otp()?).await?;
    Ok(Json(MessageResponse {
        message: "Verification code is valid",
    }))
}

/// POST /api/forgot-password/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetRequest>,
) -> ApiResult<MessageResponse> {
    let email = req.email()?;
    let otp = req.otp()?;
    let new_password = req
        .new_password
        .as_deref()
        .ok_or_else(|| AppError::required("newPassword"))?;
    check_new_password(new_password)?;

    verify_code(&state, &email, otp).await?;

    let password_hash = hash_password(new_password).map_err(internal)?;
    let mut tx = state.pool.begin().await.map_err(internal)?;
    if !store::update_password(&mut *tx, &email, &password_hash)
        .await
        .map_err(internal)?
    {
        return Err(AppError::new(ErrorCode::EmailNotRegistered));
    }
    store::delete_reset_code(&mut *tx, &email)
        .await
        .map_err(internal)?;
    tx.commit().await.map_err(internal)?;

    tracing::info!("Password reset completed");
    Ok(Json(MessageResponse {
        message: "Password has been reset successfully",
    }))
}
