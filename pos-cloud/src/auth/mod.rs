//! Login gatekeeping and password reset codes

pub mod rate_limit;

use chrono::{DateTime, NaiveDate, Utc};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Restaurant, RestaurantStatus};

use crate::db::restaurants::ResetCode;
use crate::util::verify_password;

pub use rate_limit::RateLimiter;

/// Wrong codes accepted before the code is discarded
pub const MAX_CODE_ATTEMPTS: i32 = 5;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Whether a restaurant may log in today.
///
/// `Err(SubscriptionExpired)` means the caller must also put the account on hold.
pub fn check_restaurant(restaurant: &Restaurant, today: NaiveDate) -> AppResult<()> {
    if restaurant.expiry_date < today {
        return Err(AppError::new(ErrorCode::SubscriptionExpired)
            .with_detail("expiryDate", restaurant.expiry_date.to_string()));
    }
    match RestaurantStatus::from_db(&restaurant.status) {
        Some(RestaurantStatus::OnHold) => Err(AppError::new(ErrorCode::RestaurantOnHold)),
        Some(RestaurantStatus::Suspended) => Err(AppError::new(ErrorCode::RestaurantSuspended)),
        _ => Ok(()),
    }
}

/// Outcome of checking a submitted reset code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeCheck {
    Valid,
    /// Missing or past `expires_at`
    Expired,
    /// Wrong code; the attempt must be counted
    Wrong,
    /// Attempt budget used up; the code must be discarded
    Exhausted,
}

pub fn check_code(record: Option<&ResetCode>, submitted: &str, now: DateTime<Utc>) -> CodeCheck {
    let Some(record) = record else {
        return CodeCheck::Expired;
    };
    if now > record.expires_at {
        return CodeCheck::Expired;
    }
    if record.attempts >= MAX_CODE_ATTEMPTS {
        return CodeCheck::Exhausted;
    }
    if verify_password(submitted.trim(), &record.code_hash) {
        CodeCheck::Valid
    } else if record.attempts + 1 >= MAX_CODE_ATTEMPTS {
        CodeCheck::Exhausted
    } else {
        CodeCheck::Wrong
    }
}

impl CodeCheck {
    pub fn into_result(self) -> AppResult<()> {
        match self {
            Self::Valid => Ok(()),
            Self::Expired => Err(AppError::new(ErrorCode::VerificationCodeExpired)),
            Self::Wrong => Err(AppError::new(ErrorCode::VerificationCodeInvalid)),
            Self::Exhausted => Err(AppError::new(ErrorCode::TooManyAttempts)),
        }
    }
}

pub fn check_new_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::new(ErrorCode::PasswordTooShort)
            .with_detail("minLength", MIN_PASSWORD_LEN as u64));
    }
    Ok(())
}
