//! API routes
//!
//! Every tenant-scoped route takes `restaurantId` (query string or JSON body)
//! and validates it before touching the store.

pub mod auth;
pub mod dashboard;
pub mod floor;
pub mod guest;
pub mod health;
pub mod inventory;
pub mod live;
pub mod mail;
pub mod menu;
pub mod orders;
pub mod restaurants;
pub mod staff;
pub mod waiter;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use axum::http::{HeaderValue, StatusCode};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router, middleware};
use chrono::NaiveDate;
use shared::error::{AppError, AppResult};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::auth::rate_limit::{login_rate_limit, otp_rate_limit};
use crate::state::AppState;

pub type ApiResult<T> = Result<Json<T>, AppError>;

/// `201 Created` with a JSON body
pub type CreatedResult<T> = Result<(StatusCode, Json<T>), AppError>;

/// Bill and offer PDFs arrive base64-encoded in the body
const BODY_LIMIT_BYTES: usize = 15 * 1024 * 1024;

pub fn created<T>(body: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(body))
}

/// Numeric `{id}` path segment.
///
/// A missing, non-numeric or non-positive id is rejected with the usual JSON
/// error body instead of axum's plain-text rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathId(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for PathId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::validation(e.body_text()).with_detail("field", "id"))?;
        parse_path_id(&raw).map(PathId)
    }
}

fn parse_path_id(raw: &str) -> AppResult<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| {
            AppError::validation("id must be a positive integer")
                .with_detail("field", "id")
                .with_detail("value", raw)
        })
}

/// Parse an optional `YYYY-MM-DD` query value
pub fn parse_date(field: &'static str, raw: Option<&str>) -> AppResult<Option<NaiveDate>> {
    match crate::util::non_empty(raw) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                AppError::validation(format!("{field} must be a date (YYYY-MM-DD)"))
                    .with_detail("field", field)
            }),
    }
}

/// Inclusive date filter from `startDate` / `endDate`.
///
/// One bound alone filters that single day; none means no filter.
pub fn date_filter(
    start: Option<&str>,
    end: Option<&str>,
) -> AppResult<Option<(NaiveDate, NaiveDate)>> {
    let start = parse_date("startDate", start)?;
    let end = parse_date("endDate", end)?;
    let range = match (start, end) {
        (Some(s), Some(e)) => Some((s, e)),
        (Some(d), None) | (None, Some(d)) => Some((d, d)),
        (None, None) => None,
    };
    if let Some((s, e)) = range
        && s > e
    {
        return Err(AppError::validation("startDate must not be after endDate"));
    }
    Ok(range)
}

/// Create the service router
pub fn create_router(state: AppState) -> Router {
    // Login and reset-code requests are rate limited per client IP
    let login = Router::new()
        .route("/api/login", post(auth::login))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            login_rate_limit,
        ));
    let send_otp = Router::new()
        .route("/api/forgot-password/send-otp", post(auth::send_otp))
        .layer(middleware::from_fn_with_state(state.clone(), otp_rate_limit));

    let orders = Router::new()
        .route(
            "/api/orders",
            post(orders::create_order).get(orders::list_orders),
        )
        .route("/api/orders/manual", post(orders::create_manual_order))
        .route("/api/orders/by-table", get(orders::order_by_table))
        .route("/api/orders/details/{bill_no}", get(orders::order_details))
        .route("/api/orders/{id}", put(orders::edit_order))
        .route("/api/orders/{id}/status", put(orders::update_status))
        .route("/api/orders/{id}/finalize", put(orders::finalize_order))
        .route("/api/kitchen-orders", get(orders::kitchen_orders))
        .route("/api/customers", get(orders::customers));

    let floor = Router::new()
        .route(
            "/api/categories",
            get(floor::list_categories).post(floor::create_category),
        )
        .route(
            "/api/categories/{id}",
            put(floor::rename_category).delete(floor::delete_category),
        )
        .route(
            "/api/tables",
            get(floor::list_tables).post(floor::create_table),
        )
        .route(
            "/api/tables/{id}",
            put(floor::update_table).delete(floor::delete_table),
        )
        .route("/api/notify-waiter", post(waiter::notify_waiter))
        .route("/api/waiter-calls", get(waiter::list_calls))
        .route("/api/waiter-calls/{id}", delete(waiter::dismiss_call));

    let restaurants = Router::new()
        .route(
            "/api/restaurants",
            get(restaurants::list).post(restaurants::create),
        )
        .route(
            "/api/restaurants/{id}",
            get(restaurants::get_one)
                .put(restaurants::update)
                .delete(restaurants::remove),
        )
        .route("/api/restaurants/{id}/gst", put(restaurants::set_gst))
        .route("/api/validate-guest", get(auth::validate_guest))
        .route("/api/forgot-password/verify-otp", post(auth::verify_otp))
        .route(
            "/api/forgot-password/reset-password",
            post(auth::reset_password),
        );

    let menu = Router::new()
        .route("/api/menuitems-grouped", get(menu::grouped))
        .route("/api/menuitems", post(menu::create))
        .route("/api/menuitems/{id}", put(menu::replace).delete(menu::retire))
        .route("/api/menuitems/{id}/toggle", put(menu::toggle))
        .route("/api/menu-item-categories", get(menu::categories))
        .route(
            "/api/menu-item-categories/{name}",
            delete(menu::dissolve_category),
        );

    let staff = Router::new()
        .route("/api/staff", get(staff::list).post(staff::create))
        .route("/api/staff/{id}", put(staff::update).delete(staff::remove))
        .route(
            "/api/attendance",
            get(staff::attendance_on).post(staff::check_in),
        )
        .route(
            "/api/attendance/{id}",
            put(staff::check_out).delete(staff::delete_attendance),
        )
        .route(
            "/api/payroll",
            get(staff::payroll).post(staff::upsert_payroll),
        )
        .route("/api/tips", get(staff::find_tip).post(staff::upsert_tip));

    let books = Router::new()
        .route(
            "/api/inventory",
            get(inventory::list_items).post(inventory::create_item),
        )
        .route(
            "/api/inventory/{id}",
            put(inventory::update_item).delete(inventory::delete_item),
        )
        .route(
            "/api/expenses",
            get(inventory::list_expenses).post(inventory::create_expense),
        )
        .route(
            "/api/expenses/{id}",
            put(inventory::update_expense).delete(inventory::delete_expense),
        )
        .route("/api/financials", get(inventory::financials));

    let guests = Router::new()
        .route(
            "/api/polls",
            get(guest::list_polls).post(guest::create_poll),
        )
        .route("/api/polls/{id}", delete(guest::delete_poll))
        .route("/api/poll-options/{id}/vote", put(guest::vote))
        .route(
            "/api/feedback",
            get(guest::list_feedback).post(guest::create_feedback),
        )
        .route("/api/valet", get(guest::list_valet).post(guest::create_valet))
        .route(
            "/api/valet/{id}",
            put(guest::update_valet).delete(guest::delete_valet),
        )
        .route("/api/send-bill", post(mail::send_bill))
        .route("/api/send-offer-email", post(mail::send_offer));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/test-db", get(health::test_db))
        .route("/api/live", get(live::handle_live_ws))
        .route("/api/dashboard/{name}", get(dashboard::dashboard))
        .merge(login)
        .merge(send_otp)
        .merge(orders)
        .merge(floor)
        .merge(restaurants)
        .merge(menu)
        .merge(staff)
        .merge(books)
        .merge(guests)
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the configured origins; any origin when none are configured.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_filters() {
        assert_eq!(date_filter(None, None).unwrap(), None);
        assert_eq!(
            date_filter(Some("2025-07-01"), Some("2025-07-27")).unwrap(),
            Some((day(2025, 7, 1), day(2025, 7, 27)))
        );
        assert_eq!(
            date_filter(Some("2025-07-01"), Some("")).unwrap(),
            Some((day(2025, 7, 1), day(2025, 7, 1)))
        );
        assert_eq!(
            date_filter(Some("07/01/2025"), None).unwrap_err().code,
            ErrorCode::ValidationFailed
        );
        assert!(date_filter(Some("2025-07-27"), Some("2025-07-01")).is_err());
    }

    #[test]
    fn path_ids() {
        assert_eq!(parse_path_id("42").unwrap(), 42);
        for bad in ["abc", "0", "-3", "1.5", "", "99999999999999999999"] {
            let err = parse_path_id(bad).unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationFailed);
            assert_eq!(err.details.unwrap()["field"], "id");
        }
    }
}
