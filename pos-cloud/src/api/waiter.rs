//! Waiter calls raised from guest tables

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::WaiterCall;
use shared::tenant::{TenantQuery, lenient_string, parse_optional_id, parse_restaurant_id};

use crate::db::floor;
use crate::error::internal;
use crate::live::LiveEvent;
use crate::state::AppState;
use crate::util::non_empty;

use super::{ApiResult, CreatedResult, PathId, created};

const RECENT_CALLS: i64 = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub table_id: Option<String>,
}

/// POST /api/notify-waiter
pub async fn notify_waiter(
    State(state): State<AppState>,
    Json(req): Json<NotifyRequest>,
) -> CreatedResult<WaiterCall> {
    let restaurant_id = parse_restaurant_id(req.restaurant_id.as_deref())?;
    let category_id = parse_optional_id("categoryId", req.category_id.as_deref())?;
    let table_id = non_empty(req.table_id.as_deref()).ok_or_else(|| AppError::required("tableId"))?;

    let message = format!("Table {table_id} is calling");
    let call = floor::insert_waiter_call(&state.pool, restaurant_id, category_id, table_id, &message)
        .await
        .map_err(internal)?;

    let delivered = state
        .live
        .publish(restaurant_id, LiveEvent::WaiterCall(call.clone()));
    tracing::info!(restaurant_id, table_id, tablets = delivered, "Waiter called");

    Ok(created(call))
}

/// GET /api/waiter-calls
pub async fn list_calls(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> ApiResult<Vec<WaiterCall>> {
    let restaurant_id = query.restaurant_id()?;
    let calls = floor::recent_waiter_calls(&state.pool, restaurant_id, RECENT_CALLS)
        .await
        .map_err(internal)?;
    Ok(Json(calls))
}

/// DELETE /api/waiter-calls/{id}
pub async fn dismiss_call(
    State(state): State<AppState>,
    PathId(id): PathId,
    Query(query): Query<TenantQuery>,
) -> Result<StatusCode, AppError> {
    let restaurant_id = query.restaurant_id()?;
    if floor::delete_waiter_call(&state.pool, restaurant_id, id)
        .await
        .map_err(internal)?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::new(ErrorCode::WaiterCallNotFound).with_detail("id", id))
    }
}
