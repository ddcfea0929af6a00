//! Floor plan: table categories (dining areas) and tables

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    RestaurantTable, RestaurantTableInput, TABLE_AVAILABLE, TABLE_OCCUPIED, TableCategory,
    TableCategoryInput,
};
use shared::tenant::{TenantQuery, parse_optional_id, parse_restaurant_id};

use crate::db::floor as store;
use crate::error::{conflict_or_internal, internal};
use crate::state::AppState;
use crate::util::non_empty;

use super::{ApiResult, CreatedResult, PathId, created};

fn category_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::CategoryNotFound).with_detail("categoryId", id)
}

fn table_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::TableNotFound).with_detail("tableId", id)
}

fn category_name(input: &TableCategoryInput) -> AppResult<&str> {
    non_empty(input.name.as_deref()).ok_or_else(|| AppError::required("name"))
}

// ── Categories ──

/// GET /api/categories
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> ApiResult<Vec<TableCategory>> {
    let restaurant_id = query.restaurant_id()?;
    let categories = store::list_categories(&state.pool, restaurant_id)
        .await
        .map_err(internal)?;
    Ok(Json(categories))
}

/// POST /api/categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<TableCategoryInput>,
) -> CreatedResult<TableCategory> {
    let restaurant_id = parse_restaurant_id(input.restaurant_id.as_deref())?;
    let name = category_name(&input)?;
    let category = store::create_category(&state.pool, restaurant_id, name)
        .await
        .map_err(|e| conflict_or_internal(e, AppError::new(ErrorCode::CategoryNameExists)))?;
    Ok(created(category))
}

/// PUT /api/categories/{id}
pub async fn rename_category(
    State(state): State<AppState>,
    PathId(id): PathId,
    Json(input): Json<TableCategoryInput>,
) -> ApiResult<TableCategory> {
    let restaurant_id = parse_restaurant_id(input.restaurant_id.as_deref())?;
    let name = category_name(&input)?;
    store::rename_category(&state.pool, restaurant_id, id, name)
        .await
        .map_err(|e| conflict_or_internal(e, AppError::new(ErrorCode::CategoryNameExists)))?
        .map(Json)
        .ok_or_else(|| category_not_found(id))
}

/// DELETE /api/categories/{id}
pub async fn delete_category(
    State(state): State<AppState>,
    PathId(id): PathId,
    Query(query): Query<TenantQuery>,
) -> Result<StatusCode, AppError> {
    let restaurant_id = query.restaurant_id()?;
    if !store::delete_category(&state.pool, restaurant_id, id)
        .await
        .map_err(internal)?
    {
        return Err(category_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ── Tables ──

fn parse_table_status(raw: Option<&str>) -> AppResult<Option<&'static str>> {
    match non_empty(raw) {
        None => Ok(None),
        Some(s) if s.eq_ignore_ascii_case(TABLE_AVAILABLE) => Ok(Some(TABLE_AVAILABLE)),
        Some(s) if s.eq_ignore_ascii_case(TABLE_OCCUPIED) => Ok(Some(TABLE_OCCUPIED)),
        Some(s) => Err(AppError::validation("status must be available or occupied")
            .with_detail("status", s)),
    }
}

/// Validated table payload: (restaurant, number, category, status)
struct TableFields<'a> {
    restaurant_id: i64,
    table_number: Option<&'a str>,
    category_id: Option<i64>,
    status: Option<&'static str>,
}

async fn table_fields<'a>(
    state: &AppState,
    input: &'a RestaurantTableInput,
) -> AppResult<TableFields<'a>> {
    let restaurant_id = parse_restaurant_id(input.restaurant_id.as_deref())?;
    let category_id = parse_optional_id("categoryId", input.category_id.as_deref())?;
    let status = parse_table_status(input.status.as_deref())?;

    if let Some(category_id) = category_id
        && !store::category_belongs(&state.pool, restaurant_id, category_id)
            .await
            .map_err(internal)?
    {
        return Err(category_not_found(category_id));
    }

    Ok(TableFields {
        restaurant_id,
        table_number: non_empty(input.table_number.as_deref()),
        category_id,
        status,
    })
}

/// GET /api/tables
pub async fn list_tables(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> ApiResult<Vec<RestaurantTable>> {
    let restaurant_id = query.restaurant_id()?;
    let tables = store::list_tables(&state.pool, restaurant_id)
        .await
        .map_err(internal)?;
    Ok(Json(tables))
}

/// POST /api/tables
pub async fn create_table(
    State(state): State<AppState>,
    Json(input): Json<RestaurantTableInput>,
) -> CreatedResult<RestaurantTable> {
    let fields = table_fields(&state, &input).await?;
    let table_number = fields
        .table_number
        .ok_or_else(|| AppError::required("tableNumber"))?;

    let id = store::create_table(
        &state.pool,
        fields.restaurant_id,
        table_number,
        fields.category_id,
        fields.status.unwrap_or(TABLE_AVAILABLE),
    )
    .await
    .map_err(|e| {
        conflict_or_internal(
            e,
            AppError::with_message(ErrorCode::AlreadyExists, "Table number already exists in this area"),
        )
    })?;

    let table = store::find_table(&state.pool, fields.restaurant_id, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| table_not_found(id))?;
    Ok(created(table))
}

/// PUT /api/tables/{id}
pub async fn update_table(
    State(state): State<AppState>,
    PathId(id): PathId,
    Json(input): Json<RestaurantTableInput>,
) -> ApiResult<RestaurantTable> {
    let fields = table_fields(&state, &input).await?;
    let updated = store::update_table(
        &state.pool,
        fields.restaurant_id,
        id,
        fields.table_number,
        fields.category_id,
        fields.status,
    )
    .await
    .map_err(internal)?;
    if !updated {
        return Err(table_not_found(id));
    }

    store::find_table(&state.pool, fields.restaurant_id, id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| table_not_found(id))
}

/// DELETE /api/tables/{id}
pub async fn delete_table(
    State(state): State<AppState>,
    PathId(id): PathId,
    Query(query): Query<TenantQuery>,
) -> Result<StatusCode, AppError> {
    let restaurant_id = query.restaurant_id()?;
    let table = store::find_table(&state.pool, restaurant_id, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| table_not_found(id))?;
    if table.status == TABLE_OCCUPIED {
        return Err(AppError::new(ErrorCode::TableOccupied).with_detail("tableNumber", table.table_number));
    }

    if !store::delete_table(&state.pool, restaurant_id, id)
        .await
        .map_err(internal)?
    {
        return Err(table_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_status_values() {
        assert_eq!(parse_table_status(None).unwrap(), None);
        assert_eq!(parse_table_status(Some(" ")).unwrap(), None);
        assert_eq!(parse_table_status(Some("Occupied")).unwrap(), Some(TABLE_OCCUPIED));
        assert_eq!(parse_table_status(Some("available")).unwrap(), Some(TABLE_AVAILABLE));
        assert_eq!(
            parse_table_status(Some("reserved")).unwrap_err().code,
            ErrorCode::ValidationFailed
        );
    }
}
