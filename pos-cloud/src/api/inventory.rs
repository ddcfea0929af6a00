//! Stock, expenses and the cash-in / cash-out report

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    Expense, ExpenseInput, FinancialSummary, InventoryInput, InventoryItem, Order,
};
use shared::tenant::{TenantQuery, lenient_string, parse_restaurant_id};

use crate::db::inventory::{self as store, ExpenseFields};
use crate::error::internal;
use crate::state::AppState;
use crate::util::non_empty;

use super::{ApiResult, CreatedResult, PathId, created, date_filter};

fn item_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::InventoryItemNotFound).with_detail("id", id)
}

fn expense_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::ExpenseNotFound).with_detail("id", id)
}

fn non_negative(field: &'static str, value: Option<Decimal>) -> AppResult<()> {
    match value {
        Some(v) if v < Decimal::ZERO => {
            Err(AppError::new(ErrorCode::InvalidAmount).with_detail("field", field))
        }
        _ => Ok(()),
    }
}

fn check_quantities(input: &InventoryInput) -> AppResult<()> {
    non_negative("quantity", input.quantity)?;
    non_negative("threshold", input.threshold)?;
    non_negative("rate", input.rate)?;
    non_negative("totalPrice", input.total_price)
}

// ── Inventory ──

/// GET /api/inventory
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> ApiResult<Vec<InventoryItem>> {
    let restaurant_id = query.restaurant_id()?;
    let items = store::list_items(&state.pool, restaurant_id)
        .await
        .map_err(internal)?;
    Ok(Json(items))
}

/// POST /api/inventory
pub async fn create_item(
    State(state): State<AppState>,
    Json(input): Json<InventoryInput>,
) -> CreatedResult<InventoryItem> {
    let restaurant_id = parse_restaurant_id(input.restaurant_id.as_deref())?;
    let item = non_empty(input.item.as_deref()).ok_or_else(|| AppError::required("item"))?;
    check_quantities(&input)?;

    let created_item = store::create_item(&state.pool, restaurant_id, item, &input)
        .await
        .map_err(internal)?;
    Ok(created(created_item))
}

/// PUT /api/inventory/{id}
///
/// Partial update; absent fields keep their stored value.
pub async fn update_item(
    State(state): State<AppState>,
    PathId(id): PathId,
    Json(input): Json<InventoryInput>,
) -> ApiResult<InventoryItem> {
    let restaurant_id = parse_restaurant_id(input.restaurant_id.as_deref())?;
    if input.is_empty() {
        return Err(AppError::validation("No fields to update"));
    }
    if input.item.as_deref().is_some_and(|s| s.trim().is_empty()) {
        return Err(AppError::required("item"));
    }
    check_quantities(&input)?;

    store::update_item(&state.pool, restaurant_id, id, &input)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| item_not_found(id))
}

/// DELETE /api/inventory/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    PathId(id): PathId,
    Query(query): Query<TenantQuery>,
) -> Result<StatusCode, AppError> {
    let restaurant_id = query.restaurant_id()?;
    if !store::delete_item(&state.pool, restaurant_id, id)
        .await
        .map_err(internal)?
    {
        return Err(item_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ── Expenses ──

fn expense_fields(input: &ExpenseInput) -> AppResult<(i64, ExpenseFields)> {
    let restaurant_id = parse_restaurant_id(input.restaurant_id.as_deref())?;
    let description =
        non_empty(input.description.as_deref()).ok_or_else(|| AppError::required("description"))?;
    let amount = input.amount.ok_or_else(|| AppError::required("amount"))?;
    non_negative("amount", Some(amount))?;
    non_negative("totalPaid", input.total_paid)?;

    let optional = |v: Option<&str>| non_empty(v).map(str::to_owned);
    Ok((
        restaurant_id,
        ExpenseFields {
            description: description.to_owned(),
            amount,
            total_paid: input.total_paid.unwrap_or(amount),
            paid_by: optional(input.paid_by.as_deref()),
            paid_to: optional(input.paid_to.as_deref()),
            phone_number: optional(input.phone_number.as_deref()),
            expense_date: input.expense_date,
        },
    ))
}

/// GET /api/expenses
pub async fn list_expenses(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> ApiResult<Vec<Expense>> {
    let restaurant_id = query.restaurant_id()?;
    let expenses = store::list_expenses(&state.pool, restaurant_id)
        .await
        .map_err(internal)?;
    Ok(Json(expenses))
}

/// POST /api/expenses
pub async fn create_expense(
    State(state): State<AppState>,
    Json(input): Json<ExpenseInput>,
) -> CreatedResult<Expense> {
    let (restaurant_id, fields) = expense_fields(&input)?;
    let expense = store::create_expense(&state.pool, restaurant_id, &fields)
        .await
        .map_err(internal)?;
    Ok(created(expense))
}

/// PUT /api/expenses/{id}
pub async fn update_expense(
    State(state): State<AppState>,
    PathId(id): PathId,
    Json(input): Json<ExpenseInput>,
) -> ApiResult<Expense> {
    let (restaurant_id, fields) = expense_fields(&input)?;
    store::update_expense(&state.pool, restaurant_id, id, &fields)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| expense_not_found(id))
}

/// DELETE /api/expenses/{id}
pub async fn delete_expense(
    State(state): State<AppState>,
    PathId(id): PathId,
    Query(query): Query<TenantQuery>,
) -> Result<StatusCode, AppError> {
    let restaurant_id = query.restaurant_id()?;
    if !store::delete_expense(&state.pool, restaurant_id, id)
        .await
        .map_err(internal)?
    {
        return Err(expense_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ── Financials ──

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialsQuery {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialReport {
    pub summary: FinancialSummary,
    pub cash_in: Vec<Order>,
    pub cash_out: Vec<Expense>,
}

/// GET /api/financials
///
/// Without dates the report covers today.
pub async fn financials(
    State(state): State<AppState>,
    Query(query): Query<FinancialsQuery>,
) -> ApiResult<FinancialReport> {
    let restaurant_id = parse_restaurant_id(query.restaurant_id.as_deref())?;
    let (start, end) = date_filter(query.start_date.as_deref(), query.end_date.as_deref())?
        .unwrap_or_else(|| {
            let today = state.today();
            (today, today)
        });

    let cash_in = store::cash_in(&state.pool, restaurant_id, start, end)
        .await
        .map_err(internal)?;
    let cash_out = store::cash_out(&state.pool, restaurant_id, start, end)
        .await
        .map_err(internal)?;

    Ok(Json(FinancialReport {
        summary: store::summarize(&cash_in, &cash_out),
        cash_in,
        cash_out,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expense_defaults_total_paid_to_amount() {
        let input: ExpenseInput = serde_json::from_value(serde_json::json!({
            "restaurantId": 1, "description": "Vegetables", "amount": 850.5, "date": "2025-07-27"
        }))
        .unwrap();
        let (rid, fields) = expense_fields(&input).unwrap();
        assert_eq!(rid, 1);
        assert_eq!(fields.total_paid, fields.amount);
        assert!(fields.expense_date.is_some());
    }

    #[test]
    fn expense_rejects_negative_amounts() {
        let input: ExpenseInput = serde_json::from_value(serde_json::json!({
            "restaurantId": 1, "description": "Gas", "amount": -5
        }))
        .unwrap();
        assert_eq!(expense_fields(&input).unwrap_err().code, ErrorCode::InvalidAmount);

        let missing: ExpenseInput = serde_json::from_value(serde_json::json!({
            "restaurantId": 1, "amount": 5
        }))
        .unwrap();
        assert_eq!(expense_fields(&missing).unwrap_err().code, ErrorCode::RequiredField);
    }

    #[test]
    fn stock_quantities_must_not_be_negative() {
        let input = InventoryInput {
            threshold: Some(Decimal::from(-1)),
            ..Default::default()
        };
        assert_eq!(check_quantities(&input).unwrap_err().code, ErrorCode::InvalidAmount);
        assert!(check_quantities(&InventoryInput::default()).is_ok());
    }
}
