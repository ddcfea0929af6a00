//! Order endpoints: place, read, status, finalize, kitchen view

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Customer, KitchenTicket, ManualOrderRequest, Order, OrderLine, OrderListEntry, OrderWithItems,
    PlaceOrderRequest,
};
use shared::tenant::{TenantQuery, lenient_string, parse_optional_id, parse_restaurant_id};

use crate::db::orders::{self as store, ContactBackfill};
use crate::error::internal;
use crate::live::{KitchenNotice, LiveEvent};
use crate::orders::{
    PlacementOutcome, edit::parse_edit, kitchen, parse_status, validate_manual_order,
    validate_order, workflow,
};
use crate::state::AppState;
use crate::util::non_empty;

use super::{ApiResult, CreatedResult, PathId, created, date_filter};

#[derive(Debug, Serialize)]
pub struct PlaceOrderResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub outcome: PlacementOutcome,
}

/// POST /api/orders
pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<PlaceOrderRequest>,
) -> CreatedResult<PlaceOrderResponse> {
    let order = validate_order(req)?;
    let outcome = workflow::place_order(&state.pool, &order).await?;

    // Committed: a missing or lagging display never undoes the order
    let delivered = state.live.publish(
        order.restaurant_id,
        LiveEvent::NewOrderForKitchen(KitchenNotice::new(
            order.restaurant_id,
            outcome.order_id(),
            outcome.bill_no(),
        )),
    );
    tracing::debug!(
        restaurant_id = order.restaurant_id,
        bill_no = outcome.bill_no(),
        displays = delivered,
        "Kitchen notified"
    );

    let message = match outcome {
        PlacementOutcome::Created { .. } => "Order created successfully",
        PlacementOutcome::Merged { .. } => "Order updated successfully",
    };
    Ok(created(PlaceOrderResponse { message, outcome }))
}

/// POST /api/orders/manual
pub async fn create_manual_order(
    State(state): State<AppState>,
    Json(req): Json<ManualOrderRequest>,
) -> CreatedResult<Order> {
    let order = validate_manual_order(req)?;
    let saved = workflow::record_manual_order(&state.pool, &order).await?;
    Ok(created(saved))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersQuery {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// GET /api/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> ApiResult<Vec<OrderListEntry>> {
    let restaurant_id = parse_restaurant_id(query.restaurant_id.as_deref())?;
    let range = date_filter(query.start_date.as_deref(), query.end_date.as_deref())?;

    let orders = store::list(&state.pool, restaurant_id, range)
        .await
        .map_err(internal)?;
    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let lines = store::lines_for_orders(&state.pool, &ids)
        .await
        .map_err(internal)?;

    Ok(Json(list_entries(orders, lines, state.local_offset)))
}

/// Attach lines to their orders and format the kitchen timestamps.
fn list_entries(
    orders: Vec<Order>,
    lines: Vec<OrderLine>,
    offset: FixedOffset,
) -> Vec<OrderListEntry> {
    let mut by_order: HashMap<i64, Vec<OrderLine>> = HashMap::new();
    for line in lines {
        by_order.entry(line.order_id).or_default().push(line);
    }

    let clock = |t: Option<DateTime<Utc>>| {
        t.map(|t| t.with_timezone(&offset).format("%H:%M:%S").to_string())
    };

    orders
        .into_iter()
        .map(|order| OrderListEntry {
            items: by_order.remove(&order.id).unwrap_or_default(),
            accepted_time: clock(order.accepted_at),
            served_time: clock(order.served_at),
            order,
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByTableQuery {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub table_number: Option<String>,
    #[serde(default, alias = "categoryId", deserialize_with = "lenient_string")]
    pub table_category_id: Option<String>,
}

/// GET /api/orders/by-table
pub async fn order_by_table(
    State(state): State<AppState>,
    Query(query): Query<ByTableQuery>,
) -> ApiResult<OrderWithItems> {
    let restaurant_id = parse_restaurant_id(query.restaurant_id.as_deref())?;
    let table_number =
        non_empty(query.table_number.as_deref()).ok_or_else(|| AppError::required("tableNumber"))?;
    let category_id = parse_optional_id("tableCategoryId", query.table_category_id.as_deref())?
        .ok_or_else(|| AppError::required("tableCategoryId"))?;

    let order = store::find_open_for_table(&state.pool, restaurant_id, table_number, category_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::OrderNotFound, "No active order for this table")
                .with_detail("tableNumber", table_number)
        })?;
    with_items(&state, order).await
}

/// GET /api/orders/details/{bill_no}
pub async fn order_details(
    State(state): State<AppState>,
    PathId(bill_no): PathId,
    Query(query): Query<TenantQuery>,
) -> ApiResult<OrderWithItems> {
    let restaurant_id = query.restaurant_id()?;
    let order = store::find_by_bill_no(&state.pool, restaurant_id, bill_no)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound).with_detail("billNo", bill_no))?;
    with_items(&state, order).await
}

async fn with_items(state: &AppState, order: Order) -> ApiResult<OrderWithItems> {
    let items = store::lines(&state.pool, order.id)
        .await
        .map_err(internal)?;
    Ok(Json(OrderWithItems { order, items }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// PUT /api/orders/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    PathId(order_id): PathId,
    Json(req): Json<StatusRequest>,
) -> ApiResult<Order> {
    let restaurant_id = parse_restaurant_id(req.restaurant_id.as_deref())?;
    let status = parse_status(req.status.as_deref())?;
    let order = workflow::change_status(&state.pool, restaurant_id, order_id, status).await?;
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    #[serde(default, alias = "paymenttype", alias = "paymentType")]
    pub payment_mode: Option<String>,
    #[serde(default, alias = "customername")]
    pub customer_name: Option<String>,
    #[serde(default, alias = "customerno")]
    pub customer_phone: Option<String>,
    #[serde(default, alias = "email_id")]
    pub customer_email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeResponse {
    pub message: &'static str,
    pub order: Order,
    pub released_table: bool,
}

/// PUT /api/orders/{id}/finalize
pub async fn finalize_order(
    State(state): State<AppState>,
    PathId(order_id): PathId,
    Json(req): Json<FinalizeRequest>,
) -> ApiResult<FinalizeResponse> {
    let restaurant_id = parse_restaurant_id(req.restaurant_id.as_deref())?;
    let payment_type = non_empty(req.payment_mode.as_deref())
        .ok_or_else(|| AppError::new(ErrorCode::PaymentModeRequired))?
        .to_owned();

    let owned = |v: Option<String>| non_empty(v.as_deref()).map(str::to_owned);
    let payment = workflow::Payment {
        payment_type,
        contact: ContactBackfill {
            name: owned(req.customer_name),
            phone: owned(req.customer_phone),
            email: owned(req.customer_email),
        },
    };

    let finalized = workflow::finalize(&state.pool, restaurant_id, order_id, &payment).await?;
    Ok(Json(FinalizeResponse {
        message: "Bill finalized and status updated successfully",
        order: finalized.order,
        released_table: finalized.released_table,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// PUT /api/orders/{id}
pub async fn edit_order(
    State(state): State<AppState>,
    PathId(order_id): PathId,
    Json(req): Json<EditRequest>,
) -> ApiResult<Order> {
    let restaurant_id = parse_restaurant_id(req.restaurant_id.as_deref())?;
    let field = non_empty(req.field.as_deref()).ok_or_else(|| AppError::required("field"))?;
    let edit = parse_edit(field, &req.value)?;

    let order = workflow::edit_order(&state.pool, restaurant_id, order_id, &edit).await?;
    Ok(Json(order))
}

/// GET /api/kitchen-orders
pub async fn kitchen_orders(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> ApiResult<Vec<KitchenTicket>> {
    let restaurant_id = query.restaurant_id()?;
    let rows = store::kitchen_rows(&state.pool, restaurant_id)
        .await
        .map_err(internal)?;
    Ok(Json(kitchen::project(rows)))
}

/// GET /api/customers
pub async fn customers(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> ApiResult<Vec<Customer>> {
    let restaurant_id = query.restaurant_id()?;
    let customers = store::customers(&state.pool, restaurant_id)
        .await
        .map_err(internal)?;
    Ok(Json(customers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn order(id: i64) -> Order {
        Order {
            id,
            restaurant_id: 1,
            bill_no: id,
            table_number: None,
            table_category_id: None,
            customer_name: None,
            customer_phone: None,
            customer_email: None,
            delivery_type: "takeaway".into(),
            payment_type: None,
            total_amount: Decimal::from(100),
            is_paid: false,
            is_opted_in: false,
            status: "pending".into(),
            staff_id: None,
            order_date: Utc::now(),
            accepted_at: None,
            served_at: None,
        }
    }

    fn line(id: i64, order_id: i64) -> OrderLine {
        OrderLine {
            id,
            order_id,
            menu_item_id: 10,
            item_name: "Dal".into(),
            quantity: 1,
            quantity_served: 0,
            price: Decimal::from(100),
        }
    }

    #[test]
    fn entries_carry_their_lines_and_local_times() {
        let mut accepted = order(1);
        accepted.accepted_at = Some(Utc.with_ymd_and_hms(2025, 7, 27, 8, 0, 5).unwrap());

        let entries = list_entries(
            vec![accepted, order(2)],
            vec![line(1, 1), line(2, 1), line(3, 2)],
            shared::util::offset_from_minutes(330),
        );

        assert_eq!(entries[0].items.len(), 2);
        assert_eq!(entries[1].items.len(), 1);
        assert_eq!(entries[0].accepted_time.as_deref(), Some("13:30:05"));
        assert_eq!(entries[0].served_time, None);
    }

    #[test]
    fn placement_response_shape() {
        let json = serde_json::to_value(PlaceOrderResponse {
            message: "Order updated successfully",
            outcome: PlacementOutcome::Merged {
                order_id: 7,
                bill_no: 3,
            },
        })
        .unwrap();
        assert_eq!(json["outcome"], "merged");
        assert_eq!(json["orderId"], 7);
        assert_eq!(json["billNo"], 3);
    }

    #[test]
    fn finalize_accepts_legacy_keys() {
        let req: FinalizeRequest = serde_json::from_str(
            r#"{"restaurantId": 1, "paymentMode": "cash", "customername": "Asha", "customerno": "98"}"#,
        )
        .unwrap();
        assert_eq!(req.payment_mode.as_deref(), Some("cash"));
        assert_eq!(req.customer_name.as_deref(), Some("Asha"));
        assert_eq!(req.customer_phone.as_deref(), Some("98"));
    }
}
