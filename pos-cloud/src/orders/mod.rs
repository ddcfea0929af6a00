//! Order lifecycle
//!
//! ```text
//! POST /api/orders ─► validate_order ─► workflow::place_order ─┬─ Created (table → occupied)
//!                                                             └─ Merged  (status → pending)
//! PUT  /status      ─► StatusTransition: Accept | Serve (all lines served) | Assign
//! PUT  /finalize    ─► final_status(delivery type) ─► paid / delivered, table → available
//! ```
//!
//! Everything in this module is pure; store access lives in [`workflow`].

pub mod edit;
pub mod kitchen;
pub mod workflow;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{DeliveryType, ManualOrderRequest, OrderItemInput, OrderStatus, PlaceOrderRequest};
use shared::tenant::{parse_optional_id, parse_restaurant_id};

use crate::util::non_empty;

/// A validated order submission
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub restaurant_id: i64,
    pub table_number: Option<String>,
    pub table_category_id: Option<i64>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub delivery_type: DeliveryType,
    pub payment_type: Option<String>,
    pub subtotal: Decimal,
    pub is_opted_in: bool,
    pub staff_id: Option<i64>,
    pub items: Vec<OrderItemInput>,
}

impl NewOrder {
    /// Table reference used for merge lookup and occupancy; only when both
    /// the number and the category are known.
    pub fn table(&self) -> Option<(&str, i64)> {
        match (&self.table_number, self.table_category_id) {
            (Some(number), Some(category)) => Some((number.as_str(), category)),
            _ => None,
        }
    }
}

/// Unpaid order already sitting on a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct OpenOrder {
    pub id: i64,
    pub bill_no: i64,
}

/// What to do with a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Create,
    Merge(OpenOrder),
}

/// Decide between creating a new order and merging into the open one.
pub fn plan_placement(open: Option<OpenOrder>) -> Placement {
    match open {
        Some(order) => Placement::Merge(order),
        None => Placement::Create,
    }
}

/// Result of a committed placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum PlacementOutcome {
    #[serde(rename_all = "camelCase")]
    Created { order_id: i64, bill_no: i64 },
    #[serde(rename_all = "camelCase")]
    Merged { order_id: i64, bill_no: i64 },
}

impl PlacementOutcome {
    pub fn order_id(&self) -> i64 {
        match self {
            Self::Created { order_id, .. } | Self::Merged { order_id, .. } => *order_id,
        }
    }

    pub fn bill_no(&self) -> i64 {
        match self {
            Self::Created { bill_no, .. } | Self::Merged { bill_no, .. } => *bill_no,
        }
    }
}

/// Status change side effects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    /// Stamp `accepted_at`
    Accept,
    /// Stamp `served_at` and mark every line fully served
    Serve,
    /// Plain assignment
    Assign(OrderStatus),
}

impl From<OrderStatus> for StatusTransition {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Accepted => Self::Accept,
            OrderStatus::Served => Self::Serve,
            other => Self::Assign(other),
        }
    }
}

/// Parse the requested status of `PUT /orders/{id}/status`
pub fn parse_status(raw: Option<&str>) -> AppResult<OrderStatus> {
    let raw = non_empty(raw).ok_or_else(|| AppError::required("status"))?;
    OrderStatus::parse(raw).ok_or_else(|| {
        AppError::with_message(
            ErrorCode::InvalidOrderStatus,
            format!("Unknown order status: {raw}"),
        )
        .with_detail("status", raw)
    })
}

/// Terminal status on payment: dine-in orders end `paid`, everything else `delivered`.
pub fn final_status(delivery_type: &str) -> OrderStatus {
    match DeliveryType::parse(delivery_type) {
        Some(DeliveryType::DineIn) => OrderStatus::Paid,
        _ => OrderStatus::Delivered,
    }
}

/// Largest amount a `NUMERIC(12, 2)` column holds (999_999_999_999 × 10⁻², built from raw parts so it stays `const`)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

fn amount_too_large(field: &'static str) -> AppError {
    AppError::with_message(ErrorCode::InvalidAmount, "Amount is too large").with_detail("field", field)
}

/// Σ quantity × price, or `None` past [`MAX_AMOUNT`].
pub fn line_subtotal(items: &[OrderItemInput]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |sum, i| {
            Decimal::from(i.quantity)
                .checked_mul(i.price)
                .and_then(|line| sum.checked_add(line))
        })
        .filter(|total| *total <= MAX_AMOUNT)
}

/// Fold repeated menu items of one submission into a single line
/// (first occurrence keeps its name and price).
pub fn collapse_items(items: Vec<OrderItemInput>) -> AppResult<Vec<OrderItemInput>> {
    let mut out: Vec<OrderItemInput> = Vec::with_capacity(items.len());
    for item in items {
        match out.iter_mut().find(|i| i.menu_item_id == item.menu_item_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.checked_add(item.quantity).ok_or_else(|| {
                    AppError::validation("Quantity is too large")
                        .with_detail("menuItemId", item.menu_item_id)
                })?;
            }
            None => out.push(item),
        }
    }
    Ok(out)
}

fn validate_items(items: Option<Vec<OrderItemInput>>) -> AppResult<Vec<OrderItemInput>> {
    let items = items.unwrap_or_default();
    if items.is_empty() {
        return Err(AppError::with_message(
            ErrorCode::OrderEmpty,
            "Order must contain at least one item",
        ));
    }
    for (index, item) in items.iter().enumerate() {
        if item.quantity < 1 {
            return Err(AppError::validation("Quantity must be at least 1")
                .with_detail("index", index)
                .with_detail("menuItemId", item.menu_item_id));
        }
        if item.price.is_sign_negative() || item.price > MAX_AMOUNT {
            return Err(AppError::new(ErrorCode::InvalidAmount)
                .with_detail("index", index)
                .with_detail("menuItemId", item.menu_item_id));
        }
        if item.item_name.trim().is_empty() {
            return Err(AppError::validation("Item name is required").with_detail("index", index));
        }
    }
    collapse_items(items)
}

fn parse_delivery_type(raw: Option<&str>, default: DeliveryType) -> AppResult<DeliveryType> {
    match non_empty(raw) {
        None => Ok(default),
        Some(s) => DeliveryType::parse(s).ok_or_else(|| {
            AppError::validation(format!("Unknown delivery type: {s}"))
                .with_detail("deliveryType", s)
        }),
    }
}

fn subtotal_or_override(items: &[OrderItemInput], total: Option<Decimal>) -> AppResult<Decimal> {
    match total {
        Some(t) if t.is_sign_negative() => Err(AppError::new(ErrorCode::InvalidAmount)),
        Some(t) if t > MAX_AMOUNT => Err(amount_too_large("totalAmount")),
        Some(t) => Ok(t),
        None => line_subtotal(items).ok_or_else(|| amount_too_large("items")),
    }
}

fn owned(raw: Option<String>) -> Option<String> {
    non_empty(raw.as_deref()).map(str::to_owned)
}

/// Validate a submission. The tenant is checked first so a malformed
/// restaurant id never reaches the store.
pub fn validate_order(req: PlaceOrderRequest) -> AppResult<NewOrder> {
    let restaurant_id = parse_restaurant_id(req.restaurant_id.as_deref())?;
    let items = validate_items(req.items)?;
    let table_number = owned(req.table_number);
    let table_category_id = parse_optional_id("tableCategoryId", req.table_category_id.as_deref())?;
    let staff_id = parse_optional_id("staffId", req.staff_id.as_deref())?;

    let default_delivery = if table_number.is_some() {
        DeliveryType::DineIn
    } else {
        DeliveryType::Takeaway
    };
    let delivery_type = parse_delivery_type(req.delivery_type.as_deref(), default_delivery)?;
    let subtotal = subtotal_or_override(&items, req.total_amount)?;

    Ok(NewOrder {
        restaurant_id,
        table_number,
        table_category_id,
        customer_name: owned(req.customer_name),
        customer_phone: owned(req.customer_phone),
        customer_email: owned(req.customer_email),
        delivery_type,
        payment_type: owned(req.payment_type),
        subtotal,
        is_opted_in: req.is_opted_in,
        staff_id,
        items,
    })
}

/// A validated, already paid order entered after the fact
#[derive(Debug, Clone, PartialEq)]
pub struct ManualOrder {
    pub restaurant_id: i64,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub delivery_type: DeliveryType,
    pub payment_type: Option<String>,
    pub total: Decimal,
    pub order_date: Option<chrono::NaiveDate>,
    pub items: Vec<OrderItemInput>,
}

/// Lines are optional here; without them the total must be given.
pub fn validate_manual_order(req: ManualOrderRequest) -> AppResult<ManualOrder> {
    let restaurant_id = parse_restaurant_id(req.restaurant_id.as_deref())?;
    let customer_name =
        owned(req.customer_name).ok_or_else(|| AppError::required("customerName"))?;
    let items = match req.items {
        Some(items) if !items.is_empty() => validate_items(Some(items))?,
        _ if req.total_amount.is_none() => return Err(AppError::required("totalAmount")),
        _ => Vec::new(),
    };
    let delivery_type = parse_delivery_type(req.delivery_type.as_deref(), DeliveryType::Takeaway)?;
    let total = subtotal_or_override(&items, req.total_amount)?;

    Ok(ManualOrder {
        restaurant_id,
        customer_name,
        customer_phone: owned(req.customer_phone),
        customer_email: owned(req.customer_email),
        delivery_type,
        payment_type: owned(req.payment_type),
        total,
        order_date: req.order_date,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(menu_item_id: i64, quantity: i32, price: i64) -> OrderItemInput {
        OrderItemInput {
            menu_item_id,
            item_name: format!("Item {menu_item_id}"),
            quantity,
            price: Decimal::from(price),
        }
    }

    fn request(items: Vec<OrderItemInput>) -> PlaceOrderRequest {
        PlaceOrderRequest {
            restaurant_id: Some("1".into()),
            table_number: Some("5".into()),
            table_category_id: Some("2".into()),
            items: Some(items),
            ..Default::default()
        }
    }

    #[test]
    fn placement_decision() {
        assert_eq!(plan_placement(None), Placement::Create);
        let open = OpenOrder { id: 9, bill_no: 41 };
        assert_eq!(plan_placement(Some(open)), Placement::Merge(open));
    }

    #[test]
    fn outcome_accessors_and_wire_shape() {
        let merged = PlacementOutcome::Merged {
            order_id: 9,
            bill_no: 41,
        };
        assert_eq!(merged.order_id(), 9);
        assert_eq!(merged.bill_no(), 41);

        let json = serde_json::to_value(PlacementOutcome::Created {
            order_id: 1,
            bill_no: 2,
        })
        .unwrap();
        assert_eq!(json["outcome"], "created");
        assert_eq!(json["billNo"], 2);
    }

    #[test]
    fn transitions() {
        assert_eq!(
            StatusTransition::from(OrderStatus::Accepted),
            StatusTransition::Accept
        );
        assert_eq!(
            StatusTransition::from(OrderStatus::Served),
            StatusTransition::Serve
        );
        assert_eq!(
            StatusTransition::from(OrderStatus::Pending),
            StatusTransition::Assign(OrderStatus::Pending)
        );
        assert_eq!(
            StatusTransition::from(OrderStatus::Delivered),
            StatusTransition::Assign(OrderStatus::Delivered)
        );
    }

    #[test]
    fn status_is_required_and_known() {
        assert_eq!(parse_status(None).unwrap_err().code, ErrorCode::RequiredField);
        assert_eq!(parse_status(Some("  ")).unwrap_err().code, ErrorCode::RequiredField);
        assert_eq!(
            parse_status(Some("cooking")).unwrap_err().code,
            ErrorCode::InvalidOrderStatus
        );
        assert_eq!(parse_status(Some("Served")).unwrap(), OrderStatus::Served);
    }

    #[test]
    fn final_status_by_delivery_type() {
        assert_eq!(final_status("Dine-in"), OrderStatus::Paid);
        assert_eq!(final_status("dine-in"), OrderStatus::Paid);
        assert_eq!(final_status("delivery"), OrderStatus::Delivered);
        assert_eq!(final_status("takeaway"), OrderStatus::Delivered);
        assert_eq!(final_status("something else"), OrderStatus::Delivered);
    }

    #[test]
    fn subtotal_sums_lines() {
        assert_eq!(
            line_subtotal(&[item(10, 2, 100), item(11, 1, 50)]),
            Some(Decimal::from(250))
        );
    }

    #[test]
    fn max_amount_matches_the_column() {
        assert_eq!(MAX_AMOUNT.to_string(), "9999999999.99");
    }

    #[test]
    fn huge_amounts_are_rejected_not_overflowed() {
        let mut line = item(10, 1000, 0);
        line.price = Decimal::from_str_exact("70000000000000000000000000000").unwrap();
        assert_eq!(
            validate_order(request(vec![line])).unwrap_err().code,
            ErrorCode::InvalidAmount
        );

        // Each price fits, the sum does not
        let line = OrderItemInput {
            price: MAX_AMOUNT,
            ..item(10, 1000, 0)
        };
        assert_eq!(line_subtotal(std::slice::from_ref(&line)), None);
        assert_eq!(
            validate_order(request(vec![line])).unwrap_err().code,
            ErrorCode::InvalidAmount
        );

        let mut req = request(vec![item(10, 1, 100)]);
        req.total_amount = Some(MAX_AMOUNT + Decimal::ONE);
        assert_eq!(validate_order(req).unwrap_err().code, ErrorCode::InvalidAmount);
    }

    #[test]
    fn collapsed_quantity_must_fit() {
        let err = validate_order(request(vec![item(1, i32::MAX, 1), item(1, 1, 1)])).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn validation_is_deterministic() {
        let req = request(vec![item(10, 2, 100), item(10, 1, 100)]);
        assert_eq!(validate_order(req.clone()).unwrap(), validate_order(req).unwrap());
    }

    #[test]
    fn repeated_items_are_collapsed() {
        let items =
            collapse_items(vec![item(10, 2, 100), item(11, 1, 50), item(10, 1, 90)]).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].menu_item_id, 10);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[0].price, Decimal::from(100));
    }

    #[test]
    fn validate_table_order() {
        let order = validate_order(request(vec![item(10, 2, 100)])).unwrap();
        assert_eq!(order.restaurant_id, 1);
        assert_eq!(order.table(), Some(("5", 2)));
        assert_eq!(order.delivery_type, DeliveryType::DineIn);
        assert_eq!(order.subtotal, Decimal::from(200));
    }

    #[test]
    fn client_total_overrides_line_sum() {
        let mut req = request(vec![item(10, 2, 100)]);
        req.total_amount = Some(Decimal::from(210));
        assert_eq!(validate_order(req).unwrap().subtotal, Decimal::from(210));

        let mut req = request(vec![item(10, 2, 100)]);
        req.total_amount = Some(Decimal::from(-1));
        assert_eq!(validate_order(req).unwrap_err().code, ErrorCode::InvalidAmount);
    }

    #[test]
    fn table_less_order_is_takeaway() {
        let mut req = request(vec![item(10, 1, 100)]);
        req.table_number = None;
        req.table_category_id = None;
        let order = validate_order(req).unwrap();
        assert_eq!(order.table(), None);
        assert_eq!(order.delivery_type, DeliveryType::Takeaway);
    }

    #[test]
    fn table_without_category_has_no_table_ref() {
        let mut req = request(vec![item(10, 1, 100)]);
        req.table_category_id = None;
        let order = validate_order(req).unwrap();
        assert_eq!(order.table_number.as_deref(), Some("5"));
        assert_eq!(order.table(), None);
    }

    #[test]
    fn tenant_is_checked_before_items() {
        let mut req = request(vec![]);
        req.restaurant_id = Some("abc".into());
        assert_eq!(
            validate_order(req).unwrap_err().code,
            ErrorCode::InvalidRestaurantId
        );
    }

    #[test]
    fn empty_or_missing_items_are_rejected() {
        assert_eq!(
            validate_order(request(vec![])).unwrap_err().code,
            ErrorCode::OrderEmpty
        );
        let mut req = request(vec![]);
        req.items = None;
        assert_eq!(validate_order(req).unwrap_err().code, ErrorCode::OrderEmpty);
    }

    #[test]
    fn bad_lines_are_rejected() {
        assert_eq!(
            validate_order(request(vec![item(10, 0, 100)])).unwrap_err().code,
            ErrorCode::ValidationFailed
        );
        assert_eq!(
            validate_order(request(vec![item(10, 1, -5)])).unwrap_err().code,
            ErrorCode::InvalidAmount
        );
    }

    #[test]
    fn unknown_delivery_type_is_rejected() {
        let mut req = request(vec![item(10, 1, 100)]);
        req.delivery_type = Some("drone".into());
        assert_eq!(
            validate_order(req).unwrap_err().code,
            ErrorCode::ValidationFailed
        );
    }

    #[test]
    fn manual_order_validation() {
        let req = ManualOrderRequest {
            restaurant_id: Some("3".into()),
            customer_name: Some("Ravi".into()),
            items: Some(vec![item(1, 2, 30)]),
            delivery_type: Some("Delivery".into()),
            ..Default::default()
        };
        let order = validate_manual_order(req).unwrap();
        assert_eq!(order.restaurant_id, 3);
        assert_eq!(order.total, Decimal::from(60));
        assert_eq!(order.delivery_type, DeliveryType::Delivery);
    }

    #[test]
    fn manual_order_without_lines_needs_a_total() {
        let req = ManualOrderRequest {
            restaurant_id: Some("3".into()),
            customer_name: Some("Ravi".into()),
            ..Default::default()
        };
        assert_eq!(
            validate_manual_order(req.clone()).unwrap_err().code,
            ErrorCode::RequiredField
        );

        let order = validate_manual_order(ManualOrderRequest {
            total_amount: Some(Decimal::from(450)),
            ..req
        })
        .unwrap();
        assert!(order.items.is_empty());
        assert_eq!(order.total, Decimal::from(450));
    }

    #[test]
    fn manual_order_needs_a_customer() {
        let req = ManualOrderRequest {
            restaurant_id: Some("3".into()),
            total_amount: Some(Decimal::from(450)),
            ..Default::default()
        };
        assert_eq!(
            validate_manual_order(req).unwrap_err().code,
            ErrorCode::RequiredField
        );
    }
}
