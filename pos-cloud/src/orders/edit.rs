//! Single-field order edits from the orders screen

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{DeliveryType, OrderStatus};

/// A typed value for one editable column
#[derive(Debug, Clone, PartialEq)]
pub enum EditValue {
    Text(Option<String>),
    Amount(Decimal),
    Date(NaiveDate),
    Flag(bool),
}

/// Validated edit: target column plus its value
#[derive(Debug, Clone, PartialEq)]
pub struct OrderEdit {
    pub column: &'static str,
    pub value: EditValue,
}

/// Accepted field names (camelCase and legacy) and their columns
const EDITABLE: &[(&str, &str, &str)] = &[
    ("customerName", "customername", "customer_name"),
    ("customerPhone", "customerno", "customer_phone"),
    ("customerEmail", "email_id", "customer_email"),
    ("deliveryType", "deliverytype", "delivery_type"),
    ("paymentType", "paymenttype", "payment_type"),
    ("totalAmount", "totalamount", "total_amount"),
    ("orderDate", "orderdate", "order_date"),
    ("isPaid", "ispaid", "is_paid"),
    ("tableNumber", "tablenumber", "table_number"),
    ("status", "status", "status"),
];

fn mismatch(field: &str, expected: &str) -> AppError {
    AppError::validation(format!("{field} must be {expected}")).with_detail("field", field)
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn amount(field: &str, value: &Value) -> AppResult<Decimal> {
    let parsed = match value {
        Value::Number(n) => n.to_string().parse::<Decimal>().ok(),
        Value::String(s) => s.trim().parse::<Decimal>().ok(),
        _ => None,
    };
    match parsed {
        Some(d) if !d.is_sign_negative() && d <= super::MAX_AMOUNT => Ok(d),
        _ => Err(mismatch(field, "a non-negative amount")),
    }
}

fn flag(field: &str, value: &Value) -> AppResult<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(mismatch(field, "true or false")),
    }
}

fn date(field: &str, value: &Value) -> AppResult<NaiveDate> {
    value
        .as_str()
        .and_then(|s| {
            let s = s.trim();
            // accept full timestamps, keep the date part
            NaiveDate::parse_from_str(s.get(..10).unwrap_or(s), "%Y-%m-%d").ok()
        })
        .ok_or_else(|| mismatch(field, "a date (YYYY-MM-DD)"))
}

/// Check the field against the whitelist, then type-check the value.
pub fn parse_edit(field: &str, value: &Value) -> AppResult<OrderEdit> {
    let column = EDITABLE
        .iter()
        .find(|(camel, legacy, _)| *camel == field || *legacy == field)
        .map(|(_, _, column)| *column)
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::OrderFieldNotEditable,
                format!("Field '{field}' cannot be edited"),
            )
        })?;

    let value = match column {
        "total_amount" => EditValue::Amount(amount(field, value)?),
        "order_date" => EditValue::Date(date(field, value)?),
        "is_paid" => EditValue::Flag(flag(field, value)?),
        "status" => {
            let status = text(value)
                .as_deref()
                .and_then(OrderStatus::parse)
                .ok_or_else(|| mismatch(field, "a known order status"))?;
            EditValue::Text(Some(status.as_str().to_owned()))
        }
        "delivery_type" => {
            let delivery = text(value)
                .as_deref()
                .and_then(DeliveryType::parse)
                .ok_or_else(|| mismatch(field, "dine-in, delivery or takeaway"))?;
            EditValue::Text(Some(delivery.as_str().to_owned()))
        }
        _ => match value {
            Value::Null => EditValue::Text(None),
            Value::String(_) | Value::Number(_) => EditValue::Text(text(value)),
            _ => return Err(mismatch(field, "text")),
        },
    };

    Ok(OrderEdit { column, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_are_forbidden() {
        let err = parse_edit("billNo", &json!(5)).unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderFieldNotEditable);
        assert_eq!(err.http_status(), http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn legacy_names_map_to_columns() {
        let edit = parse_edit("customerno", &json!("98450 12345")).unwrap();
        assert_eq!(edit.column, "customer_phone");
        assert_eq!(edit.value, EditValue::Text(Some("98450 12345".into())));
    }

    #[test]
    fn amounts_are_type_checked() {
        let edit = parse_edit("totalAmount", &json!(412.5)).unwrap();
        assert_eq!(edit.value, EditValue::Amount(Decimal::new(4125, 1)));
        assert_eq!(
            parse_edit("totalAmount", &json!("12.00")).unwrap().value,
            EditValue::Amount(Decimal::new(1200, 2))
        );
        assert!(parse_edit("totalAmount", &json!("lots")).is_err());
        assert!(parse_edit("totalAmount", &json!(-1)).is_err());
        assert!(parse_edit("totalAmount", &json!("10000000000")).is_err());
    }

    #[test]
    fn flags_and_dates() {
        assert_eq!(
            parse_edit("isPaid", &json!(true)).unwrap().value,
            EditValue::Flag(true)
        );
        assert!(parse_edit("isPaid", &json!("yes")).is_err());
        assert_eq!(
            parse_edit("orderDate", &json!("2025-07-27T10:00:00Z")).unwrap().value,
            EditValue::Date(NaiveDate::from_ymd_opt(2025, 7, 27).unwrap())
        );
        assert!(parse_edit("orderDate", &json!("27/07/2025")).is_err());
    }

    #[test]
    fn status_and_delivery_type_are_normalized() {
        assert_eq!(
            parse_edit("status", &json!("Served")).unwrap().value,
            EditValue::Text(Some("served".into()))
        );
        assert!(parse_edit("status", &json!("cooking")).is_err());
        assert_eq!(
            parse_edit("deliveryType", &json!("Dine In")).unwrap().value,
            EditValue::Text(Some("dine-in".into()))
        );
    }

    #[test]
    fn text_fields_can_be_cleared() {
        assert_eq!(
            parse_edit("customerEmail", &json!(null)).unwrap().value,
            EditValue::Text(None)
        );
        assert!(parse_edit("tableNumber", &json!({"n": 1})).is_err());
    }
}
