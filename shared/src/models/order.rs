//! Order Model
//!
//! An order belongs to one restaurant, optionally sits on a table
//! (table number + table category) and carries its lines with the price
//! captured at order time.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::tenant::lenient_string;

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Served,
    Delivered,
    Paid,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        Self::Pending,
        Self::Accepted,
        Self::Served,
        Self::Delivered,
        Self::Paid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Served => "served",
            Self::Delivered => "delivered",
            Self::Paid => "paid",
        }
    }

    /// Parse a status as clients send it (case-insensitive).
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(raw))
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the order reaches the customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryType {
    #[serde(rename = "dine-in")]
    DineIn,
    #[serde(rename = "delivery")]
    Delivery,
    #[serde(rename = "takeaway")]
    Takeaway,
}

impl DeliveryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DineIn => "dine-in",
            Self::Delivery => "delivery",
            Self::Takeaway => "takeaway",
        }
    }

    /// Parse the loosely spelled values clients send
    /// (`Dine-in`, `dine in`, `DINE_IN`, `Take Away`, ...).
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "dinein" => Some(Self::DineIn),
            "delivery" => Some(Self::Delivery),
            "takeaway" | "takeout" | "parcel" => Some(Self::Takeaway),
            _ => None,
        }
    }
}

/// Order row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub restaurant_id: i64,
    pub bill_no: i64,
    pub table_number: Option<String>,
    pub table_category_id: Option<i64>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub delivery_type: String,
    pub payment_type: Option<String>,
    pub total_amount: Decimal,
    pub is_paid: bool,
    pub is_opted_in: bool,
    pub status: String,
    pub staff_id: Option<i64>,
    pub order_date: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub served_at: Option<DateTime<Utc>>,
}

/// Order line (price is a snapshot taken when the line was ordered)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub item_name: String,
    pub quantity: i32,
    pub quantity_served: i32,
    pub price: Decimal,
}

/// Order with its lines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderLine>,
}

/// Order as listed on the orders screen, with display times
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListEntry {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderLine>,
    pub accepted_time: Option<String>,
    pub served_time: Option<String>,
}

/// One submitted line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    #[serde(alias = "menuid", alias = "menu_item_id")]
    pub menu_item_id: i64,
    #[serde(alias = "itemname", alias = "item_name")]
    pub item_name: String,
    pub quantity: i32,
    pub price: Decimal,
}

/// Order submission (create or merge)
///
/// Accepts both camelCase keys and the legacy all-lowercase ones.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(default, alias = "restaurantid", deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    #[serde(default, alias = "tablenumber", deserialize_with = "lenient_string")]
    pub table_number: Option<String>,
    #[serde(
        default,
        alias = "categoryid",
        alias = "categoryId",
        deserialize_with = "lenient_string"
    )]
    pub table_category_id: Option<String>,
    #[serde(default, alias = "customername")]
    pub customer_name: Option<String>,
    #[serde(default, alias = "customerno")]
    pub customer_phone: Option<String>,
    #[serde(default, alias = "email_id")]
    pub customer_email: Option<String>,
    #[serde(default, alias = "deliverytype")]
    pub delivery_type: Option<String>,
    #[serde(default, alias = "paymenttype")]
    pub payment_type: Option<String>,
    #[serde(default, alias = "totalamount")]
    pub total_amount: Option<Decimal>,
    #[serde(default, alias = "isoptedin")]
    pub is_opted_in: bool,
    #[serde(default, alias = "staff_id", deserialize_with = "lenient_string")]
    pub staff_id: Option<String>,
    #[serde(default, alias = "orderitems")]
    pub items: Option<Vec<OrderItemInput>>,
}

/// Manually entered, already paid order
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualOrderRequest {
    #[serde(default, alias = "restaurantid", deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    #[serde(default, alias = "customername")]
    pub customer_name: Option<String>,
    #[serde(default, alias = "customerno")]
    pub customer_phone: Option<String>,
    #[serde(default, alias = "email_id")]
    pub customer_email: Option<String>,
    #[serde(default, alias = "deliverytype")]
    pub delivery_type: Option<String>,
    #[serde(default, alias = "paymenttype")]
    pub payment_type: Option<String>,
    #[serde(default, alias = "totalamount")]
    pub total_amount: Option<Decimal>,
    #[serde(default, alias = "orderdate")]
    pub order_date: Option<NaiveDate>,
    #[serde(default, alias = "orderitems")]
    pub items: Option<Vec<OrderItemInput>>,
}

/// Kitchen ticket: an unpaid order reduced to its outstanding quantities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KitchenTicket {
    pub id: i64,
    pub bill_no: i64,
    pub table_number: Option<String>,
    pub category_name: Option<String>,
    pub waiter_name: Option<String>,
    pub placed_time: DateTime<Utc>,
    pub status: String,
    pub accepted_time: Option<DateTime<Utc>>,
    pub served_time: Option<DateTime<Utc>>,
    pub items: Vec<KitchenItem>,
}

/// Outstanding portion of one line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitchenItem {
    pub name: String,
    pub quantity: i32,
}

/// Distinct customer contact found on orders
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!(OrderStatus::parse("Served"), Some(OrderStatus::Served));
        assert_eq!(OrderStatus::parse(" paid "), Some(OrderStatus::Paid));
        assert_eq!(OrderStatus::parse("cooking"), None);
        assert_eq!(
            serde_json::to_string(&OrderStatus::Accepted).unwrap(),
            "\"accepted\""
        );
    }

    #[test]
    fn delivery_type_spellings() {
        for raw in ["Dine-in", "dine-in", "DINE IN", "dine_in", "DineIn"] {
            assert_eq!(DeliveryType::parse(raw), Some(DeliveryType::DineIn), "{raw}");
        }
        assert_eq!(DeliveryType::parse("Take Away"), Some(DeliveryType::Takeaway));
        assert_eq!(DeliveryType::parse("Delivery"), Some(DeliveryType::Delivery));
        assert_eq!(DeliveryType::parse("drone"), None);
    }

    #[test]
    fn place_order_accepts_legacy_keys() {
        let json = r#"{
            "restaurantid": "1",
            "tablenumber": 5,
            "categoryid": 2,
            "customername": "Asha",
            "deliverytype": "Dine-in",
            "totalamount": 200,
            "orderitems": [{"menuid": 10, "itemname": "Paneer Tikka", "quantity": 2, "price": 100}]
        }"#;
        let req: PlaceOrderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.restaurant_id.as_deref(), Some("1"));
        assert_eq!(req.table_number.as_deref(), Some("5"));
        assert_eq!(req.table_category_id.as_deref(), Some("2"));
        assert_eq!(req.total_amount, Some(Decimal::from(200)));
        let items = req.items.unwrap();
        assert_eq!(items[0].menu_item_id, 10);
        assert_eq!(items[0].quantity, 2);
    }

    #[test]
    fn place_order_accepts_camel_case_keys() {
        let json = r#"{
            "restaurantId": 1,
            "tableNumber": "5",
            "tableCategoryId": "2",
            "items": [{"menuItemId": 10, "itemName": "Dal", "quantity": 1, "price": 80.5}]
        }"#;
        let req: PlaceOrderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.restaurant_id.as_deref(), Some("1"));
        assert_eq!(req.table_category_id.as_deref(), Some("2"));
        assert_eq!(req.items.unwrap()[0].price, Decimal::new(805, 1));
    }
}
