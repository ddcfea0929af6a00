//! Inventory and expense Model

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::tenant::lenient_string;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: i64,
    pub restaurant_id: i64,
    pub item: String,
    pub quantity: Decimal,
    pub unit: String,
    pub state: String,
    pub threshold: Decimal,
    pub rate: Option<Decimal>,
    pub total_price: Option<Decimal>,
    pub supplier_name: Option<String>,
    pub supplier_number: Option<String>,
    pub date_received: Option<NaiveDate>,
}

/// Create payload; also used as a partial update where absent fields keep their value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryInput {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    #[serde(default)]
    pub item: Option<String>,
    #[serde(default)]
    pub quantity: Option<Decimal>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub threshold: Option<Decimal>,
    #[serde(default)]
    pub rate: Option<Decimal>,
    #[serde(default)]
    pub total_price: Option<Decimal>,
    #[serde(default)]
    pub supplier_name: Option<String>,
    #[serde(default)]
    pub supplier_number: Option<String>,
    #[serde(default)]
    pub date_received: Option<NaiveDate>,
}

impl InventoryInput {
    /// True when no editable field is present
    pub fn is_empty(&self) -> bool {
        self.item.is_none()
            && self.quantity.is_none()
            && self.unit.is_none()
            && self.state.is_none()
            && self.threshold.is_none()
            && self.rate.is_none()
            && self.total_price.is_none()
            && self.supplier_name.is_none()
            && self.supplier_number.is_none()
            && self.date_received.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: i64,
    pub restaurant_id: i64,
    pub description: String,
    pub amount: Decimal,
    pub total_paid: Decimal,
    pub paid_by: Option<String>,
    pub paid_to: Option<String>,
    pub phone_number: Option<String>,
    pub expense_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseInput {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub total_paid: Option<Decimal>,
    #[serde(default)]
    pub paid_by: Option<String>,
    #[serde(default)]
    pub paid_to: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default, alias = "date")]
    pub expense_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub total_sales: Decimal,
    pub total_expenses: Decimal,
    pub net_profit: Decimal,
    pub order_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_inventory_update_is_detected() {
        let input: InventoryInput = serde_json::from_str(r#"{"restaurantId": 1}"#).unwrap();
        assert!(input.is_empty());

        let input: InventoryInput =
            serde_json::from_str(r#"{"restaurantId": 1, "quantity": 2.5}"#).unwrap();
        assert!(!input.is_empty());
    }
}
