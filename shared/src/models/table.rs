//! Floor Model: table categories and tables

use serde::{Deserialize, Serialize};

use crate::tenant::lenient_string;

pub const TABLE_AVAILABLE: &str = "available";
pub const TABLE_OCCUPIED: &str = "occupied";

/// Table category (dining area: AC hall, terrace, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct TableCategory {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
}

/// Create / rename category payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCategoryInput {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Table row, listed with its category name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct RestaurantTable {
    pub id: i64,
    pub restaurant_id: i64,
    pub table_number: String,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub status: String,
}

/// Create / update table payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantTableInput {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub table_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Waiter call raised from a table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct WaiterCall {
    pub id: i64,
    pub restaurant_id: i64,
    pub category_id: Option<i64>,
    pub table_id: String,
    pub message: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
