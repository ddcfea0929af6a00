//! Menu Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::tenant::lenient_string;

/// Category used when an item has none
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: i64,
    pub restaurant_id: i64,
    pub menu_id: String,
    pub item_name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category: String,
    pub ingredients: Option<String>,
    pub image: Option<String>,
    pub is_available: bool,
}

/// Create / replace menu item payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemInput {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub menu_id: Option<String>,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_available: Option<bool>,
}

/// Items of one category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuCategoryGroup {
    pub category: String,
    pub items: Vec<MenuItem>,
}
