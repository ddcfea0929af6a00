//! Menu items and menu categories

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{MenuCategoryGroup, MenuItem, MenuItemInput, UNCATEGORIZED};
use shared::tenant::{TenantQuery, lenient_string, parse_restaurant_id};

use crate::db::menu::{self as store, MenuItemFields};
use crate::error::internal;
use crate::state::AppState;
use crate::util::non_empty;

use super::{ApiResult, CreatedResult, PathId, created};

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::MenuItemNotFound).with_detail("id", id)
}

/// Validate a create/replace payload.
fn menu_fields(input: &MenuItemInput) -> AppResult<(i64, MenuItemFields)> {
    let restaurant_id = parse_restaurant_id(input.restaurant_id.as_deref())?;
    let required = |value: Option<&str>, field: &'static str| {
        non_empty(value)
            .map(str::to_owned)
            .ok_or_else(|| AppError::required(field))
    };
    let optional = |value: Option<&str>| non_empty(value).map(str::to_owned);

    let price = input.price.ok_or_else(|| AppError::required("price"))?;
    if price < Decimal::ZERO {
        return Err(AppError::new(ErrorCode::InvalidAmount).with_detail("field", "price"));
    }

    let fields = MenuItemFields {
        menu_id: required(input.menu_id.as_deref(), "menuId")?,
        item_name: required(input.item_name.as_deref(), "itemName")?,
        description: optional(input.description.as_deref()),
        price,
        category: required(input.category.as_deref(), "category")?,
        ingredients: optional(input.ingredients.as_deref()),
        image: optional(input.image.as_deref()),
        is_available: input.is_available.unwrap_or(true),
    };
    Ok((restaurant_id, fields))
}

/// Group items by category, alphabetically; blank categories are `Uncategorized`.
fn group_by_category(items: Vec<MenuItem>) -> Vec<MenuCategoryGroup> {
    let mut groups: BTreeMap<String, Vec<MenuItem>> = BTreeMap::new();
    for item in items {
        let category = match item.category.trim() {
            "" => UNCATEGORIZED.to_owned(),
            c => c.to_owned(),
        };
        groups.entry(category).or_default().push(item);
    }
    groups
        .into_iter()
        .map(|(category, mut items)| {
            items.sort_by(|a, b| a.item_name.cmp(&b.item_name));
            MenuCategoryGroup { category, items }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedQuery {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub show_all: Option<String>,
}

/// GET /api/menuitems-grouped
pub async fn grouped(
    State(state): State<AppState>,
    Query(query): Query<GroupedQuery>,
) -> ApiResult<Vec<MenuCategoryGroup>> {
    let restaurant_id = parse_restaurant_id(query.restaurant_id.as_deref())?;
    let show_all = query
        .show_all
        .as_deref()
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));

    let items = store::list(&state.pool, restaurant_id, show_all)
        .await
        .map_err(internal)?;
    Ok(Json(group_by_category(items)))
}

/// POST /api/menuitems
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<MenuItemInput>,
) -> CreatedResult<MenuItem> {
    let (restaurant_id, fields) = menu_fields(&input)?;
    let item = store::create(&state.pool, restaurant_id, &fields)
        .await
        .map_err(internal)?;
    tracing::info!(restaurant_id, menu_item_id = item.id, "Menu item created");
    Ok(created(item))
}

/// PUT /api/menuitems/{id}
pub async fn replace(
    State(state): State<AppState>,
    PathId(id): PathId,
    Json(input): Json<MenuItemInput>,
) -> ApiResult<MenuItem> {
    let (restaurant_id, fields) = menu_fields(&input)?;
    store::replace(&state.pool, restaurant_id, id, &fields)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantBody {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
}

/// PUT /api/menuitems/{id}/toggle
///
/// The tenant comes from the body, or the query string for bodiless clients.
pub async fn toggle(
    State(state): State<AppState>,
    PathId(id): PathId,
    Query(query): Query<TenantQuery>,
    body: Option<Json<TenantBody>>,
) -> ApiResult<MenuItem> {
    let raw = body
        .and_then(|Json(b)| b.restaurant_id)
        .or(query.restaurant_id);
    let restaurant_id = parse_restaurant_id(raw.as_deref())?;

    store::toggle_availability(&state.pool, restaurant_id, id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// DELETE /api/menuitems/{id}
pub async fn retire(
    State(state): State<AppState>,
    PathId(id): PathId,
    Query(query): Query<TenantQuery>,
) -> Result<StatusCode, AppError> {
    let restaurant_id = query.restaurant_id()?;
    if !store::retire(&state.pool, restaurant_id, id)
        .await
        .map_err(internal)?
    {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/menu-item-categories
pub async fn categories(
    State(state): State<AppState>,
    Query(query): Query<TenantQuery>,
) -> ApiResult<Vec<String>> {
    let restaurant_id = query.restaurant_id()?;
    let categories = store::categories(&state.pool, restaurant_id)
        .await
        .map_err(internal)?;
    Ok(Json(categories))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DissolvedCategory {
    pub category: String,
    pub moved_items: u64,
}

/// DELETE /api/menu-item-categories/{name}
pub async fn dissolve_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<TenantQuery>,
) -> ApiResult<DissolvedCategory> {
    let restaurant_id = query.restaurant_id()?;
    let category = name.trim();
    if category.is_empty() {
        return Err(AppError::required("name"));
    }
    if category.eq_ignore_ascii_case(UNCATEGORIZED) {
        return Err(AppError::new(ErrorCode::CategoryProtected).with_detail("category", category));
    }

    let moved_items = store::dissolve_category(&state.pool, restaurant_id, category)
        .await
        .map_err(internal)?;
    if moved_items == 0 {
        return Err(AppError::new(ErrorCode::CategoryNotFound).with_detail("category", category));
    }
    tracing::info!(restaurant_id, category, moved_items, "Menu category dissolved");
    Ok(Json(DissolvedCategory {
        category: category.to_owned(),
        moved_items,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, name: &str, category: &str) -> MenuItem {
        MenuItem {
            id,
            restaurant_id: 1,
            menu_id: format!("M{id}"),
            item_name: name.into(),
            description: None,
            price: Decimal::from(100),
            category: category.into(),
            ingredients: None,
            image: None,
            is_available: true,
        }
    }

    #[test]
    fn groups_sorted_with_uncategorized_fallback() {
        let groups = group_by_category(vec![
            item(1, "Naan", "Breads"),
            item(2, "Lassi", ""),
            item(3, "Dal", "Curries"),
            item(4, "Kulcha", "Breads"),
        ]);
        let names: Vec<_> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(names, ["Breads", "Curries", "Uncategorized"]);
        assert_eq!(groups[0].items[0].item_name, "Kulcha");
        assert_eq!(groups[2].items[0].id, 2);
    }

    #[test]
    fn create_payload_requires_core_fields() {
        let input: MenuItemInput = serde_json::from_value(serde_json::json!({
            "restaurantId": 1, "menuId": 101, "itemName": "Dal", "price": 120, "category": "Curries"
        }))
        .unwrap();
        let (rid, fields) = menu_fields(&input).unwrap();
        assert_eq!(rid, 1);
        assert_eq!(fields.menu_id, "101");
        assert!(fields.is_available);

        let missing: MenuItemInput = serde_json::from_value(serde_json::json!({
            "restaurantId": 1, "menuId": "101", "itemName": "Dal", "price": 120
        }))
        .unwrap();
        assert_eq!(menu_fields(&missing).unwrap_err().code, ErrorCode::RequiredField);

        let negative: MenuItemInput = serde_json::from_value(serde_json::json!({
            "restaurantId": 1, "menuId": "1", "itemName": "Dal", "price": -1, "category": "C"
        }))
        .unwrap();
        assert_eq!(menu_fields(&negative).unwrap_err().code, ErrorCode::InvalidAmount);
    }
}
