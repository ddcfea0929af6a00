//! Tenant (restaurant) identifier handling
//!
//! Clients send `restaurantId` either as a JSON number or as a string, and
//! query strings always carry it as text. Everything is normalized to a raw
//! string on the way in and validated once, before any store access.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{AppError, AppResult, ErrorCode};

/// Parse a raw tenant identifier into the store key.
///
/// Only positive integers are valid keys.
pub fn parse_restaurant_id(raw: Option<&str>) -> AppResult<i64> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::required("restaurantId"))?;

    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::new(ErrorCode::InvalidRestaurantId).with_detail("restaurantId", raw)),
    }
}

/// Parse an optional numeric reference (table category, staff, ...).
///
/// Absent or blank values are `None`; anything else must be a positive integer.
pub fn parse_optional_id(field: &'static str, raw: Option<&str>) -> AppResult<Option<i64>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => match s.parse::<i64>() {
            Ok(id) if id > 0 => Ok(Some(id)),
            _ => Err(AppError::validation(format!("{field} must be a positive integer"))
                .with_detail("field", field)),
        },
    }
}

/// Serde helper: accept a string, a number or null and keep it as text.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

/// Query string carrying only the tenant, used by most list and by-id routes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantQuery {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
}

impl TenantQuery {
    pub fn restaurant_id(&self) -> AppResult<i64> {
        parse_restaurant_id(self.restaurant_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_positive_integers() {
        assert_eq!(parse_restaurant_id(Some("1")).unwrap(), 1);
        assert_eq!(parse_restaurant_id(Some(" 42 ")).unwrap(), 42);
    }

    #[test]
    fn rejects_missing_and_malformed_ids() {
        let missing = parse_restaurant_id(None).unwrap_err();
        assert_eq!(missing.code, ErrorCode::RequiredField);

        for raw in ["", "abc", "1.5", "-3", "0", "12abc"] {
            let err = parse_restaurant_id(Some(raw)).unwrap_err();
            assert!(
                matches!(
                    err.code,
                    ErrorCode::InvalidRestaurantId | ErrorCode::RequiredField
                ),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn optional_ids() {
        assert_eq!(parse_optional_id("categoryId", None).unwrap(), None);
        assert_eq!(parse_optional_id("categoryId", Some("")).unwrap(), None);
        assert_eq!(parse_optional_id("categoryId", Some("2")).unwrap(), Some(2));
        assert!(parse_optional_id("categoryId", Some("two")).is_err());
    }

    #[test]
    fn lenient_string_accepts_numbers_and_strings() {
        let q: TenantQuery = serde_json::from_str(r#"{"restaurantId": 7}"#).unwrap();
        assert_eq!(q.restaurant_id().unwrap(), 7);

        let q: TenantQuery = serde_json::from_str(r#"{"restaurantId": "8"}"#).unwrap();
        assert_eq!(q.restaurant_id().unwrap(), 8);

        let q: TenantQuery = serde_json::from_str(r#"{"restaurantId": null}"#).unwrap();
        assert!(q.restaurant_id().is_err());

        let q: TenantQuery = serde_json::from_str("{}").unwrap();
        assert!(q.restaurant_id.is_none());
    }
}
