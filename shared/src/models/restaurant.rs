//! Restaurant (tenant) Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Account status of a restaurant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestaurantStatus {
    Active,
    #[serde(rename = "On-Hold")]
    OnHold,
    Suspended,
}

impl RestaurantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::OnHold => "On-Hold",
            Self::Suspended => "Suspended",
        }
    }

    pub fn from_db(raw: &str) -> Option<Self> {
        match raw {
            "Active" => Some(Self::Active),
            "On-Hold" => Some(Self::OnHold),
            "Suspended" => Some(Self::Suspended),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub admin_email: String,
    pub start_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub status: String,
    pub plan: Option<String>,
    pub gst_number: Option<String>,
}

/// Create restaurant payload (also creates the admin login)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantCreate {
    pub id: i64,
    pub name: String,
    pub admin_email: String,
    pub admin_password: String,
    pub start_date: NaiveDate,
    pub expiry_date: NaiveDate,
    #[serde(default)]
    pub status: Option<RestaurantStatus>,
    #[serde(default)]
    pub plan: Option<String>,
}

/// Update restaurant payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantUpdate {
    pub name: String,
    pub admin_email: String,
    pub start_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub status: RestaurantStatus,
    #[serde(default)]
    pub plan: Option<String>,
}

/// Login credential row
#[derive(Debug, Clone)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct UserCredential {
    pub id: i64,
    pub restaurant_id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub staff_id: Option<i64>,
}

/// Authenticated user as returned by login
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    pub id: i64,
    pub restaurant_id: i64,
    pub email: String,
    pub role: String,
    pub staff_id: Option<i64>,
}

impl From<UserCredential> for LoginUser {
    fn from(c: UserCredential) -> Self {
        Self {
            id: c.id,
            restaurant_id: c.restaurant_id,
            email: c.email,
            role: c.role,
            staff_id: c.staff_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_names() {
        assert_eq!(
            serde_json::to_string(&RestaurantStatus::OnHold).unwrap(),
            "\"On-Hold\""
        );
        assert_eq!(
            RestaurantStatus::from_db("Suspended"),
            Some(RestaurantStatus::Suspended)
        );
        assert_eq!(RestaurantStatus::from_db("Closed"), None);
    }
}
