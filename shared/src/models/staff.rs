//! Staff Model: staff, attendance, payroll and tips

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::tenant::lenient_string;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: i64,
    pub restaurant_id: i64,
    pub full_name: String,
    pub role: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub monthly_salary: Decimal,
    pub join_date: Option<NaiveDate>,
    pub shift: Option<String>,
}

/// Create / update staff payload
///
/// `password` creates or replaces the staff member's login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffInput {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub monthly_salary: Option<Decimal>,
    #[serde(default)]
    pub join_date: Option<NaiveDate>,
    #[serde(default)]
    pub shift: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Attendance row joined with the staff name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: i64,
    pub staff_id: i64,
    pub staff_name: String,
    pub attendance_date: NaiveDate,
    pub shift: Option<String>,
    pub check_in: DateTime<Utc>,
    pub check_out: Option<DateTime<Utc>>,
    pub shift_duration_secs: Option<i64>,
}

/// Payroll line for one staff member and month
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct PayrollEntry {
    pub staff_id: i64,
    pub full_name: String,
    pub role: String,
    pub monthly_salary: Decimal,
    pub present_days: i64,
    pub absent_days: i64,
    pub bonus: Decimal,
    pub already_paid: Decimal,
    pub status: String,
}

/// Upsert payroll payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollUpsert {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    pub staff_id: i64,
    /// `YYYY-MM`
    pub month: String,
    #[serde(default)]
    pub bonus: Option<Decimal>,
    #[serde(default)]
    pub already_paid: Option<Decimal>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Tip {
    pub id: i64,
    pub restaurant_id: i64,
    pub order_id: i64,
    pub staff_id: Option<i64>,
    pub amount: Decimal,
    pub tip_date: NaiveDate,
}

/// Upsert tip payload (one tip per order)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipUpsert {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    pub order_id: i64,
    #[serde(default)]
    pub staff_id: Option<i64>,
    pub amount: Decimal,
}
