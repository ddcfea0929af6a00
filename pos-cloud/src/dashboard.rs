//! Dashboard ranges and result rows

use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

/// Inclusive range of local calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// `today` (default), `yesterday`, `week` (last 7 days including today)
    /// or `month` (same day last month to today). Unknown names mean today.
    pub fn resolve(name: Option<&str>, today: NaiveDate) -> Self {
        let single = |day: NaiveDate| Self {
            start: day,
            end: day,
        };
        match name.map(|n| n.trim().to_ascii_lowercase()).as_deref() {
            Some("yesterday") => single(today.checked_sub_days(Days::new(1)).unwrap_or(today)),
            Some("week") => Self {
                start: today.checked_sub_days(Days::new(6)).unwrap_or(today),
                end: today,
            },
            Some("month") => Self {
                start: today.checked_sub_months(Months::new(1)).unwrap_or(today),
                end: today,
            },
            _ => single(today),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub total_sales: Decimal,
    pub order_count: i64,
    pub average_order_value: Decimal,
    pub total_expenses: Decimal,
    pub net_profit: Decimal,
    pub new_customers: i64,
}

impl Kpis {
    pub fn from_totals(
        total_sales: Decimal,
        order_count: i64,
        total_expenses: Decimal,
        new_customers: i64,
    ) -> Self {
        let average_order_value = if order_count > 0 {
            (total_sales / Decimal::from(order_count)).round_dp(2)
        } else {
            Decimal::ZERO
        };
        Self {
            total_sales,
            order_count,
            average_order_value,
            total_expenses,
            net_profit: total_sales - total_expenses,
            new_customers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DailySalesExpenses {
    pub date: NaiveDate,
    pub sales: Decimal,
    pub expenses: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DailyValue {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// Per-day sales minus expenses
pub fn daily_profit(days: &[DailySalesExpenses]) -> Vec<DailyValue> {
    days.iter()
        .map(|d| DailyValue {
            date: d.date,
            value: d.sales - d.expenses,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct NamedQuantity {
    pub name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct NamedAmount {
    pub name: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct NamedCount {
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct HourCount {
    pub hour: i32,
    pub orders: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StaffAttendance {
    pub present: i64,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CustomerTypes {
    pub new_customers: i64,
    pub returning_customers: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct StockLevel {
    pub item: String,
    pub quantity: Decimal,
    pub threshold: Decimal,
    pub unit: String,
}
