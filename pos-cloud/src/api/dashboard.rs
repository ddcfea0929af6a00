//! GET /api/dashboard/{name}?restaurantId&range=

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::error::{AppError, ErrorCode};
use shared::tenant::{lenient_string, parse_restaurant_id};
use sqlx::PgPool;

use crate::dashboard::{DateRange, daily_profit};
use crate::db::dashboard as store;
use crate::error::internal;
use crate::state::AppState;

use super::ApiResult;

/// Dashboard widgets addressable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dashboard {
    Kpis,
    SalesVsExpenses,
    TopDishes,
    StaffAttendance,
    PeakOrderTimes,
    CustomerType,
    Aov,
    TopSpenders,
    PopularCategories,
    MostTippedStaff,
    InventoryLevels,
    LowStockAlerts,
    DailyProfit,
    FeedbackSentiment,
    RevenueBySource,
    OrderStatusFunnel,
}

impl Dashboard {
    const ALL: [(&'static str, Dashboard); 16] = [
        ("kpis", Self::Kpis),
        ("sales-vs-expenses", Self::SalesVsExpenses),
        ("top-dishes", Self::TopDishes),
        ("staff-attendance", Self::StaffAttendance),
        ("peak-order-times", Self::PeakOrderTimes),
        ("customer-type", Self::CustomerType),
        ("aov", Self::Aov),
        ("top-spenders", Self::TopSpenders),
        ("popular-categories", Self::PopularCategories),
        ("most-tipped-staff", Self::MostTippedStaff),
        ("inventory-levels", Self::InventoryLevels),
        ("low-stock-alerts", Self::LowStockAlerts),
        ("daily-profit", Self::DailyProfit),
        ("feedback-sentiment", Self::FeedbackSentiment),
        ("revenue-by-source", Self::RevenueBySource),
        ("order-status-funnel", Self::OrderStatusFunnel),
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, d)| *d)
    }

    async fn load(self, pool: &PgPool, restaurant_id: i64, range: DateRange) -> Result<Value, LoadError> {
        let rid = restaurant_id;
        match self {
            Self::Kpis => to_json(store::kpis(pool, rid, range).await?),
            Self::SalesVsExpenses => to_json(store::sales_vs_expenses(pool, rid, range).await?),
            Self::TopDishes => to_json(store::top_dishes(pool, rid, range).await?),
            Self::StaffAttendance => to_json(store::staff_attendance(pool, rid, range).await?),
            Self::PeakOrderTimes => to_json(store::peak_order_times(pool, rid, range).await?),
            Self::CustomerType => to_json(store::customer_types(pool, rid, range).await?),
            Self::Aov => to_json(store::average_order_value(pool, rid, range).await?),
            Self::TopSpenders => to_json(store::top_spenders(pool, rid, range).await?),
            Self::PopularCategories => to_json(store::popular_categories(pool, rid, range).await?),
            Self::MostTippedStaff => to_json(store::most_tipped_staff(pool, rid, range).await?),
            Self::InventoryLevels => to_json(store::inventory_levels(pool, rid).await?),
            Self::LowStockAlerts => to_json(store::low_stock_alerts(pool, rid).await?),
            Self::DailyProfit => {
                let days = store::sales_vs_expenses(pool, rid, range).await?;
                to_json(daily_profit(&days))
            }
            Self::FeedbackSentiment => to_json(store::feedback_sentiment(pool, rid, range).await?),
            Self::RevenueBySource => to_json(store::revenue_by_source(pool, rid, range).await?),
            Self::OrderStatusFunnel => to_json(store::order_status_funnel(pool, rid, range).await?),
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum LoadError {
    #[error(transparent)]
    Db(#[from] sqlx::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn to_json<T: Serialize>(value: T) -> Result<Value, LoadError> {
    Ok(serde_json::to_value(value)?)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    #[serde(default, deserialize_with = "lenient_string")]
    pub restaurant_id: Option<String>,
    pub range: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub range: DateRange,
    pub data: Value,
}

/// GET /api/dashboard/{name}
pub async fn dashboard(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<DashboardResponse> {
    let widget = Dashboard::from_name(&name).ok_or_else(|| {
        AppError::with_message(ErrorCode::NotFound, "Unknown dashboard").with_detail("name", name.as_str())
    })?;
    let restaurant_id = parse_restaurant_id(query.restaurant_id.as_deref())?;
    let range = DateRange::resolve(query.range.as_deref(), state.today());

    let data = widget
        .load(&state.pool, restaurant_id, range)
        .await
        .map_err(internal)?;
    Ok(Json(DashboardResponse { range, data }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_widget_has_a_unique_name() {
        let mut names: Vec<_> = Dashboard::ALL.iter().map(|(n, _)| *n).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 16);

        assert_eq!(Dashboard::from_name("aov"), Some(Dashboard::Aov));
        assert_eq!(
            Dashboard::from_name("low-stock-alerts"),
            Some(Dashboard::LowStockAlerts)
        );
        assert_eq!(Dashboard::from_name("weather"), None);
    }
}
