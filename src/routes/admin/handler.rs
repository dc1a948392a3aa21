use axum::extract::{Json, Query, State};
use chrono::Utc;

use crate::{
    AppState,
    error::AppError,
    services::{AnalyticsReport, TimeRange},
    utils::{ApiResponse, success_to_api_response},
};

use super::model::AnalyticsQuery;

#[axum::debug_handler]
pub async fn analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<ApiResponse<AnalyticsReport>>, AppError> {
    let range = TimeRange::parse(query.time_range.as_deref());
    let today = Utc::now().date_naive();

    let snapshot = state
        .repository
        .analytics_snapshot(range.since(today))
        .await?;

    Ok(success_to_api_response(AnalyticsReport::build(snapshot, range, today)))
}
