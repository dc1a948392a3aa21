use axum::extract::{Extension, Json, State};

use crate::{
    AppState,
    database::SearchHistoryItem,
    error::AppError,
    utils::{ApiResponse, Claims, success_to_api_response},
};

use super::model::{SEARCH_HISTORY_LIMIT, SubscriptionResponse};

#[axum::debug_handler]
pub async fn subscription(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SubscriptionResponse>>, AppError> {
    let subscription = state
        .repository
        .find_subscription(&claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("No subscription found".to_string()))?;

    Ok(success_to_api_response(SubscriptionResponse::from(subscription)))
}

#[axum::debug_handler]
pub async fn searches(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SearchHistoryItem>>>, AppError> {
    let items = state
        .repository
        .recent_searches(&claims.sub, SEARCH_HISTORY_LIMIT)
        .await?;

    Ok(success_to_api_response(items))
}
