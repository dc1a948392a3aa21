use axum::extract::{Extension, Json, State};

use crate::{
    AppState,
    error::AppError,
    services::analyze_website,
    utils::{ApiResponse, Claims, success_to_api_response},
};

use super::model::{AnalyzeRequest, AnalyzeResponse};

#[axum::debug_handler]
pub async fn analyze(
    Extension(claims): Extension<Claims>,
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<AnalyzeResponse>>, AppError> {
    let url = req.url.unwrap_or_default();
    let outcome = analyze_website(&state, &claims, &url).await?;

    Ok(success_to_api_response(AnalyzeResponse::from(outcome)))
}
