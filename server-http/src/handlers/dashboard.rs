use crate::api::{ApiError, ChartsResponse, StatsResponse};
use crate::state::AppState;
use axum::{Json, extract::State};
use bazaar::services::dashboard::{BarCharts, LineCharts, PieCharts};

/// GET /dashboard/stats
pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.dashboard.stats().await?;
    Ok(Json(StatsResponse {
        success: true,
        stats,
    }))
}

/// GET /dashboard/pie
pub async fn pie_charts(
    State(state): State<AppState>,
) -> Result<Json<ChartsResponse<PieCharts>>, ApiError> {
    Ok(Json(ChartsResponse::new(state.dashboard.pie().await?)))
}

/// GET /dashboard/bar
pub async fn bar_charts(
    State(state): State<AppState>,
) -> Result<Json<ChartsResponse<BarCharts>>, ApiError> {
    Ok(Json(ChartsResponse::new(state.dashboard.bar().await?)))
}

/// GET /dashboard/line
pub async fn line_charts(
    State(state): State<AppState>,
) -> Result<Json<ChartsResponse<LineCharts>>, ApiError> {
    Ok(Json(ChartsResponse::new(state.dashboard.line().await?)))
}
