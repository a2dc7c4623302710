//! Stock API Routes
//!
//! Aggregated overview and derived indicators for a single ticker.

use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use market_core::{StockIndicators, StockOverview};

use crate::{request_id::RequestId, ApiResponse, AppError, AppState};

pub fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/api/stocks/:symbol", get(get_stock))
        .route("/api/stocks/:symbol/indicators", get(get_indicators))
}

async fn get_stock(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<StockOverview>>, AppError> {
    tracing::info!(request_id = %request_id, "Stock overview requested for {}", symbol);
    let overview = state.aggregator.check_stock(&symbol).await?;
    Ok(Json(ApiResponse::success(overview)))
}

async fn get_indicators(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<StockIndicators>>, AppError> {
    tracing::info!(request_id = %request_id, "Indicators requested for {}", symbol);
    let indicators = state.aggregator.indicators(&symbol).await?;
    Ok(Json(ApiResponse::success(indicators)))
}
