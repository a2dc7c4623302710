//! Watchlist API Routes
//!
//! Company names tracked for news ingestion. Requires `DATABASE_URL`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use market_store::WatchlistEntry;
use serde::Deserialize;

use crate::{company_name, ApiResponse, AppError, AppState};

#[derive(Deserialize)]
pub struct AddWatchlistRequest {
    pub company_name: String,
}

pub fn watchlist_routes() -> Router<AppState> {
    Router::new()
        .route("/api/watchlist", get(list_watchlist).post(add_to_watchlist))
        .route("/api/watchlist/:name", delete(remove_from_watchlist))
}

async fn list_watchlist(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<WatchlistEntry>>>, AppError> {
    let entries = state.store()?.list_watchlist().await?;
    Ok(Json(ApiResponse::success(entries)))
}

async fn add_to_watchlist(
    State(state): State<AppState>,
    Json(req): Json<AddWatchlistRequest>,
) -> Result<(StatusCode, Json<ApiResponse<WatchlistEntry>>), AppError> {
    let name = company_name(&req.company_name)?;
    let entry = state.store()?.add_to_watchlist(&name).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(entry))))
}

async fn remove_from_watchlist(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<String>>, AppError> {
    let name = company_name(&name)?;
    if !state.store()?.remove_from_watchlist(&name).await? {
        return Err(AppError::NotFound(format!("{} is not on the watchlist", name)));
    }
    Ok(Json(ApiResponse::success(format!("Removed {}", name))))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_watchlist_without_database() {
        let response = test_app(Upstream::Healthy)
            .oneshot(
                Request::builder()
                    .uri("/api/watchlist")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Database not configured");
    }

    #[tokio::test]
    async fn test_add_without_database() {
        let response = test_app(Upstream::Healthy)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/watchlist")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"company_name":"Apple"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_add_rejects_oversized_name() {
        let body = format!(r#"{{"company_name":"{}"}}"#, "x".repeat(201));
        let response = test_app(Upstream::Healthy)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/watchlist")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().contains("200 characters"));
    }

    #[tokio::test]
    async fn test_remove_rejects_blank_name() {
        let response = test_app(Upstream::Healthy)
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/watchlist/%20")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "company name is empty");
    }
}
