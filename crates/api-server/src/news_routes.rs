//! News API Routes
//!
//! Stored company news, newest first. Requires `DATABASE_URL`.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use market_store::StoredArticle;
use serde::Deserialize;

use crate::{company_name, ApiResponse, AppError, AppState};

const DEFAULT_LIMIT: i64 = 50;

/// `limit` is taken raw so a malformed value gets the JSON error envelope
#[derive(Deserialize)]
pub struct NewsQuery {
    #[serde(default)]
    pub limit: Option<String>,
}

impl NewsQuery {
    fn limit(&self) -> Result<i64, AppError> {
        match self.limit.as_deref().map(str::trim) {
            None | Some("") => Ok(DEFAULT_LIMIT),
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    AppError::BadRequest(format!("limit must be a positive integer, got {}", raw))
                }),
        }
    }
}

pub fn news_routes() -> Router<AppState> {
    Router::new().route("/api/news/:company", get(list_company_news))
}

async fn list_company_news(
    State(state): State<AppState>,
    Path(company): Path<String>,
    Query(query): Query<NewsQuery>,
) -> Result<Json<ApiResponse<Vec<StoredArticle>>>, AppError> {
    let company = company_name(&company)?;
    let limit = query.limit()?;

    let articles = state.store()?.list_news(&company, limit).await?;
    Ok(Json(ApiResponse::success(articles)))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn get(uri: &str) -> axum::response::Response {
        test_app(Upstream::Healthy)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_news_without_database() {
        let response = get("/api/news/Apple%20Inc?limit=5").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_malformed_limit_uses_json_envelope() {
        let response = get("/api/news/Apple?limit=abc").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "limit must be a positive integer, got abc");

        let response = get("/api/news/Apple?limit=0").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_blank_limit_falls_back_to_default() {
        let response = get("/api/news/Apple?limit=").await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_oversized_company_is_bad_request() {
        let response = get(&format!("/api/news/{}", "x".repeat(201))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = get("/api/news/%20%20").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
