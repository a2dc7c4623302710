//! HTTP surface for aggregated stock data.

use axum::{
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use market_aggregator::Aggregator;
use market_core::MarketError;
use market_store::MarketStore;
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod news_routes;
pub mod request_id;
pub mod stock_routes;
pub mod watchlist_routes;

pub use config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Aggregator,
    /// `None` when `DATABASE_URL` is not configured
    pub store: Option<MarketStore>,
}

impl AppState {
    pub fn store(&self) -> Result<&MarketStore, AppError> {
        self.store.as_ref().ok_or(AppError::StoreUnavailable)
    }
}

/// JSON envelope shared by every endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    Market(MarketError),
    NotFound(String),
    BadRequest(String),
    StoreUnavailable,
    Internal(anyhow::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Market(e) => match e {
                MarketError::InvalidSymbol(_) => StatusCode::BAD_REQUEST,
                MarketError::NotFound(_) => StatusCode::NOT_FOUND,
                MarketError::Unreachable { .. }
                | MarketError::ApiError(_)
                | MarketError::Unauthorized
                | MarketError::RateLimited
                | MarketError::InvalidData(_) => StatusCode::BAD_GATEWAY,
                MarketError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Validated company key, or a 400 describing why the name was rejected
pub(crate) fn company_name(raw: &str) -> Result<String, AppError> {
    market_store::company_key(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

impl From<MarketError> for AppError {
    fn from(e: MarketError) -> Self {
        AppError::Market(e)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        AppError::Internal(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Market(e) => e.to_string(),
            AppError::NotFound(msg) | AppError::BadRequest(msg) => msg.clone(),
            AppError::StoreUnavailable => "Database not configured".to_string(),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                "Internal server error".to_string()
            }
        };

        if status.is_server_error() {
            tracing::warn!("{} {}", status, message);
        }

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
    database: bool,
}

async fn health(axum::extract::State(state): axum::extract::State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        database: state.store.is_some(),
    })
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    layer.allow_origin(parsed)
}

/// Full application router
pub fn app(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(stock_routes::stock_routes())
        .merge(watchlist_routes::watchlist_routes())
        .merge(news_routes::news_routes())
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Load configuration from the environment, connect, and serve until Ctrl-C.
pub async fn run_server() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;

    let aggregator = Aggregator::finnhub(config.finnhub.clone())
        .with_earnings_lookahead(config.earnings_lookahead_days);

    let store = match &config.database_url {
        Some(url) => Some(MarketStore::connect(url).await?),
        None => {
            tracing::warn!("DATABASE_URL not set; watchlist and news endpoints disabled");
            None
        }
    };

    let state = AppState { aggregator, store };
    let app = app(state, &config.cors_origins);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("API server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use market_core::{
        CompanyProfile, EarningsEvent, EarningsSurprise, FinancialMetrics, MarketDataSource,
        NewsArticle, Quote, RecommendationTrend,
    };
    use std::sync::Arc;

    #[derive(Clone, Copy)]
    pub enum Upstream {
        Healthy,
        Down,
        Empty,
    }

    pub struct StubSource(pub Upstream);

    impl StubSource {
        fn fail<T>(&self, value: T) -> Result<T, MarketError> {
            match self.0 {
                Upstream::Down => Err(MarketError::ApiError("HTTP 500".to_string())),
                _ => Ok(value),
            }
        }

        fn healthy(&self) -> bool {
            matches!(self.0, Upstream::Healthy)
        }
    }

    #[async_trait]
    impl MarketDataSource for StubSource {
        async fn quote(&self, _symbol: &str) -> Result<Option<Quote>, MarketError> {
            let quote = self.healthy().then(|| Quote {
                current: Some(415.2),
                ..Default::default()
            });
            self.fail(quote)
        }

        async fn company_profile(
            &self,
            symbol: &str,
        ) -> Result<Option<CompanyProfile>, MarketError> {
            let profile = self.healthy().then(|| CompanyProfile {
                name: Some("Microsoft Corp".to_string()),
                ticker: Some(symbol.to_string()),
                ..Default::default()
            });
            self.fail(profile)
        }

        async fn basic_financials(&self, _symbol: &str) -> Result<FinancialMetrics, MarketError> {
            self.fail(FinancialMetrics::default())
        }

        async fn recommendation_trends(
            &self,
            _symbol: &str,
        ) -> Result<Vec<RecommendationTrend>, MarketError> {
            self.fail(Vec::new())
        }

        async fn earnings_surprises(
            &self,
            _symbol: &str,
        ) -> Result<Vec<EarningsSurprise>, MarketError> {
            self.fail(Vec::new())
        }

        async fn earnings_calendar(
            &self,
            _symbol: &str,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> Result<Vec<EarningsEvent>, MarketError> {
            self.fail(Vec::new())
        }

        async fn peers(&self, symbol: &str) -> Result<Vec<String>, MarketError> {
            let peers = if self.healthy() {
                vec![symbol.to_string(), "ORCL".to_string()]
            } else {
                Vec::new()
            };
            self.fail(peers)
        }

        async fn company_news(
            &self,
            _symbol: &str,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> Result<Vec<NewsArticle>, MarketError> {
            self.fail(Vec::new())
        }
    }

    pub fn test_app(upstream: Upstream) -> Router {
        let state = AppState {
            aggregator: Aggregator::new(Arc::new(StubSource(upstream))),
            store: None,
        };
        app(state, &[])
    }

    pub async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health() {
        let response = test_app(Upstream::Healthy)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["database"], false);
    }

    #[test]
    fn test_error_status_mapping() {
        use super::{AppError, MarketError};
        assert_eq!(
            AppError::from(MarketError::InvalidSymbol("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(MarketError::NotFound("X".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(MarketError::RateLimited).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(AppError::StoreUnavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            AppError::from(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_response_envelope() {
        use super::*;
        let ok = serde_json::to_value(ApiResponse::success(1)).unwrap();
        assert_eq!(ok["success"], true);
        assert_eq!(ok["data"], 1);
        assert!(ok.get("error").is_none());

        let err = serde_json::to_value(ApiResponse::<()>::error("nope")).unwrap();
        assert_eq!(err["success"], false);
        assert_eq!(err["error"], "nope");
        assert!(err.get("data").is_none());
    }
}
