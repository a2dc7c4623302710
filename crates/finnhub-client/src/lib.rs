use async_trait::async_trait;
use chrono::NaiveDate;
use market_core::{
    CompanyProfile, EarningsEvent, EarningsSurprise, FinancialMetrics, MarketDataSource,
    MarketError, NewsArticle, Quote, RecommendationTrend,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

mod response;

use response::{
    EarningsCalendarResponse, EarningsRow, MetricResponse, NewsRow, ProfileResponse,
    QuoteResponse, RecommendationRow,
};

pub const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the Finnhub REST API
#[derive(Debug, Clone)]
pub struct FinnhubConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl FinnhubConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Reads `FINNHUB_API_KEY` (required), `FINNHUB_BASE_URL` and `FINNHUB_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, MarketError> {
        let api_key = std::env::var("FINNHUB_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                MarketError::Config(
                    "FINNHUB_API_KEY not set. Export it or put it in a .env file.".to_string(),
                )
            })?;

        let mut config = Self::new(api_key);
        if let Ok(url) = std::env::var("FINNHUB_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(secs) = std::env::var("FINNHUB_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|_| MarketError::Config(format!("FINNHUB_TIMEOUT_SECS: {}", secs)))?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

/// Finnhub REST client. Free-tier keys allow 60 calls/minute; callers are
/// expected to stay under that, no throttling happens here.
#[derive(Clone)]
pub struct FinnhubClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl FinnhubClient {
    pub fn new(config: FinnhubConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key: config.api_key,
            base_url: config.base_url,
            client,
        }
    }

    /// GET `path` with `query` plus the API token and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, MarketError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .query(&[("token", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| MarketError::ApiError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| MarketError::InvalidData(format!("{}: {}", path, e)))
    }
}

fn status_error(status: StatusCode, body: &str) -> MarketError {
    match status.as_u16() {
        401 | 403 => MarketError::Unauthorized,
        429 => MarketError::RateLimited,
        _ => MarketError::ApiError(format!("HTTP {}: {}", status, body.trim())),
    }
}

#[async_trait]
impl MarketDataSource for FinnhubClient {
    async fn quote(&self, symbol: &str) -> Result<Option<Quote>, MarketError> {
        let raw: QuoteResponse = self.get_json("/quote", &[("symbol", symbol)]).await?;
        Ok(raw.into_quote())
    }

    async fn company_profile(&self, symbol: &str) -> Result<Option<CompanyProfile>, MarketError> {
        let raw: ProfileResponse = self
            .get_json("/stock/profile2", &[("symbol", symbol)])
            .await?;
        Ok(raw.into_profile())
    }

    async fn basic_financials(&self, symbol: &str) -> Result<FinancialMetrics, MarketError> {
        let raw: MetricResponse = self
            .get_json("/stock/metric", &[("symbol", symbol), ("metric", "all")])
            .await?;
        Ok(raw.into_metrics())
    }

    async fn recommendation_trends(
        &self,
        symbol: &str,
    ) -> Result<Vec<RecommendationTrend>, MarketError> {
        let rows: Vec<RecommendationRow> = self
            .get_json("/stock/recommendation", &[("symbol", symbol)])
            .await?;
        Ok(response::into_trends(rows))
    }

    async fn earnings_surprises(&self, symbol: &str) -> Result<Vec<EarningsSurprise>, MarketError> {
        let rows: Vec<EarningsRow> = self
            .get_json("/stock/earnings", &[("symbol", symbol)])
            .await?;
        Ok(response::into_surprises(rows))
    }

    async fn earnings_calendar(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<EarningsEvent>, MarketError> {
        let from = from.format("%Y-%m-%d").to_string();
        let to = to.format("%Y-%m-%d").to_string();
        let raw: EarningsCalendarResponse = self
            .get_json(
                "/calendar/earnings",
                &[("symbol", symbol), ("from", from.as_str()), ("to", to.as_str())],
            )
            .await?;
        Ok(raw.into_events(symbol))
    }

    async fn peers(&self, symbol: &str) -> Result<Vec<String>, MarketError> {
        self.get_json("/stock/peers", &[("symbol", symbol)]).await
    }

    async fn company_news(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NewsArticle>, MarketError> {
        let from = from.format("%Y-%m-%d").to_string();
        let to = to.format("%Y-%m-%d").to_string();
        let rows: Vec<NewsRow> = self
            .get_json(
                "/company-news",
                &[("symbol", symbol), ("from", from.as_str()), ("to", to.as_str())],
            )
            .await?;
        Ok(response::into_articles(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_mapping() {
        assert_eq!(status_error(StatusCode::UNAUTHORIZED, ""), MarketError::Unauthorized);
        assert_eq!(status_error(StatusCode::FORBIDDEN, ""), MarketError::Unauthorized);
        assert_eq!(status_error(StatusCode::TOO_MANY_REQUESTS, ""), MarketError::RateLimited);
        match status_error(StatusCode::BAD_GATEWAY, " upstream down ") {
            MarketError::ApiError(msg) => {
                assert!(msg.contains("502"));
                assert!(msg.ends_with("upstream down"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = FinnhubConfig::new("key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_api_error() {
        let mut config = FinnhubConfig::new("key");
        config.base_url = "http://127.0.0.1:9".to_string();
        config.timeout = Duration::from_secs(2);
        let client = FinnhubClient::new(config);

        let err = client.quote("AAPL").await.unwrap_err();
        assert!(matches!(err, MarketError::ApiError(_)));
    }
}
