use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    CompanyProfile, EarningsEvent, EarningsSurprise, FinancialMetrics, MarketError, NewsArticle,
    Quote, RecommendationTrend,
};

/// Upstream provider of per-symbol market data.
///
/// Implementations return `Ok(None)` / empty collections when the provider
/// answers but knows nothing about the symbol, and `Err` only when the lookup
/// itself failed.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn quote(&self, symbol: &str) -> Result<Option<Quote>, MarketError>;

    async fn company_profile(&self, symbol: &str) -> Result<Option<CompanyProfile>, MarketError>;

    async fn basic_financials(&self, symbol: &str) -> Result<FinancialMetrics, MarketError>;

    async fn recommendation_trends(
        &self,
        symbol: &str,
    ) -> Result<Vec<RecommendationTrend>, MarketError>;

    async fn earnings_surprises(&self, symbol: &str) -> Result<Vec<EarningsSurprise>, MarketError>;

    async fn earnings_calendar(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<EarningsEvent>, MarketError>;

    async fn peers(&self, symbol: &str) -> Result<Vec<String>, MarketError>;

    async fn company_news(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NewsArticle>, MarketError>;
}
