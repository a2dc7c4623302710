//! Raw Finnhub payloads and their conversion into `market_core` types.

use chrono::{DateTime, NaiveDate, Utc};
use market_core::{
    CompanyProfile, EarningsEvent, EarningsSurprise, FinancialMetrics, NewsArticle, Quote,
    RecommendationTrend,
};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

// /quote
#[derive(Debug, Default, Deserialize)]
pub(crate) struct QuoteResponse {
    #[serde(default)]
    c: Option<f64>,
    #[serde(default)]
    d: Option<f64>,
    #[serde(default)]
    dp: Option<f64>,
    #[serde(default)]
    h: Option<f64>,
    #[serde(default)]
    l: Option<f64>,
    #[serde(default)]
    o: Option<f64>,
    #[serde(default)]
    pc: Option<f64>,
    #[serde(default)]
    t: Option<i64>,
}

impl QuoteResponse {
    /// Unknown symbols come back as an all-zero quote with `t == 0`.
    pub(crate) fn into_quote(self) -> Option<Quote> {
        let has_timestamp = self.t.map(|t| t > 0).unwrap_or(false);
        let has_price = self.c.map(|c| c != 0.0).unwrap_or(false);
        if !has_timestamp && !has_price {
            return None;
        }

        Some(Quote {
            current: self.c,
            open: self.o,
            high: self.h,
            low: self.l,
            prev_close: self.pc,
            change: self.d,
            percent_change: self.dp,
            timestamp: self.t.filter(|t| *t > 0).and_then(|t| DateTime::from_timestamp(t, 0)),
        })
    }
}

// /stock/profile2
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProfileResponse {
    name: Option<String>,
    ticker: Option<String>,
    exchange: Option<String>,
    finnhub_industry: Option<String>,
    ipo: Option<String>,
    market_capitalization: Option<f64>,
    share_outstanding: Option<f64>,
    currency: Option<String>,
    country: Option<String>,
    weburl: Option<String>,
    logo: Option<String>,
}

impl ProfileResponse {
    /// Unknown symbols come back as `{}`.
    pub(crate) fn into_profile(self) -> Option<CompanyProfile> {
        let profile = CompanyProfile {
            name: non_empty(self.name),
            ticker: non_empty(self.ticker),
            exchange: non_empty(self.exchange),
            industry: non_empty(self.finnhub_industry),
            ipo: parse_date(self.ipo.as_deref()),
            market_cap: self.market_capitalization,
            shares_outstanding: self.share_outstanding,
            currency: non_empty(self.currency),
            country: non_empty(self.country),
            website: non_empty(self.weburl),
            logo: non_empty(self.logo),
        };

        if profile == CompanyProfile::default() {
            None
        } else {
            Some(profile)
        }
    }
}

// /stock/metric
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MetricResponse {
    #[serde(default)]
    metric: Option<HashMap<String, serde_json::Value>>,
    #[serde(default)]
    metric_type: Option<String>,
}

impl MetricResponse {
    /// Keeps numeric entries only; dates and nulls are dropped.
    pub(crate) fn into_metrics(self) -> FinancialMetrics {
        let values: BTreeMap<String, f64> = self
            .metric
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(k, v)| v.as_f64().filter(|f| f.is_finite()).map(|f| (k, f)))
            .collect();

        FinancialMetrics {
            metric_type: if values.is_empty() { None } else { self.metric_type },
            values,
        }
    }
}

// /stock/recommendation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecommendationRow {
    #[serde(default)]
    period: Option<String>,
    #[serde(default)]
    strong_buy: Option<u32>,
    #[serde(default)]
    buy: Option<u32>,
    #[serde(default)]
    hold: Option<u32>,
    #[serde(default)]
    sell: Option<u32>,
    #[serde(default)]
    strong_sell: Option<u32>,
}

/// Newest period first; rows without a period are dropped.
pub(crate) fn into_trends(rows: Vec<RecommendationRow>) -> Vec<RecommendationTrend> {
    let mut trends: Vec<RecommendationTrend> = rows
        .into_iter()
        .filter_map(|r| {
            let period = non_empty(r.period)?;
            Some(RecommendationTrend {
                period,
                strong_buy: r.strong_buy.unwrap_or(0),
                buy: r.buy.unwrap_or(0),
                hold: r.hold.unwrap_or(0),
                sell: r.sell.unwrap_or(0),
                strong_sell: r.strong_sell.unwrap_or(0),
            })
        })
        .collect();
    trends.sort_by(|a, b| b.period.cmp(&a.period));
    trends
}

// /stock/earnings
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EarningsRow {
    #[serde(default)]
    period: Option<String>,
    #[serde(default)]
    actual: Option<f64>,
    #[serde(default)]
    estimate: Option<f64>,
    #[serde(default)]
    surprise_percent: Option<f64>,
}

pub(crate) fn into_surprises(rows: Vec<EarningsRow>) -> Vec<EarningsSurprise> {
    let mut surprises: Vec<EarningsSurprise> = rows
        .into_iter()
        .filter_map(|r| {
            Some(EarningsSurprise {
                period: parse_date(r.period.as_deref())?,
                actual: r.actual,
                estimate: r.estimate,
                surprise_percent: r.surprise_percent,
            })
        })
        .collect();
    surprises.sort_by(|a, b| b.period.cmp(&a.period));
    surprises
}

// /calendar/earnings
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EarningsCalendarResponse {
    #[serde(default)]
    earnings_calendar: Vec<EarningsCalendarRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EarningsCalendarRow {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    hour: Option<String>,
    #[serde(default)]
    eps_estimate: Option<f64>,
}

impl EarningsCalendarResponse {
    /// Soonest first.
    pub(crate) fn into_events(self, symbol: &str) -> Vec<EarningsEvent> {
        let mut events: Vec<EarningsEvent> = self
            .earnings_calendar
            .into_iter()
            .filter_map(|r| {
                Some(EarningsEvent {
                    symbol: non_empty(r.symbol).unwrap_or_else(|| symbol.to_string()),
                    date: parse_date(r.date.as_deref())?,
                    hour: non_empty(r.hour),
                    eps_estimate: r.eps_estimate,
                })
            })
            .collect();
        events.sort_by(|a, b| a.date.cmp(&b.date));
        events
    }
}

// /company-news
#[derive(Debug, Deserialize)]
pub(crate) struct NewsRow {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    headline: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    related: Option<String>,
    #[serde(default)]
    datetime: Option<i64>,
}

/// Newest first; rows missing an id, headline or timestamp are dropped.
pub(crate) fn into_articles(rows: Vec<NewsRow>) -> Vec<NewsArticle> {
    let mut articles: Vec<NewsArticle> = rows
        .into_iter()
        .filter_map(|r| {
            Some(NewsArticle {
                id: r.id?,
                headline: non_empty(r.headline)?,
                summary: non_empty(r.summary),
                source: non_empty(r.source),
                url: non_empty(r.url),
                image: non_empty(r.image),
                category: non_empty(r.category),
                related: non_empty(r.related),
                published_at: r.datetime.and_then(|t| DateTime::<Utc>::from_timestamp(t, 0))?,
            })
        })
        .collect();
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    articles
}
