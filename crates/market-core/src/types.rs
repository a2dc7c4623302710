use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Point-in-time price snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub current: Option<f64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub prev_close: Option<f64>,
    pub change: Option<f64>,
    pub percent_change: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Static descriptive company metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: Option<String>,
    pub ticker: Option<String>,
    pub exchange: Option<String>,
    pub industry: Option<String>,
    pub ipo: Option<NaiveDate>,
    /// Reported in millions of `currency`
    pub market_cap: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub currency: Option<String>,
    pub country: Option<String>,
    pub website: Option<String>,
    pub logo: Option<String>,
}

/// Sparse set of numeric financial metrics keyed by upstream metric name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    #[serde(default)]
    pub metric_type: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<String, f64>,
}

impl FinancialMetrics {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// First present value among `keys`.
    pub fn first_of(&self, keys: &[&str]) -> Option<f64> {
        keys.iter().find_map(|k| self.get(k))
    }
}

/// Analyst recommendation counts for one period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationTrend {
    pub period: String,
    pub strong_buy: u32,
    pub buy: u32,
    pub hold: u32,
    pub sell: u32,
    pub strong_sell: u32,
}

impl RecommendationTrend {
    pub fn total(&self) -> u32 {
        self.strong_buy + self.buy + self.hold + self.sell + self.strong_sell
    }

    /// Label of the largest bucket. Ties resolve toward the bullish side.
    pub fn dominant_label(&self) -> Option<&'static str> {
        if self.total() == 0 {
            return None;
        }
        let buckets = [
            ("Strong Buy", self.strong_buy),
            ("Buy", self.buy),
            ("Hold", self.hold),
            ("Sell", self.sell),
            ("Strong Sell", self.strong_sell),
        ];
        buckets
            .iter()
            .fold(None::<(&'static str, u32)>, |best, &(label, count)| match best {
                Some((_, c)) if c >= count => best,
                _ => Some((label, count)),
            })
            .map(|(label, _)| label)
    }
}

/// EPS actual vs estimate for one reporting period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsSurprise {
    pub period: NaiveDate,
    pub actual: Option<f64>,
    pub estimate: Option<f64>,
    pub surprise_percent: Option<f64>,
}

/// Scheduled earnings release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarningsEvent {
    pub symbol: String,
    pub date: NaiveDate,
    /// `bmo`, `amc` or `dmh` when the upstream knows it
    pub hour: Option<String>,
    pub eps_estimate: Option<f64>,
}

/// Company news article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: i64,
    pub headline: String,
    pub summary: Option<String>,
    pub source: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub related: Option<String>,
    pub published_at: DateTime<Utc>,
}

/// One independently fetched part of a [`StockOverview`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Quote,
    Profile,
    Metrics,
    Recommendations,
    NextEarnings,
    Earnings,
    Peers,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Quote,
        Section::Profile,
        Section::Metrics,
        Section::Recommendations,
        Section::NextEarnings,
        Section::Earnings,
        Section::Peers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Quote => "quote",
            Section::Profile => "profile",
            Section::Metrics => "metrics",
            Section::Recommendations => "recommendations",
            Section::NextEarnings => "next_earnings",
            Section::Earnings => "earnings",
            Section::Peers => "peers",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum SectionStatus {
    Populated,
    /// Upstream answered but had nothing for this symbol
    Empty,
    /// Lookup failed; carries the error text
    Unavailable(String),
}

impl SectionStatus {
    pub fn is_populated(&self) -> bool {
        matches!(self, SectionStatus::Populated)
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, SectionStatus::Unavailable(_))
    }
}

/// Consolidated snapshot of one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockOverview {
    pub symbol: String,
    pub quote: Option<Quote>,
    pub profile: Option<CompanyProfile>,
    #[serde(default)]
    pub metrics: FinancialMetrics,
    #[serde(default)]
    pub recommendations: Vec<RecommendationTrend>,
    pub next_earnings_date: Option<NaiveDate>,
    #[serde(default)]
    pub earnings: Vec<EarningsSurprise>,
    #[serde(default)]
    pub peers: Vec<String>,
    pub sections: BTreeMap<Section, SectionStatus>,
    pub fetched_at: DateTime<Utc>,
}

impl StockOverview {
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            quote: None,
            profile: None,
            metrics: FinancialMetrics::default(),
            recommendations: Vec::new(),
            next_earnings_date: None,
            earnings: Vec::new(),
            peers: Vec::new(),
            sections: BTreeMap::new(),
            fetched_at: Utc::now(),
        }
    }

    pub fn populated_sections(&self) -> Vec<Section> {
        self.sections
            .iter()
            .filter(|(_, status)| status.is_populated())
            .map(|(section, _)| *section)
            .collect()
    }

    /// Latest recommendation period, if any
    pub fn latest_recommendation(&self) -> Option<&RecommendationTrend> {
        self.recommendations.iter().max_by(|a, b| a.period.cmp(&b.period))
    }
}

/// Derived indicator view over a [`StockOverview`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockIndicators {
    pub symbol: String,
    pub open_price: Option<f64>,
    pub high_price: Option<f64>,
    pub low_price: Option<f64>,
    pub close_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub quote_timestamp: Option<DateTime<Utc>>,
    pub market_cap: Option<f64>,
    pub enterprise_value: Option<f64>,
    pub beta: Option<f64>,
    pub week52_high: Option<f64>,
    pub week52_low: Option<f64>,
    pub short_interest_pct_float: Option<f64>,
    pub cash_and_equivalents: Option<f64>,
    pub total_debt: Option<f64>,
    pub capex: Option<f64>,
    pub operating_cash_flow: Option<f64>,
    pub free_cash_flow: Option<f64>,
    pub fcf_margin: Option<f64>,
    pub cash_conversion: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    #[serde(default)]
    pub moving_averages: BTreeMap<String, f64>,
    /// Additional reported metrics (valuation, margins, growth, relative returns)
    #[serde(default)]
    pub extra: BTreeMap<String, f64>,
    pub recommendation: Option<String>,
    pub recommendation_counts: Option<RecommendationTrend>,
}
