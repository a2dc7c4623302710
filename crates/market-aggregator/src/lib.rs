use chrono::{Duration, NaiveDate, Utc};
use finnhub_client::{FinnhubClient, FinnhubConfig};
use market_core::{
    normalize_symbol, EarningsEvent, MarketDataSource, MarketError, NewsArticle, Section,
    SectionStatus, StockIndicators, StockOverview,
};
use std::collections::BTreeMap;
use std::sync::Arc;

pub mod indicators;

pub use indicators::derive_indicators;

pub const DEFAULT_EARNINGS_LOOKAHEAD_DAYS: i64 = 90;
pub const MAX_EARNINGS_LOOKAHEAD_DAYS: i64 = 3650;

/// Parse an `EARNINGS_LOOKAHEAD_DAYS` value: a whole number of days in
/// `1..=MAX_EARNINGS_LOOKAHEAD_DAYS`.
pub fn parse_earnings_lookahead(raw: &str) -> Result<i64, MarketError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|d| (1..=MAX_EARNINGS_LOOKAHEAD_DAYS).contains(d))
        .ok_or_else(|| {
            MarketError::Config(format!(
                "EARNINGS_LOOKAHEAD_DAYS must be between 1 and {}, got {}",
                MAX_EARNINGS_LOOKAHEAD_DAYS,
                raw.trim()
            ))
        })
}

/// Assembles a [`StockOverview`] from independent upstream lookups.
#[derive(Clone)]
pub struct Aggregator {
    source: Arc<dyn MarketDataSource>,
    earnings_lookahead_days: i64,
}

impl Aggregator {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self {
            source,
            earnings_lookahead_days: DEFAULT_EARNINGS_LOOKAHEAD_DAYS,
        }
    }

    /// Aggregator backed by the Finnhub REST API
    pub fn finnhub(config: FinnhubConfig) -> Self {
        Self::new(Arc::new(FinnhubClient::new(config)))
    }

    /// How far ahead to look for the next earnings date, clamped to
    /// `1..=MAX_EARNINGS_LOOKAHEAD_DAYS`
    pub fn with_earnings_lookahead(mut self, days: i64) -> Self {
        self.earnings_lookahead_days = days.clamp(1, MAX_EARNINGS_LOOKAHEAD_DAYS);
        self
    }

    /// Fetch every section for `symbol` and merge what succeeded.
    ///
    /// A failed lookup marks its section `unavailable` and leaves the field
    /// empty. The query as a whole fails only when every lookup failed
    /// (`Unreachable`) or none of them returned data (`NotFound`).
    pub async fn check_stock(&self, symbol: &str) -> Result<StockOverview, MarketError> {
        let symbol = normalize_symbol(symbol)?;
        tracing::info!("Aggregating overview for {}", symbol);

        let today = Utc::now().date_naive();
        let horizon = today
            .checked_add_signed(Duration::days(self.earnings_lookahead_days))
            .unwrap_or(NaiveDate::MAX);
        let source = self.source.as_ref();

        let (quote, profile, metrics, recommendations, calendar, earnings, peers) = tokio::join!(
            source.quote(&symbol),
            source.company_profile(&symbol),
            source.basic_financials(&symbol),
            source.recommendation_trends(&symbol),
            source.earnings_calendar(&symbol, today, horizon),
            source.earnings_surprises(&symbol),
            source.peers(&symbol),
        );

        let mut sections = BTreeMap::new();
        let mut overview = StockOverview::empty(symbol.clone());

        overview.quote = settle(&mut sections, Section::Quote, &symbol, quote, |q| q.is_some());
        overview.profile =
            settle(&mut sections, Section::Profile, &symbol, profile, |p| p.is_some());
        overview.metrics =
            settle(&mut sections, Section::Metrics, &symbol, metrics, |m| !m.is_empty());
        overview.recommendations = settle(
            &mut sections,
            Section::Recommendations,
            &symbol,
            recommendations,
            |r| !r.is_empty(),
        );
        overview.next_earnings_date = settle(
            &mut sections,
            Section::NextEarnings,
            &symbol,
            calendar.map(|events| next_earnings_date(&events, today)),
            |d| d.is_some(),
        );
        overview.earnings =
            settle(&mut sections, Section::Earnings, &symbol, earnings, |e| !e.is_empty());
        overview.peers = settle(&mut sections, Section::Peers, &symbol, peers, |p| !p.is_empty());

        overview.sections = sections;
        check_outcome(&overview)?;

        tracing::info!(
            "Overview for {} populated {}/{} sections",
            symbol,
            overview.populated_sections().len(),
            Section::ALL.len()
        );
        Ok(overview)
    }

    /// Derived indicator snapshot for `symbol`
    pub async fn indicators(&self, symbol: &str) -> Result<StockIndicators, MarketError> {
        let overview = self.check_stock(symbol).await?;
        Ok(derive_indicators(&overview))
    }

    /// Company news for the last `days` days, newest first
    pub async fn company_news(
        &self,
        symbol: &str,
        days: i64,
    ) -> Result<Vec<NewsArticle>, MarketError> {
        let symbol = normalize_symbol(symbol)?;
        let to = Utc::now().date_naive();
        let from = to - Duration::days(days.max(1));
        tracing::info!("Fetching news for {} from {} to {}", symbol, from, to);
        self.source.company_news(&symbol, from, to).await
    }
}

/// Record the section status and return the value, or its default on failure.
fn settle<T: Default>(
    sections: &mut BTreeMap<Section, SectionStatus>,
    section: Section,
    symbol: &str,
    result: Result<T, MarketError>,
    has_data: impl Fn(&T) -> bool,
) -> T {
    match result {
        Ok(value) => {
            let status = if has_data(&value) {
                SectionStatus::Populated
            } else {
                SectionStatus::Empty
            };
            sections.insert(section, status);
            value
        }
        Err(e) => {
            tracing::warn!("{} lookup failed for {}: {}", section.as_str(), symbol, e);
            sections.insert(section, SectionStatus::Unavailable(e.to_string()));
            T::default()
        }
    }
}

fn next_earnings_date(events: &[EarningsEvent], today: NaiveDate) -> Option<NaiveDate> {
    events.iter().map(|e| e.date).filter(|d| *d >= today).min()
}

fn check_outcome(overview: &StockOverview) -> Result<(), MarketError> {
    let statuses = &overview.sections;

    if !statuses.is_empty() && statuses.values().all(SectionStatus::is_unavailable) {
        let mut reasons: Vec<String> = statuses
            .values()
            .filter_map(|s| match s {
                SectionStatus::Unavailable(reason) => Some(reason.clone()),
                _ => None,
            })
            .collect();
        reasons.sort();
        reasons.dedup();
        return Err(MarketError::Unreachable {
            symbol: overview.symbol.clone(),
            reason: reasons.join("; "),
        });
    }

    if !statuses.values().any(SectionStatus::is_populated) {
        return Err(MarketError::NotFound(overview.symbol.clone()));
    }

    Ok(())
}
