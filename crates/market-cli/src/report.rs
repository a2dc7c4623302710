//! Plain-text rendering for terminal output.

use colored::Colorize;
use market_core::{NewsArticle, SectionStatus, StockIndicators, StockOverview};
use market_store::WatchlistEntry;
use std::fmt::Write;

/// Metrics shown in the overview table, in display order
const HEADLINE_METRICS: &[(&str, &str)] = &[
    ("peTTM", "P/E (TTM)"),
    ("epsTTM", "EPS (TTM)"),
    ("beta", "Beta"),
    ("52WeekHigh", "52w high"),
    ("52WeekLow", "52w low"),
    ("dividendYieldIndicatedAnnual", "Dividend yield %"),
    ("roeTTM", "ROE (TTM) %"),
    ("netProfitMarginTTM", "Net margin (TTM) %"),
];

const MAX_EARNINGS_ROWS: usize = 4;

pub fn fmt_num(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

/// Millions-denominated figure as a short human string
pub fn fmt_millions(value: Option<f64>) -> String {
    match value {
        Some(v) if v.abs() >= 1_000_000.0 => format!("{:.2}T", v / 1_000_000.0),
        Some(v) if v.abs() >= 1_000.0 => format!("{:.2}B", v / 1_000.0),
        Some(v) => format!("{:.2}M", v),
        None => "-".to_string(),
    }
}

fn fmt_change(change: Option<f64>, percent: Option<f64>) -> String {
    let (Some(change), Some(percent)) = (change, percent) else {
        return String::new();
    };
    let text = format!("{:+.2} ({:+.2}%)", change, percent);
    if change >= 0.0 {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", title.bold().cyan());
}

fn row(out: &mut String, label: &str, value: impl AsRef<str>) {
    let _ = writeln!(out, "  {:<20} {}", label, value.as_ref());
}

pub fn render_overview(overview: &StockOverview) -> String {
    let mut out = String::new();

    let name = overview
        .profile
        .as_ref()
        .and_then(|p| p.name.clone())
        .unwrap_or_default();
    let _ = write!(out, "{}  {}", overview.symbol.bold(), name);
    if let Some(exchange) = overview.profile.as_ref().and_then(|p| p.exchange.as_deref()) {
        let _ = write!(out, "  ({})", exchange);
    }
    out.push('\n');

    if let Some(quote) = &overview.quote {
        heading(&mut out, "Quote");
        row(
            &mut out,
            "Price",
            format!(
                "{}  {}",
                fmt_num(quote.current),
                fmt_change(quote.change, quote.percent_change)
            ),
        );
        row(
            &mut out,
            "Open / High / Low",
            format!(
                "{} / {} / {}",
                fmt_num(quote.open),
                fmt_num(quote.high),
                fmt_num(quote.low)
            ),
        );
        row(&mut out, "Previous close", fmt_num(quote.prev_close));
    }

    if let Some(profile) = &overview.profile {
        heading(&mut out, "Profile");
        if let Some(industry) = &profile.industry {
            row(&mut out, "Industry", industry);
        }
        if let Some(country) = &profile.country {
            row(&mut out, "Country", country);
        }
        row(&mut out, "Market cap", fmt_millions(profile.market_cap));
        if let Some(ipo) = profile.ipo {
            row(&mut out, "IPO", ipo.to_string());
        }
        if let Some(website) = &profile.website {
            row(&mut out, "Website", website);
        }
    }

    if !overview.metrics.is_empty() {
        heading(
            &mut out,
            &format!("Metrics ({} reported)", overview.metrics.values.len()),
        );
        for (key, label) in HEADLINE_METRICS {
            if let Some(value) = overview.metrics.get(key) {
                row(&mut out, label, format!("{:.2}", value));
            }
        }
    }

    if let Some(trend) = overview.latest_recommendation() {
        heading(&mut out, &format!("Analysts ({})", trend.period));
        row(
            &mut out,
            "SB / B / H / S / SS",
            format!(
                "{} / {} / {} / {} / {}",
                trend.strong_buy, trend.buy, trend.hold, trend.sell, trend.strong_sell
            ),
        );
        if let Some(label) = trend.dominant_label() {
            row(&mut out, "Consensus", label.bold().to_string());
        }
    }

    if overview.next_earnings_date.is_some() || !overview.earnings.is_empty() {
        heading(&mut out, "Earnings");
        if let Some(date) = overview.next_earnings_date {
            row(&mut out, "Next report", date.to_string());
        }
        for surprise in overview.earnings.iter().take(MAX_EARNINGS_ROWS) {
            row(
                &mut out,
                &surprise.period.to_string(),
                format!(
                    "actual {} vs est {} ({}%)",
                    fmt_num(surprise.actual),
                    fmt_num(surprise.estimate),
                    fmt_num(surprise.surprise_percent)
                ),
            );
        }
    }

    if !overview.peers.is_empty() {
        heading(&mut out, "Peers");
        let _ = writeln!(out, "  {}", overview.peers.join(", "));
    }

    let unavailable: Vec<_> = overview
        .sections
        .iter()
        .filter_map(|(section, status)| match status {
            SectionStatus::Unavailable(reason) => Some((section, reason)),
            _ => None,
        })
        .collect();
    if !unavailable.is_empty() {
        heading(&mut out, "Unavailable");
        for (section, reason) in unavailable {
            row(&mut out, section.as_str(), reason.yellow().to_string());
        }
    }

    out
}

pub fn render_indicators(ind: &StockIndicators) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", ind.symbol.bold());

    heading(&mut out, "Price");
    row(&mut out, "Close", fmt_num(ind.close_price));
    row(&mut out, "Previous close", fmt_num(ind.previous_close));
    row(
        &mut out,
        "Open / High / Low",
        format!(
            "{} / {} / {}",
            fmt_num(ind.open_price),
            fmt_num(ind.high_price),
            fmt_num(ind.low_price)
        ),
    );
    row(
        &mut out,
        "52w range",
        format!("{} - {}", fmt_num(ind.week52_low), fmt_num(ind.week52_high)),
    );

    heading(&mut out, "Valuation");
    row(&mut out, "Market cap", fmt_millions(ind.market_cap));
    row(&mut out, "Enterprise value", fmt_millions(ind.enterprise_value));
    row(&mut out, "Beta", fmt_num(ind.beta));
    row(&mut out, "Short interest %", fmt_num(ind.short_interest_pct_float));

    heading(&mut out, "Cash flow");
    row(&mut out, "Cash", fmt_millions(ind.cash_and_equivalents));
    row(&mut out, "Total debt", fmt_millions(ind.total_debt));
    row(&mut out, "Operating cash flow", fmt_millions(ind.operating_cash_flow));
    row(&mut out, "Capex", fmt_millions(ind.capex));
    row(&mut out, "Free cash flow", fmt_millions(ind.free_cash_flow));
    row(&mut out, "FCF margin", fmt_num(ind.fcf_margin));
    row(&mut out, "Cash conversion", fmt_num(ind.cash_conversion));

    heading(&mut out, "Technicals");
    row(&mut out, "RSI", fmt_num(ind.rsi));
    row(&mut out, "MACD", fmt_num(ind.macd));
    for (name, value) in &ind.moving_averages {
        row(&mut out, name, format!("{:.2}", value));
    }

    if !ind.extra.is_empty() {
        heading(&mut out, "Reported metrics");
        for (name, value) in &ind.extra {
            row(&mut out, name, format!("{:.2}", value));
        }
    }

    if let Some(label) = &ind.recommendation {
        heading(&mut out, "Analysts");
        row(&mut out, "Consensus", label.bold().to_string());
    }

    out
}

pub fn render_news(symbol: &str, articles: &[NewsArticle]) -> String {
    let mut out = String::new();
    if articles.is_empty() {
        let _ = writeln!(out, "No news for {}", symbol);
        return out;
    }

    let _ = writeln!(out, "{} articles for {}", articles.len(), symbol.bold());
    for article in articles {
        let _ = writeln!(
            out,
            "\n{}  {}",
            article.published_at.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            article.headline.bold()
        );
        if let Some(source) = &article.source {
            let _ = writeln!(out, "  {}", source);
        }
        if let Some(url) = &article.url {
            let _ = writeln!(out, "  {}", url.blue());
        }
    }
    out
}

pub fn render_watchlist(entries: &[WatchlistEntry]) -> String {
    if entries.is_empty() {
        return "Watchlist is empty\n".to_string();
    }
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(
            out,
            "{:<40} {}",
            entry.company_name,
            entry.added_at.format("%Y-%m-%d").to_string().dimmed()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use market_core::{CompanyProfile, Quote, RecommendationTrend, Section};

    fn overview() -> StockOverview {
        let mut overview = StockOverview::empty("MSFT");
        overview.quote = Some(Quote {
            current: Some(415.2),
            change: Some(-1.5),
            percent_change: Some(-0.36),
            ..Default::default()
        });
        overview.profile = Some(CompanyProfile {
            name: Some("Microsoft Corp".to_string()),
            exchange: Some("NASDAQ NMS - GLOBAL MARKET".to_string()),
            market_cap: Some(3_086_000.0),
            ..Default::default()
        });
        overview.recommendations = vec![RecommendationTrend {
            period: "2024-05-01".to_string(),
            strong_buy: 20,
            buy: 30,
            hold: 5,
            sell: 0,
            strong_sell: 0,
        }];
        overview.next_earnings_date = NaiveDate::from_ymd_opt(2024, 7, 23);
        overview.peers = vec!["MSFT".to_string(), "ORCL".to_string()];
        overview.sections.insert(Section::Quote, SectionStatus::Populated);
        overview.sections.insert(
            Section::Metrics,
            SectionStatus::Unavailable("Rate limited by upstream".to_string()),
        );
        overview
    }

    #[test]
    fn test_fmt_millions() {
        assert_eq!(fmt_millions(Some(3_086_000.0)), "3.09T");
        assert_eq!(fmt_millions(Some(2_500.0)), "2.50B");
        assert_eq!(fmt_millions(Some(12.0)), "12.00M");
        assert_eq!(fmt_millions(None), "-");
    }

    #[test]
    fn test_render_overview_sections() {
        let text = render_overview(&overview());
        assert!(text.contains("Microsoft Corp"));
        assert!(text.contains("415.20"));
        assert!(text.contains("-1.50 (-0.36%)"));
        assert!(text.contains("3.09T"));
        assert!(text.contains("Buy"));
        assert!(text.contains("2024-07-23"));
        assert!(text.contains("MSFT, ORCL"));
        assert!(text.contains("Rate limited by upstream"));
    }

    #[test]
    fn test_render_overview_skips_missing_sections() {
        let text = render_overview(&StockOverview::empty("ZZZZ"));
        assert!(text.contains("ZZZZ"));
        assert!(!text.contains("Quote"));
        assert!(!text.contains("Peers"));
    }

    #[test]
    fn test_render_indicators_placeholders() {
        let text = render_indicators(&StockIndicators {
            symbol: "MSFT".to_string(),
            close_price: Some(415.2),
            ..Default::default()
        });
        assert!(text.contains("415.20"));
        assert!(text.contains("Enterprise value"));
        assert!(!text.contains("Consensus"));
    }

    #[test]
    fn test_render_indicators_extra_metrics() {
        let mut indicators = StockIndicators {
            symbol: "MSFT".to_string(),
            ..Default::default()
        };
        assert!(!render_indicators(&indicators).contains("Reported metrics"));

        indicators.extra.insert("peAnnual".to_string(), 34.25);
        let text = render_indicators(&indicators);
        assert!(text.contains("Reported metrics"));
        assert!(text.contains("peAnnual"));
        assert!(text.contains("34.25"));
    }

    #[test]
    fn test_render_news() {
        let articles = vec![NewsArticle {
            id: 7,
            headline: "Microsoft beats estimates".to_string(),
            summary: None,
            source: Some("Reuters".to_string()),
            url: Some("https://example.com/a".to_string()),
            image: None,
            category: None,
            related: Some("MSFT".to_string()),
            published_at: Utc.with_ymd_and_hms(2024, 5, 1, 14, 30, 0).unwrap(),
        }];
        let text = render_news("MSFT", &articles);
        assert!(text.contains("1 articles"));
        assert!(text.contains("2024-05-01 14:30"));
        assert!(text.contains("Microsoft beats estimates"));
        assert!(render_news("MSFT", &[]).contains("No news for MSFT"));
    }

    #[test]
    fn test_render_watchlist() {
        assert_eq!(render_watchlist(&[]), "Watchlist is empty\n");
        let entries = vec![WatchlistEntry {
            company_name: "Apple Inc".to_string(),
            added_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        }];
        assert!(render_watchlist(&entries).contains("Apple Inc"));
    }
}
