//! Indicator view derived from an aggregated overview.
//!
//! Finnhub reports the same figure under different names depending on the
//! filing cadence (`totalDebt`, `totalDebtTTM`, `totalDebtAnnual`, ...), so
//! each indicator resolves from an ordered alias list: first present wins.

use market_core::{FinancialMetrics, StockIndicators, StockOverview};
use std::collections::BTreeMap;

const SHORT_INTEREST: &[&str] = &[
    "shortPercent",
    "shortPercentFloat",
    "shortInterestPercentOfFloat",
];
const CASH: &[&str] = &[
    "cashAndCashEquivalents",
    "cashAndCashEquivalentsTTM",
    "cashAndCashEquivalentsAnnual",
    "totalCash",
];
const TOTAL_DEBT: &[&str] = &["totalDebt", "totalDebtTTM", "totalDebtAnnual"];
const CAPEX: &[&str] = &[
    "capitalExpenditure",
    "capitalExpenditureTTM",
    "capitalExpenditureAnnual",
    "capexTTM",
];
const OPERATING_CASH_FLOW: &[&str] = &[
    "operatingCashFlow",
    "operatingCashFlowTTM",
    "operatingCashFlowAnnual",
];
const REVENUE: &[&str] = &["revenueTTM", "totalRevenue", "totalRevenueTTM"];
const NET_INCOME: &[&str] = &[
    "netIncome",
    "netIncomeTTM",
    "netIncomeCommonStockholders",
    "netIncomeCommon",
];
const RSI: &[&str] = &["14DayRSI", "RSI"];
const MOVING_AVERAGES: &[&str] = &["10DayAverageTradingVolume", "50DayMA", "200DayMA"];

/// Metrics passed through to [`StockIndicators::extra`] as reported.
/// `marketCapitalization` is left out, it already backs `market_cap`.
const EXTRA_METRICS: &[&str] = &[
    "10DayAverageTradingVolume",
    "13WeekPriceReturnDaily",
    "26WeekPriceReturnDaily",
    "3MonthADReturnStd",
    "3MonthAverageTradingVolume",
    "52WeekHigh",
    "52WeekLow",
    "52WeekPriceReturnDaily",
    "5DayPriceReturnDaily",
    "beta",
    "bookValuePerShareAnnual",
    "bookValuePerShareQuarterly",
    "bookValueShareGrowth5Y",
    "capexCagr5Y",
    "cashFlowPerShareAnnual",
    "cashFlowPerShareQuarterly",
    "cashFlowPerShareTTM",
    "currentEv/freeCashFlowAnnual",
    "currentEv/freeCashFlowTTM",
    "currentRatioAnnual",
    "currentRatioQuarterly",
    "epsAnnual",
    "epsGrowth3Y",
    "epsGrowth5Y",
    "epsGrowthQuarterlyYoy",
    "epsGrowthTTMYoy",
    "epsInclExtraItemsAnnual",
    "epsInclExtraItemsTTM",
    "epsNormalizedAnnual",
    "epsTTM",
    "evRevenueTTM",
    "focfCagr5Y",
    "forwardPE",
    "grossMargin5Y",
    "grossMarginAnnual",
    "grossMarginTTM",
    "longTermDebt/equityAnnual",
    "longTermDebt/equityQuarterly",
    "monthToDatePriceReturnDaily",
    "netIncomeEmployeeAnnual",
    "netIncomeEmployeeTTM",
    "netInterestCoverageAnnual",
    "netMarginGrowth5Y",
    "netProfitMargin5Y",
    "netProfitMarginAnnual",
    "netProfitMarginTTM",
    "operatingMargin5Y",
    "operatingMarginAnnual",
    "operatingMarginTTM",
    "payoutRatioAnnual",
    "peAnnual",
    "priceRelativeToS&P50013Week",
    "priceRelativeToS&P50026Week",
    "priceRelativeToS&P5004Week",
    "priceRelativeToS&P50052Week",
    "priceRelativeToS&P500Ytd",
    "revenueGrowth3Y",
    "revenueGrowth5Y",
    "revenueGrowthQuarterlyYoy",
    "revenueGrowthTTMYoy",
    "revenuePerShareAnnual",
    "revenuePerShareTTM",
    "revenueShareGrowth5Y",
    "tangibleBookValuePerShareAnnual",
    "tangibleBookValuePerShareQuarterly",
    "tbvCagr5Y",
    "totalDebt/totalEquityAnnual",
    "totalDebt/totalEquityQuarterly",
    "yearToDatePriceReturnDaily",
];

/// Upstream names that are reported under a clearer key
const EXTRA_RENAMES: &[(&str, &str)] = &[("3MonthADReturnStd", "3MonthAvgDailyReturnStdDev")];

/// Build the indicator snapshot. Derived values are only filled when every
/// input is present; ratios additionally require a non-zero denominator.
pub fn derive_indicators(overview: &StockOverview) -> StockIndicators {
    let metrics = &overview.metrics;
    let quote = overview.quote.clone().unwrap_or_default();

    let market_cap = overview
        .profile
        .as_ref()
        .and_then(|p| p.market_cap)
        .or_else(|| metrics.get("marketCapitalization"));
    let cash = metrics.first_of(CASH);
    let total_debt = metrics.first_of(TOTAL_DEBT);
    let capex = metrics.first_of(CAPEX);
    let operating_cash_flow = metrics.first_of(OPERATING_CASH_FLOW);

    let enterprise_value = match (market_cap, total_debt, cash) {
        (Some(mc), Some(debt), Some(cash)) => Some(mc + debt - cash),
        _ => None,
    };
    let free_cash_flow = match (operating_cash_flow, capex) {
        (Some(ocf), Some(capex)) => Some(ocf - capex),
        _ => None,
    };
    let fcf_margin = ratio(free_cash_flow, metrics.first_of(REVENUE));
    let cash_conversion = ratio(free_cash_flow, metrics.first_of(NET_INCOME));

    let latest = overview.latest_recommendation();

    StockIndicators {
        symbol: overview.symbol.clone(),
        open_price: quote.open,
        high_price: quote.high,
        low_price: quote.low,
        close_price: quote.current,
        previous_close: quote.prev_close,
        quote_timestamp: quote.timestamp,
        market_cap,
        enterprise_value,
        beta: metrics.get("beta"),
        week52_high: metrics.get("52WeekHigh"),
        week52_low: metrics.get("52WeekLow"),
        short_interest_pct_float: metrics.first_of(SHORT_INTEREST),
        cash_and_equivalents: cash,
        total_debt,
        capex,
        operating_cash_flow,
        free_cash_flow,
        fcf_margin,
        cash_conversion,
        rsi: metrics.first_of(RSI),
        macd: metrics.get("MACD"),
        moving_averages: moving_averages(metrics),
        extra: extra_metrics(metrics),
        recommendation: latest.and_then(|r| r.dominant_label()).map(str::to_string),
        recommendation_counts: latest.cloned(),
    }
}

fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d),
        _ => None,
    }
}

fn moving_averages(metrics: &FinancialMetrics) -> BTreeMap<String, f64> {
    MOVING_AVERAGES
        .iter()
        .filter_map(|k| metrics.get(k).map(|v| (k.to_string(), v)))
        .collect()
}

fn extra_metrics(metrics: &FinancialMetrics) -> BTreeMap<String, f64> {
    EXTRA_METRICS
        .iter()
        .filter_map(|&key| {
            let value = metrics.get(key)?;
            let name = EXTRA_RENAMES
                .iter()
                .find(|(from, _)| *from == key)
                .map_or(key, |(_, to)| *to);
            Some((name.to_string(), value))
        })
        .collect()
}
