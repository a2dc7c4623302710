use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("No data found for {0}")]
    NotFound(String),

    /// Every sub-lookup of an aggregated query failed.
    #[error("Upstream unreachable for {symbol}: {reason}")]
    Unreachable { symbol: String, reason: String },

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Unauthorized: check FINNHUB_API_KEY")]
    Unauthorized,

    #[error("Rate limited by upstream")]
    RateLimited,

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
