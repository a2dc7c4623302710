use anyhow::Result;
use finnhub_client::FinnhubConfig;
use market_aggregator::{parse_earnings_lookahead, DEFAULT_EARNINGS_LOOKAHEAD_DAYS};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Server settings read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub finnhub: FinnhubConfig,
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub earnings_lookahead_days: i64,
    /// Empty means any origin
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let finnhub = FinnhubConfig::from_env()?;

        let database_url = non_empty_var("DATABASE_URL");
        let bind_addr =
            non_empty_var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let earnings_lookahead_days = match non_empty_var("EARNINGS_LOOKAHEAD_DAYS") {
            Some(raw) => parse_earnings_lookahead(&raw)?,
            None => DEFAULT_EARNINGS_LOOKAHEAD_DAYS,
        };

        let cors_origins = non_empty_var("CORS_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_default();

        Ok(Self {
            finnhub,
            database_url,
            bind_addr,
            earnings_lookahead_days,
            cors_origins,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://localhost:5173, https://example.com,,"),
            vec!["http://localhost:5173", "https://example.com"]
        );
        assert!(parse_origins(" , ").is_empty());
    }
}
