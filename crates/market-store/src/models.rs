use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WatchlistEntry {
    pub company_name: String,
    pub added_at: DateTime<Utc>,
}

/// A `company_news` row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StoredArticle {
    pub company_name: String,
    pub id: i64,
    /// Upstream article id
    pub article_id: i64,
    pub headline: String,
    pub summary: Option<String>,
    pub source: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub related: Option<String>,
    pub published_at: DateTime<Utc>,
    pub news_date: NaiveDate,
}
