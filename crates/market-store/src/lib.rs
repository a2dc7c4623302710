//! Postgres persistence for company news and the watchlist.

use anyhow::{bail, Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

pub mod models;
mod news;
mod watchlist;

pub use models::{StoredArticle, WatchlistEntry};

const SCHEMA: &str = include_str!("../schema.sql");

#[derive(Clone)]
pub struct MarketStore {
    pool: PgPool,
}

impl MarketStore {
    /// Connect and make sure the tables exist
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("failed to connect to DATABASE_URL")?;

        let store = Self { pool };
        store.init_schema().await?;
        tracing::info!("Market store ready");

        Ok(store)
    }

    /// Run the bundled `CREATE ... IF NOT EXISTS` statements
    async fn init_schema(&self) -> Result<()> {
        // sqlx prepares one statement at a time
        for statement in schema_statements(SCHEMA) {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .with_context(|| format!("schema statement failed: {}", statement))?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn schema_statements(schema: &str) -> Vec<&str> {
    schema
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

pub const MAX_COMPANY_NAME_LEN: usize = 200;

/// Trimmed company name, rejecting blanks and oversized input.
/// Every store operation keyed by company applies this first.
pub fn company_key(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        bail!("company name is empty");
    }
    if name.chars().count() > MAX_COMPANY_NAME_LEN {
        bail!(
            "company name is longer than {} characters",
            MAX_COMPANY_NAME_LEN
        );
    }
    Ok(name.to_string())
}
