use anyhow::Result;

use crate::{company_key, MarketStore, WatchlistEntry};

impl MarketStore {
    /// Add a company; re-adding keeps the original timestamp
    pub async fn add_to_watchlist(&self, company_name: &str) -> Result<WatchlistEntry> {
        let name = company_key(company_name)?;

        let entry: WatchlistEntry = sqlx::query_as(
            r#"
            INSERT INTO watchlist (company_name)
            VALUES ($1)
            ON CONFLICT (company_name) DO UPDATE SET company_name = EXCLUDED.company_name
            RETURNING company_name, added_at
            "#,
        )
        .bind(&name)
        .fetch_one(self.pool())
        .await?;

        tracing::info!("Watchlist: added {}", entry.company_name);
        Ok(entry)
    }

    /// Returns false when the company was not on the watchlist
    pub async fn remove_from_watchlist(&self, company_name: &str) -> Result<bool> {
        let name = company_key(company_name)?;

        let result = sqlx::query("DELETE FROM watchlist WHERE company_name = $1")
            .bind(&name)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Oldest first
    pub async fn list_watchlist(&self) -> Result<Vec<WatchlistEntry>> {
        let entries = sqlx::query_as(
            "SELECT company_name, added_at FROM watchlist ORDER BY added_at ASC, company_name ASC",
        )
        .fetch_all(self.pool())
        .await?;

        Ok(entries)
    }
}
