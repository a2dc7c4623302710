use anyhow::Result;
use market_core::NewsArticle;

use crate::{company_key, MarketStore, StoredArticle};

const MAX_LIST_LIMIT: i64 = 500;

impl MarketStore {
    /// Store articles under `company_name`, skipping ones already stored.
    /// Returns how many rows were inserted.
    pub async fn insert_news(&self, company_name: &str, articles: &[NewsArticle]) -> Result<u64> {
        let name = company_key(company_name)?;
        let mut tx = self.pool().begin().await?;
        let mut inserted = 0;

        for article in articles {
            let result = sqlx::query(
                r#"
                INSERT INTO company_news
                    (company_name, article_id, headline, summary, source, url, image,
                     category, related, published_at, news_date)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                ON CONFLICT (company_name, article_id) DO NOTHING
                "#,
            )
            .bind(&name)
            .bind(article.id)
            .bind(&article.headline)
            .bind(&article.summary)
            .bind(&article.source)
            .bind(&article.url)
            .bind(&article.image)
            .bind(&article.category)
            .bind(&article.related)
            .bind(article.published_at)
            .bind(article.published_at.date_naive())
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;
        tracing::info!(
            "Stored {} of {} articles for {}",
            inserted,
            articles.len(),
            name
        );
        Ok(inserted)
    }

    /// Newest first
    pub async fn list_news(&self, company_name: &str, limit: i64) -> Result<Vec<StoredArticle>> {
        let name = company_key(company_name)?;

        let rows = sqlx::query_as(
            r#"
            SELECT company_name, id, article_id, headline, summary, source, url, image,
                   category, related, published_at, news_date
            FROM company_news
            WHERE company_name = $1
            ORDER BY published_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(&name)
        .bind(limit.clamp(1, MAX_LIST_LIMIT))
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use crate::MarketStore;
    use chrono::{TimeZone, Utc};
    use market_core::NewsArticle;

    fn article(id: i64, hour: u32) -> NewsArticle {
        NewsArticle {
            id,
            headline: format!("Headline {}", id),
            summary: None,
            source: Some("Reuters".to_string()),
            url: None,
            image: None,
            category: Some("company".to_string()),
            related: Some("TEST".to_string()),
            published_at: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    #[ignore]
    async fn test_news_insert_skips_duplicates() {
        let url = std::env::var("TEST_DATABASE_URL").unwrap();
        let store = MarketStore::connect(&url).await.unwrap();
        let company = format!("News Test {}", Utc::now().timestamp_nanos_opt().unwrap());

        let batch = vec![article(1, 9), article(2, 11)];
        assert_eq!(store.insert_news(&company, &batch).await.unwrap(), 2);
        assert_eq!(store.insert_news(&company, &batch).await.unwrap(), 0);

        let stored = store.list_news(&company, 10).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].article_id, 2);
        assert_eq!(stored[0].news_date, chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }
}
