use crate::traits::PostStore;
use crate::types::{AgentError, NewPost, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use tracing::info;

/// Schema for the `posts` table, embedded at build time.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Direct connection to the Postgres database holding `posts`.
/// Pending migrations are applied on connect.
pub struct PgPostStore {
    db: Pool<Postgres>,
}

impl PgPostStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(2)
            .connect(database_url)
            .await?;

        MIGRATOR.run(&db).await?;
        info!("Connected to Postgres post store");
        Ok(Self { db })
    }

    pub fn from_pool(db: Pool<Postgres>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    fn store_name(&self) -> String {
        "postgres".to_string()
    }

    async fn exists(&self, source_url: &str) -> Result<bool> {
        let found = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM posts WHERE source_url = $1)",
        )
        .bind(source_url)
        .fetch_one(&self.db)
        .await?;
        Ok(found)
    }

    async fn insert(&self, post: &NewPost) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO posts (title, slug, content, source_url, category, author, image_url,
                               is_published, views_count, likes_count, ad_image, ad_link)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.content)
        .bind(&post.source_url)
        .bind(post.category.as_str())
        .bind(&post.author)
        .bind(&post.image_url)
        .bind(post.is_published)
        .bind(post.views_count)
        .bind(post.likes_count)
        .bind(&post.ad_image)
        .bind(&post.ad_link)
        .execute(&self.db)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AgentError::Duplicate {
                source_url: post.source_url.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM posts WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }
}
