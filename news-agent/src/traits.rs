use crate::types::{Candidate, Category, NewPost, Result, SourceKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// One ranked provider of candidate articles (feed, primary API, secondary API).
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Human-readable name used in logs
    fn source_name(&self) -> String;

    fn kind(&self) -> SourceKind;

    /// Fetch up to the provider's bound of candidates for `category`, in provider order.
    /// An empty result is reported as an error so the caller can move on.
    async fn fetch(&self, category: Category) -> Result<Vec<Candidate>>;
}

/// Narrow view of the remote `posts` table.
#[async_trait]
pub trait PostStore: Send + Sync {
    fn store_name(&self) -> String;

    /// Whether any row has this `source_url`.
    async fn exists(&self, source_url: &str) -> Result<bool>;

    async fn insert(&self, post: &NewPost) -> Result<()>;

    /// Delete every row with `created_at` strictly before `cutoff`; returns the count deleted.
    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}
