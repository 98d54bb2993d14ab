use crate::fetcher::Fetcher;
use crate::parser::FeedParser;
use crate::traits::CandidateSource;
use crate::types::{AgentError, Candidate, Category, Result, SourceKind};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::info;

pub const FEED_LIMIT: usize = 10;

/// Section feeds used when no override is configured.
pub fn default_feed_urls() -> HashMap<Category, String> {
    HashMap::from([
        (Category::Technology, "https://feeds.bbci.co.uk/news/technology/rss.xml".to_string()),
        (Category::World, "https://feeds.bbci.co.uk/news/world/rss.xml".to_string()),
        (Category::Sports, "https://feeds.bbci.co.uk/sport/rss.xml".to_string()),
        (Category::Business, "https://feeds.bbci.co.uk/news/business/rss.xml".to_string()),
        (Category::Health, "https://feeds.bbci.co.uk/news/health/rss.xml".to_string()),
        (
            Category::Entertainment,
            "https://feeds.bbci.co.uk/news/entertainment_and_arts/rss.xml".to_string(),
        ),
    ])
}

/// Rank 1: a syndication feed per category.
pub struct RssFeedSource {
    fetcher: Fetcher,
    feed_urls: HashMap<Category, String>,
    limit: usize,
}

impl RssFeedSource {
    pub fn new(fetcher: Fetcher, feed_urls: HashMap<Category, String>) -> Self {
        Self {
            fetcher,
            feed_urls,
            limit: FEED_LIMIT,
        }
    }

    pub fn feed_url(&self, category: Category) -> Option<&str> {
        self.feed_urls.get(&category).map(String::as_str)
    }

    fn failure(&self, reason: impl Into<String>) -> AgentError {
        AgentError::Source {
            source_name: self.source_name(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl CandidateSource for RssFeedSource {
    fn source_name(&self) -> String {
        "rss".to_string()
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Feed
    }

    async fn fetch(&self, category: Category) -> Result<Vec<Candidate>> {
        let url = self
            .feed_url(category)
            .ok_or_else(|| self.failure(format!("no feed configured for {}", category)))?;

        info!(%category, url, "Pulling feed");
        let content = self.fetcher.fetch_text(url).await?;

        let candidates = FeedParser::new().parse_candidates(&content, self.limit)?;
        if candidates.is_empty() {
            return Err(self.failure("feed has no entries"));
        }

        info!(%category, count = candidates.len(), "Feed candidates");
        Ok(candidates)
    }
}
