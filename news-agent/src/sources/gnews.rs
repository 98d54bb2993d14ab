use crate::fetcher::Fetcher;
use crate::sources::newsdata::{pick_body, API_LIMIT};
use crate::traits::CandidateSource;
use crate::types::{AgentError, Candidate, Category, ImageRef, Result, SourceKind};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;
use url::Url;

pub const GNEWS_API_URL: &str = "https://gnews.io/api/v4/top-headlines";

#[derive(Debug, Deserialize)]
struct GNewsResponse {
    #[serde(default)]
    articles: Vec<GNewsArticle>,
}

#[derive(Debug, Deserialize)]
struct GNewsArticle {
    url: Option<String>,
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    image: Option<String>,
    source: Option<GNewsPublisher>,
}

#[derive(Debug, Deserialize)]
struct GNewsPublisher {
    name: Option<String>,
}

/// Rank 3: the secondary news API (`articles` array).
pub struct GNewsSource {
    fetcher: Fetcher,
    api_key: String,
    base_url: String,
    language: String,
}

impl GNewsSource {
    pub fn new(fetcher: Fetcher, api_key: &str) -> Self {
        Self {
            fetcher,
            api_key: api_key.to_string(),
            base_url: GNEWS_API_URL.to_string(),
            language: "en".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn request_url(&self, category: Category) -> Result<Url> {
        let max = API_LIMIT.to_string();
        Ok(Url::parse_with_params(
            &self.base_url,
            &[
                ("category", category.slug()),
                ("lang", self.language.as_str()),
                ("max", max.as_str()),
                ("apikey", self.api_key.as_str()),
            ],
        )?)
    }
}

#[async_trait]
impl CandidateSource for GNewsSource {
    fn source_name(&self) -> String {
        "gnews".to_string()
    }

    fn kind(&self) -> SourceKind {
        SourceKind::SecondaryApi
    }

    async fn fetch(&self, category: Category) -> Result<Vec<Candidate>> {
        let url = self.request_url(category)?;
        info!(%category, "Querying secondary news API");

        let body = self.fetcher.fetch_text(url.as_str()).await?;
        let candidates = parse_response(&body)?;
        if candidates.is_empty() {
            return Err(AgentError::Source {
                source_name: self.source_name(),
                reason: "no articles".to_string(),
            });
        }

        info!(%category, count = candidates.len(), "Secondary API candidates");
        Ok(candidates)
    }
}

fn parse_response(body: &str) -> Result<Vec<Candidate>> {
    let response: GNewsResponse = serde_json::from_str(body)
        .map_err(|e| AgentError::Parse(format!("malformed gnews response: {}", e)))?;

    Ok(response
        .articles
        .into_iter()
        .filter_map(into_candidate)
        .take(API_LIMIT)
        .collect())
}

fn into_candidate(article: GNewsArticle) -> Option<Candidate> {
    let link = article.url.filter(|u| !u.trim().is_empty())?;

    Some(Candidate {
        title: article.title.unwrap_or_else(|| "Untitled".to_string()),
        link,
        image: article.image.filter(|u| !u.trim().is_empty()).map(ImageRef::Api),
        // GNews names the publisher, not the writer; enrichment decides whether it reads as a name.
        author: article.source.and_then(|s| s.name),
        summary: pick_body(article.content, article.description),
        origin: SourceKind::SecondaryApi,
    })
}
