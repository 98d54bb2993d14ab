use crate::fetcher::Fetcher;
use crate::normalizer::clean_text;
use crate::traits::CandidateSource;
use crate::types::{AgentError, Candidate, Category, ImageRef, Result, SourceKind};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;
use url::Url;

pub const NEWSDATA_API_URL: &str = "https://newsdata.io/api/1/latest";
pub const API_LIMIT: usize = 5;

#[derive(Debug, Deserialize)]
struct NewsDataResponse {
    status: Option<String>,
    #[serde(default)]
    results: Vec<NewsDataArticle>,
}

/// `creator` is an array in current responses and a bare string in older ones.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Creator {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct NewsDataArticle {
    link: Option<String>,
    title: Option<String>,
    creator: Option<Creator>,
    image_url: Option<String>,
    description: Option<String>,
    content: Option<String>,
}

/// Rank 2: the primary news API (`results` array).
pub struct NewsDataSource {
    fetcher: Fetcher,
    api_key: String,
    base_url: String,
    language: String,
}

impl NewsDataSource {
    pub fn new(fetcher: Fetcher, api_key: &str) -> Self {
        Self {
            fetcher,
            api_key: api_key.to_string(),
            base_url: NEWSDATA_API_URL.to_string(),
            language: "en".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn request_url(&self, category: Category) -> Result<Url> {
        let size = API_LIMIT.to_string();
        Ok(Url::parse_with_params(
            &self.base_url,
            &[
                ("apikey", self.api_key.as_str()),
                ("category", category.slug()),
                ("language", self.language.as_str()),
                ("size", size.as_str()),
            ],
        )?)
    }
}

#[async_trait]
impl CandidateSource for NewsDataSource {
    fn source_name(&self) -> String {
        "newsdata".to_string()
    }

    fn kind(&self) -> SourceKind {
        SourceKind::PrimaryApi
    }

    async fn fetch(&self, category: Category) -> Result<Vec<Candidate>> {
        let url = self.request_url(category)?;
        info!(%category, "Querying primary news API");

        let body = self.fetcher.fetch_text(url.as_str()).await?;
        let candidates = parse_response(&body)?;
        if candidates.is_empty() {
            return Err(AgentError::Source {
                source_name: self.source_name(),
                reason: "no results".to_string(),
            });
        }

        info!(%category, count = candidates.len(), "Primary API candidates");
        Ok(candidates)
    }
}

fn parse_response(body: &str) -> Result<Vec<Candidate>> {
    let response: NewsDataResponse = serde_json::from_str(body)
        .map_err(|e| AgentError::Parse(format!("malformed newsdata response: {}", e)))?;

    if let Some(status) = response.status.as_deref().filter(|s| *s != "success") {
        return Err(AgentError::Parse(format!("newsdata status {}", status)));
    }

    Ok(response
        .results
        .into_iter()
        .filter_map(into_candidate)
        .take(API_LIMIT)
        .collect())
}

fn into_candidate(article: NewsDataArticle) -> Option<Candidate> {
    let link = article.link.filter(|l| !l.trim().is_empty())?;
    let author = match article.creator {
        Some(Creator::One(name)) => Some(name),
        Some(Creator::Many(names)) => names.into_iter().next(),
        None => None,
    };

    Some(Candidate {
        title: article.title.unwrap_or_else(|| "Untitled".to_string()),
        link,
        image: article.image_url.filter(|u| !u.trim().is_empty()).map(ImageRef::Api),
        author,
        summary: pick_body(article.content, article.description),
        origin: SourceKind::PrimaryApi,
    })
}

/// Prefer the full content unless it is a plan-gated placeholder.
pub(crate) fn pick_body(content: Option<String>, description: Option<String>) -> Option<String> {
    content
        .filter(|c| !clean_text(c).is_empty())
        .or(description)
        .filter(|d| !d.trim().is_empty())
}
