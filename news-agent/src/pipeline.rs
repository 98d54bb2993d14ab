use crate::cascade::{Attempt, Cascade};
use crate::config::AgentConfig;
use crate::enrichment::Enricher;
use crate::fetcher::Fetcher;
use crate::gate::PersistenceGate;
use crate::generator::{ArticleGenerator, GenerationRequest};
use crate::llm_adapter::GeminiClient;
use crate::normalizer::{normalize_content, truncate_chars};
use crate::random::RandomSource;
use crate::sources::{default_feed_urls, GNewsSource, NewsDataSource, RssFeedSource};
use crate::store;
use crate::traits::CandidateSource;
use crate::types::{
    AgentError, Candidate, Category, NewPost, PipelineMode, Result, RunSummary, SavedPost,
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Extracted page text is cut to this many characters before generation.
pub const DRAFT_CONTENT_CHARS: usize = 5000;

const MODEL_TIMEOUT: Duration = Duration::from_secs(120);

/// Page-text extraction used by the draft pipeline.
struct TextExtractor {
    fetcher: Fetcher,
    prefix: String,
}

/// Drives every configured category through the source cascade, stopping a
/// category at its first saved post.
pub struct BlogAgent {
    sources: Vec<Box<dyn CandidateSource>>,
    gate: PersistenceGate,
    generator: ArticleGenerator,
    enricher: Enricher,
    mode: PipelineMode,
    categories: Vec<Category>,
    extractor: Option<TextExtractor>,
}

impl BlogAgent {
    pub fn new(gate: PersistenceGate, generator: ArticleGenerator, enricher: Enricher, mode: PipelineMode) -> Self {
        Self {
            sources: Vec::new(),
            gate,
            generator,
            enricher,
            mode,
            categories: Category::ALL.to_vec(),
            extractor: None,
        }
    }

    /// Wire the production collaborators: the three ranked sources, Gemini,
    /// and whichever post store the configuration selects.
    pub async fn from_config(config: &AgentConfig) -> Result<Self> {
        let fetcher = Fetcher::new(config.fetch.clone())?;
        let store = store::connect(&config.store, fetcher.client().clone()).await?;

        let model_http = Client::builder().timeout(MODEL_TIMEOUT).build()?;
        let model = Arc::new(GeminiClient::new(&config.gemini_api_key, model_http));
        let generator = ArticleGenerator::new(model, config.models.clone(), config.rate_limit_cooldown);

        let random = match config.seed {
            Some(seed) => RandomSource::seeded(seed),
            None => RandomSource::from_os(),
        };
        let enricher = Enricher::new(Arc::new(random));
        let gate = PersistenceGate::new(store, config.effective_insert_cooldown());

        let mut agent = Self::new(gate, generator, enricher, config.mode).with_categories(config.categories.clone());
        agent.add_source(Box::new(RssFeedSource::new(fetcher.clone(), default_feed_urls())));
        agent.add_source(Box::new(NewsDataSource::new(fetcher.clone(), &config.newsdata_api_key)));
        agent.add_source(Box::new(GNewsSource::new(fetcher.clone(), &config.gnews_api_key)));

        if config.mode == PipelineMode::Draft {
            agent = agent.with_extractor(fetcher, &config.text_extractor_url);
        }
        Ok(agent)
    }

    /// Sources are tried in the order they were added.
    pub fn add_source(&mut self, source: Box<dyn CandidateSource>) {
        info!(source = %source.source_name(), rank = self.sources.len() + 1, "Adding source");
        self.sources.push(source);
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_extractor(mut self, fetcher: Fetcher, prefix: &str) -> Self {
        self.extractor = Some(TextExtractor {
            fetcher,
            prefix: prefix.to_string(),
        });
        self
    }

    pub fn mode(&self) -> PipelineMode {
        self.mode
    }

    pub async fn run(&self) -> RunSummary {
        info!(
            mode = ?self.mode,
            categories = self.categories.len(),
            sources = self.sources.len(),
            "Starting run"
        );

        let mut summary = RunSummary::default();
        for &category in &self.categories {
            match self.process_category(category).await {
                Some(saved) => summary.saved.push(saved),
                None => {
                    warn!(%category, "No post saved for category");
                    summary.skipped_categories.push(category);
                }
            }
        }

        info!(
            saved = summary.saved_count(),
            skipped = summary.skipped_categories.len(),
            "Run finished"
        );
        summary
    }

    pub async fn process_category(&self, category: Category) -> Option<SavedPost> {
        info!(%category, "Processing category");
        Cascade::immediate()
            .run(self.sources.iter(), |source| self.process_source(&**source, category))
            .await
    }

    async fn process_source(&self, source: &dyn CandidateSource, category: Category) -> Attempt<SavedPost> {
        let candidates = match source.fetch(category).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(%category, source = %source.source_name(), error = %e, "Source unavailable, trying next");
                return Attempt::Failed;
            }
        };

        for candidate in &candidates {
            match self.process_candidate(category, candidate).await {
                Ok(saved) => return Attempt::Succeeded(saved),
                Err(AgentError::Duplicate { .. }) => {
                    debug!(%category, link = %candidate.link, "Already stored");
                }
                Err(e @ AgentError::InsufficientContent { .. }) => {
                    info!(%category, title = %candidate.title, reason = %e, "Skipping candidate");
                }
                Err(e) => {
                    warn!(
                        %category,
                        source = %source.source_name(),
                        title = %candidate.title,
                        link = %candidate.link,
                        error = %e,
                        "Candidate abandoned"
                    );
                }
            }
        }

        info!(%category, source = %source.source_name(), checked = candidates.len(), "No new post from source");
        Attempt::Failed
    }

    async fn process_candidate(&self, category: Category, candidate: &Candidate) -> Result<SavedPost> {
        if !self.gate.is_new(&candidate.link).await? {
            return Err(AgentError::Duplicate {
                source_url: candidate.link.clone(),
            });
        }

        let content = self.content_for(candidate).await?;
        let author = self.enricher.author(candidate.author.as_deref());

        let article = self
            .generator
            .generate(&GenerationRequest {
                title: candidate.title.clone(),
                content,
                category,
                author: author.clone(),
            })
            .await?;

        let (views_count, likes_count) = self.enricher.counters(self.mode);
        let post = NewPost {
            title: article.title,
            slug: article.slug,
            content: article.content,
            source_url: candidate.link.clone(),
            category,
            author,
            image_url: self.enricher.image(category, candidate.image.as_ref()),
            is_published: self.mode.is_published(),
            views_count,
            likes_count,
            ad_image: None,
            ad_link: None,
        };

        self.gate.save(&post).await?;
        Ok(SavedPost {
            category,
            origin: candidate.origin,
            title: post.title,
            source_url: post.source_url,
        })
    }

    /// Prose handed to the generator. Drafts prefer the full page text and fall
    /// back to the source summary.
    async fn content_for(&self, candidate: &Candidate) -> Result<String> {
        let summary = candidate.summary.as_deref();
        match (self.mode, &self.extractor) {
            (PipelineMode::Draft, Some(extractor)) => {
                let extracted = extractor
                    .fetcher
                    .fetch_extracted_text(&extractor.prefix, &candidate.link)
                    .await;
                if let Err(e) = &extracted {
                    warn!(link = %candidate.link, error = %e, "Extraction failed, using summary");
                }
                draft_content(extracted, summary)
            }
            _ => normalize_content(summary.unwrap_or_default()),
        }
    }
}

/// Cleaned page text cut to [`DRAFT_CONTENT_CHARS`], or the cleaned summary
/// when extraction failed or left too little prose.
fn draft_content(extracted: Result<String>, summary: Option<&str>) -> Result<String> {
    match extracted.and_then(|text| normalize_content(&text)) {
        Ok(text) => Ok(truncate_chars(&text, DRAFT_CONTENT_CHARS).to_string()),
        Err(e) => {
            debug!(reason = %e, "Page text unusable");
            normalize_content(summary.unwrap_or_default())
        }
    }
}
