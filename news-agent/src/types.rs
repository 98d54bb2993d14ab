pub use interfaces::defs::{
    Candidate, Category, GeneratedArticle, ImageRef, NewPost, Post, SourceKind,
};

/// Whether saved posts go live immediately or land as drafts for review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    /// Long-form pipeline: summary-based content, published with seeded counters.
    Published,
    /// Draft pipeline: full page text via the extraction service, unpublished, zero counters.
    Draft,
}

impl PipelineMode {
    pub fn is_published(&self) -> bool {
        matches!(self, PipelineMode::Published)
    }
}

impl std::str::FromStr for PipelineMode {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "published" | "publish" | "live" => Ok(PipelineMode::Published),
            "draft" | "drafts" => Ok(PipelineMode::Draft),
            other => Err(AgentError::InvalidConfig {
                name: "AGENT_MODE",
                reason: format!("expected 'published' or 'draft', got '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "News-Agent/1.0".to_string(),
            timeout_seconds: 30,
            max_retries: 2,
            retry_delay_seconds: 2,
            max_redirects: 5,
        }
    }
}

/// A post that made it all the way into the store during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedPost {
    pub category: Category,
    pub origin: SourceKind,
    pub title: String,
    pub source_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub saved: Vec<SavedPost>,
    pub skipped_categories: Vec<Category>,
}

impl RunSummary {
    pub fn saved_count(&self) -> usize {
        self.saved.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing required credential: {name}")]
    MissingCredential { name: &'static str },

    #[error("Invalid configuration value for {name}: {reason}")]
    InvalidConfig { name: &'static str, reason: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Source {source_name} returned no usable candidates: {reason}")]
    Source { source_name: String, reason: String },

    #[error("Post store error: {0}")]
    Store(String),

    #[error("Post already exists for {source_url}")]
    Duplicate { source_url: String },

    #[error("Content too short after cleaning ({length} < {minimum} chars)")]
    InsufficientContent { length: usize, minimum: usize },

    #[error("All {attempted} model backends failed")]
    GenerationExhausted { attempted: usize },

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, AgentError>;
