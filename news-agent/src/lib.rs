pub mod types;
pub mod cascade;
pub mod config;
pub mod enrichment;
pub mod fetcher;
pub mod gate;
pub mod generator;
pub mod llm_adapter;
pub mod normalizer;
pub mod parser;
pub mod pipeline;
pub mod random;
pub mod sources;
pub mod store;
pub mod sweeper;
pub mod traits;
pub mod utils;

pub use types::*;
pub use cascade::{Attempt, Cascade};
pub use config::{AgentConfig, StoreConfig, SweeperConfig};
pub use enrichment::Enricher;
pub use fetcher::Fetcher;
pub use gate::PersistenceGate;
pub use generator::{ArticleGenerator, GenerationRequest};
pub use llm_adapter::{GeminiClient, LanguageModel, ModelError, ScriptedModel, ScriptedReply};
pub use parser::FeedParser;
pub use pipeline::BlogAgent;
pub use random::RandomSource;
pub use store::{MemoryPostStore, PgPostStore, RestPostStore};
pub use sweeper::RetentionSweeper;
pub use traits::{CandidateSource, PostStore};
