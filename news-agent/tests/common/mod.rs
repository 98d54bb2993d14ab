#![allow(dead_code)]

use async_trait::async_trait;
use news_agent::{
    AgentError, ArticleGenerator, BlogAgent, Candidate, CandidateSource, Category, Enricher,
    MemoryPostStore, PersistenceGate, PipelineMode, RandomSource, Result, ScriptedModel, SourceKind,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const GOOD_ARTICLE: &str = r#"{"title":"T","slug":"t","content":"C"}"#;

pub fn candidate(link: &str, summary: &str, origin: SourceKind) -> Candidate {
    Candidate {
        title: format!("Headline for {}", link),
        link: link.to_string(),
        image: None,
        author: None,
        summary: Some(summary.to_string()),
        origin,
    }
}

/// Candidate source serving fixed lists per category and recording every fetch.
pub struct StaticSource {
    name: String,
    kind: SourceKind,
    candidates: HashMap<Category, Vec<Candidate>>,
    calls: Arc<Mutex<Vec<Category>>>,
}

impl StaticSource {
    pub fn new(name: &str, kind: SourceKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            candidates: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with(mut self, category: Category, candidates: Vec<Candidate>) -> Self {
        self.candidates.insert(category, candidates);
        self
    }

    /// Shared view of the fetch log that stays valid after the source is boxed.
    pub fn calls(&self) -> Arc<Mutex<Vec<Category>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl CandidateSource for StaticSource {
    fn source_name(&self) -> String {
        self.name.clone()
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch(&self, category: Category) -> Result<Vec<Candidate>> {
        self.calls.lock().unwrap().push(category);
        match self.candidates.get(&category) {
            Some(list) if !list.is_empty() => Ok(list.clone()),
            _ => Err(AgentError::Source {
                source_name: self.name.clone(),
                reason: "no entries".to_string(),
            }),
        }
    }
}

pub struct Harness {
    pub store: Arc<MemoryPostStore>,
    pub model: Arc<ScriptedModel>,
    pub mode: PipelineMode,
    pub rate_limit_cooldown: Duration,
    pub insert_cooldown: Duration,
    pub backends: Vec<String>,
    pub categories: Vec<Category>,
}

impl Harness {
    pub fn new(model: ScriptedModel) -> Self {
        Self {
            store: Arc::new(MemoryPostStore::new()),
            model: Arc::new(model),
            mode: PipelineMode::Published,
            rate_limit_cooldown: Duration::ZERO,
            insert_cooldown: Duration::ZERO,
            backends: vec!["m1".to_string(), "m2".to_string(), "m3".to_string()],
            categories: vec![Category::Technology],
        }
    }

    pub fn agent(&self, sources: Vec<StaticSource>) -> BlogAgent {
        let generator = ArticleGenerator::new(self.model.clone(), self.backends.clone(), self.rate_limit_cooldown);
        let enricher = Enricher::new(Arc::new(RandomSource::seeded(7)));
        let gate = PersistenceGate::new(self.store.clone(), self.insert_cooldown);

        let mut agent = BlogAgent::new(gate, generator, enricher, self.mode).with_categories(self.categories.clone());
        for source in sources {
            agent.add_source(Box::new(source));
        }
        agent
    }
}
