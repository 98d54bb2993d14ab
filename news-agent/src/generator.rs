use crate::cascade::{Attempt, Cascade};
use crate::llm_adapter::LanguageModel;
use crate::types::{AgentError, Category, GeneratedArticle, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_MODELS: &[&str] = &["gemini-2.0-flash", "gemini-2.0-flash-lite", "gemini-1.5-flash"];
pub const DEFAULT_RATE_LIMIT_COOLDOWN: Duration = Duration::from_secs(10);

/// Everything the prompt needs about one candidate.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub title: String,
    pub content: String,
    pub category: Category,
    pub author: String,
}

/// Rewrites normalized news content into a long-form article, trying each
/// model backend in rank order.
pub struct ArticleGenerator {
    model: Arc<dyn LanguageModel>,
    backends: Vec<String>,
    cascade: Cascade,
}

impl ArticleGenerator {
    pub fn new(model: Arc<dyn LanguageModel>, backends: Vec<String>, rate_limit_cooldown: Duration) -> Self {
        Self {
            model,
            backends,
            cascade: Cascade::new(rate_limit_cooldown),
        }
    }

    pub fn backends(&self) -> &[String] {
        &self.backends
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedArticle> {
        let prompt = build_prompt(request);

        self.cascade
            .run(self.backends.iter(), |backend| self.attempt_backend(backend, &prompt, request))
            .await
            .ok_or(AgentError::GenerationExhausted {
                attempted: self.backends.len(),
            })
    }

    async fn attempt_backend(
        &self,
        backend: &str,
        prompt: &str,
        request: &GenerationRequest,
    ) -> Attempt<GeneratedArticle> {
        match self.model.generate_json(backend, prompt).await {
            Ok(raw) => match parse_article(&raw) {
                Ok(article) => {
                    info!(backend, category = %request.category, title = %article.title, "Article generated");
                    Attempt::Succeeded(article)
                }
                Err(e) => {
                    warn!(backend, candidate = %request.title, error = %e, "Backend returned unusable output");
                    Attempt::Failed
                }
            },
            Err(e) if e.is_rate_limited() => {
                warn!(backend, candidate = %request.title, error = %e, "Backend rate limited");
                Attempt::Throttled
            }
            Err(e) => {
                warn!(backend, candidate = %request.title, error = %e, "Backend failed");
                Attempt::Failed
            }
        }
    }
}

/// Strictly decode the model's reply: a single JSON object with exactly
/// `title`, `slug` and `content`, none of them blank.
pub fn parse_article(raw: &str) -> Result<GeneratedArticle> {
    let article: GeneratedArticle = serde_json::from_str(raw.trim())?;
    for (field, value) in [
        ("title", &article.title),
        ("slug", &article.slug),
        ("content", &article.content),
    ] {
        if value.trim().is_empty() {
            return Err(AgentError::Parse(format!("generated article has an empty {}", field)));
        }
    }
    Ok(article)
}

pub fn build_prompt(request: &GenerationRequest) -> String {
    format!(
        r###"You are a professional blogger writing for the {category} section, under the byline "{author}".
Rewrite the news below into an original long-form blog post.

STRUCTURE:
1. A compelling headline.
2. A hook: an introduction of two or three sentences that makes the reader care.
3. Three to four body sections, each starting with a markdown "## " subheading.
4. A concluding takeaway section.

STYLE:
- Conversational but professional tone.
- Between 700 and 1000 words.
- Do not invent quotes or figures that are not in the source.

OUTPUT:
Respond with ONLY a single JSON object and nothing else, with exactly these keys:
{{"title": "<headline>", "slug": "<url-friendly-lowercase-slug>", "content": "<markdown body>"}}

SOURCE HEADLINE:
{title}

SOURCE CONTENT:
{content}
"###,
        category = request.category,
        author = request.author,
        title = request.title,
        content = request.content,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_adapter::{ScriptedModel, ScriptedReply};
    use tokio::time::Instant;

    const GOOD: &str = r#"{"title":"T","slug":"t","content":"C"}"#;

    fn request() -> GenerationRequest {
        GenerationRequest {
            title: "Source headline".into(),
            content: "A".repeat(60),
            category: Category::Technology,
            author: "Jane Doe".into(),
        }
    }

    fn generator(model: Arc<ScriptedModel>, cooldown: Duration) -> ArticleGenerator {
        ArticleGenerator::new(
            model,
            vec!["m1".into(), "m2".into(), "m3".into()],
            cooldown,
        )
    }

    #[test]
    fn prompt_carries_contract() {
        let prompt = build_prompt(&request());
        assert!(prompt.contains("Technology"));
        assert!(prompt.contains("Jane Doe"));
        assert!(prompt.contains(r###"each starting with a markdown "## " subheading"###));
        assert!(prompt.trim_end().ends_with(&"A".repeat(60)));
        assert!(prompt.contains("700 and 1000 words"));
        assert!(prompt.contains(r#""title""#) && prompt.contains(r#""slug""#) && prompt.contains(r#""content""#));
        assert!(prompt.contains(&"A".repeat(60)));
    }

    #[test]
    fn parse_is_strict() {
        assert_eq!(
            parse_article(GOOD).unwrap(),
            GeneratedArticle { title: "T".into(), slug: "t".into(), content: "C".into() }
        );
        assert!(parse_article("```json\n{\"title\":\"T\",\"slug\":\"t\",\"content\":\"C\"}\n```").is_err());
        assert!(parse_article(r#"{"title":"T","slug":"t"}"#).is_err());
        assert!(parse_article(r#"{"title":"T","slug":"t","content":"C","extra":1}"#).is_err());
        assert!(parse_article(r#"{"title":" ","slug":"t","content":"C"}"#).is_err());
    }

    #[tokio::test]
    async fn falls_back_past_non_rate_limit_failure() {
        let model = Arc::new(
            ScriptedModel::new()
                .reply("m1", ScriptedReply::Failure)
                .reply("m2", ScriptedReply::Text(GOOD.into()))
                .reply("m3", ScriptedReply::Text(r#"{"title":"X","slug":"x","content":"X"}"#.into())),
        );
        let article = generator(model.clone(), Duration::ZERO).generate(&request()).await.unwrap();

        assert_eq!(article.title, "T");
        assert_eq!(model.calls(), vec!["m1", "m2"]);
    }

    #[tokio::test]
    async fn malformed_json_counts_as_backend_failure() {
        let model = Arc::new(
            ScriptedModel::new()
                .reply("m1", ScriptedReply::Text("Here is your article!".into()))
                .reply("m2", ScriptedReply::Text(GOOD.into())),
        );
        let article = generator(model.clone(), Duration::ZERO).generate(&request()).await.unwrap();
        assert_eq!(article.slug, "t");
        assert_eq!(model.calls(), vec!["m1", "m2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_waits_before_next_backend() {
        let model = Arc::new(
            ScriptedModel::new()
                .reply("m1", ScriptedReply::RateLimited)
                .reply("m2", ScriptedReply::Text(GOOD.into())),
        );
        let start = Instant::now();
        let article = generator(model.clone(), DEFAULT_RATE_LIMIT_COOLDOWN)
            .generate(&request())
            .await
            .unwrap();

        assert_eq!(article.title, "T");
        assert!(start.elapsed() >= DEFAULT_RATE_LIMIT_COOLDOWN);
        assert_eq!(model.calls(), vec!["m1", "m2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn plain_failure_does_not_wait() {
        let model = Arc::new(
            ScriptedModel::new()
                .reply("m1", ScriptedReply::Failure)
                .reply("m2", ScriptedReply::Text(GOOD.into())),
        );
        let start = Instant::now();
        generator(model, DEFAULT_RATE_LIMIT_COOLDOWN).generate(&request()).await.unwrap();
        assert!(start.elapsed() < DEFAULT_RATE_LIMIT_COOLDOWN);
    }

    #[tokio::test]
    async fn exhausting_backends_is_reported() {
        let model = Arc::new(ScriptedModel::new());
        let err = generator(model.clone(), Duration::ZERO).generate(&request()).await.unwrap_err();
        assert!(matches!(err, AgentError::GenerationExhausted { attempted: 3 }));
        assert_eq!(model.calls(), vec!["m1", "m2", "m3"]);
    }
}
