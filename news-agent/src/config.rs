use crate::gate::DEFAULT_INSERT_COOLDOWN;
use crate::generator::{DEFAULT_MODELS, DEFAULT_RATE_LIMIT_COOLDOWN};
use crate::types::{AgentError, Category, FetchConfig, PipelineMode, Result};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_RETENTION_DAYS: i64 = 7;
pub const MAX_RETENTION_DAYS: i64 = 36_500;
pub const DEFAULT_TEXT_EXTRACTOR_URL: &str = "https://r.jina.ai/";

/// Where posts live. The REST variant wins when both are configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Rest { url: String, service_key: String },
    Postgres { database_url: String },
}

impl StoreConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = non_empty(&lookup, "SUPABASE_URL");
        let key = non_empty(&lookup, "SUPABASE_SERVICE_KEY");

        match (url, key) {
            (Some(url), Some(service_key)) => Ok(StoreConfig::Rest { url, service_key }),
            (Some(_), None) => Err(AgentError::MissingCredential {
                name: "SUPABASE_SERVICE_KEY",
            }),
            (None, Some(_)) => Err(AgentError::MissingCredential { name: "SUPABASE_URL" }),
            (None, None) => match non_empty(&lookup, "DATABASE_URL") {
                Some(database_url) => Ok(StoreConfig::Postgres { database_url }),
                None => Err(AgentError::MissingCredential { name: "SUPABASE_URL" }),
            },
        }
    }

    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

/// Settings for one pipeline run, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub gemini_api_key: String,
    pub newsdata_api_key: String,
    pub gnews_api_key: String,
    pub store: StoreConfig,
    pub mode: PipelineMode,
    pub models: Vec<String>,
    pub rate_limit_cooldown: Duration,
    pub insert_cooldown: Duration,
    pub retention_days: i64,
    pub seed: Option<u64>,
    pub text_extractor_url: String,
    pub categories: Vec<Category>,
    pub fetch: FetchConfig,
}

impl AgentConfig {
    /// Build from an arbitrary variable lookup. Credentials are checked first,
    /// in a fixed order, so the reported name is stable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = required(&lookup, "GEMINI_API_KEY")?;
        let newsdata_api_key = required(&lookup, "NEWSDATA_API_KEY")?;
        let gnews_api_key = required(&lookup, "GNEWS_API_KEY")?;
        let store = StoreConfig::from_lookup(&lookup)?;

        let mode = match non_empty(&lookup, "AGENT_MODE") {
            Some(raw) => raw.parse()?,
            None => PipelineMode::Published,
        };

        let models = match non_empty(&lookup, "GEMINI_MODELS") {
            Some(raw) => {
                let models = split_list(&raw);
                if models.is_empty() {
                    return Err(AgentError::InvalidConfig {
                        name: "GEMINI_MODELS",
                        reason: "no model identifiers listed".to_string(),
                    });
                }
                models
            }
            None => DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
        };

        let categories = match non_empty(&lookup, "AGENT_CATEGORIES") {
            Some(raw) => {
                let mut categories = Vec::new();
                for name in split_list(&raw) {
                    let category = Category::from_str(&name).map_err(|e| AgentError::InvalidConfig {
                        name: "AGENT_CATEGORIES",
                        reason: e.to_string(),
                    })?;
                    if !categories.contains(&category) {
                        categories.push(category);
                    }
                }
                categories
            }
            None => Category::ALL.to_vec(),
        };

        let rate_limit_cooldown = seconds(&lookup, "RATE_LIMIT_COOLDOWN_SECS")?.unwrap_or(DEFAULT_RATE_LIMIT_COOLDOWN);
        let insert_cooldown = seconds(&lookup, "INSERT_COOLDOWN_SECS")?.unwrap_or(DEFAULT_INSERT_COOLDOWN);

        let retention_days = retention_days(&lookup)?;

        let mut fetch = FetchConfig::default();
        if let Some(timeout) = parsed::<u64, _>(&lookup, "HTTP_TIMEOUT_SECS")? {
            fetch.timeout_seconds = timeout;
        }

        Ok(Self {
            gemini_api_key,
            newsdata_api_key,
            gnews_api_key,
            store,
            mode,
            models,
            rate_limit_cooldown,
            insert_cooldown,
            retention_days,
            seed: parsed(&lookup, "AGENT_SEED")?,
            text_extractor_url: non_empty(&lookup, "TEXT_EXTRACTOR_URL")
                .unwrap_or_else(|| DEFAULT_TEXT_EXTRACTOR_URL.to_string()),
            categories,
            fetch,
        })
    }

    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Cool-down the persistence gate applies after each insert. Drafts are not rate limited.
    pub fn effective_insert_cooldown(&self) -> Duration {
        if self.mode.is_published() {
            self.insert_cooldown
        } else {
            Duration::ZERO
        }
    }
}

/// Settings for the retention job: only the store and the window are needed.
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    pub store: StoreConfig,
    pub retention_days: i64,
}

impl SweeperConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            store: StoreConfig::from_lookup(&lookup)?,
            retention_days: retention_days(&lookup)?,
        })
    }

    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }
}

fn retention_days<F>(lookup: &F) -> Result<i64>
where
    F: Fn(&str) -> Option<String>,
{
    let days = parsed::<i64, _>(lookup, "RETENTION_DAYS")?.unwrap_or(DEFAULT_RETENTION_DAYS);
    if !(0..=MAX_RETENTION_DAYS).contains(&days) {
        return Err(AgentError::InvalidConfig {
            name: "RETENTION_DAYS",
            reason: format!("{} is outside 0..={}", days, MAX_RETENTION_DAYS),
        });
    }
    Ok(days)
}

fn non_empty<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, name).ok_or(AgentError::MissingCredential { name })
}

fn parsed<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, name)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| AgentError::InvalidConfig {
                name,
                reason: format!("'{}': {}", raw, e),
            })
        })
        .transpose()
}

fn seconds<F>(lookup: &F, name: &'static str) -> Result<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(parsed::<u64, _>(lookup, name)?.map(Duration::from_secs))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    const BASE: &[(&str, &str)] = &[
        ("GEMINI_API_KEY", "g"),
        ("NEWSDATA_API_KEY", "n"),
        ("GNEWS_API_KEY", "gn"),
        ("SUPABASE_URL", "https://abc.supabase.co"),
        ("SUPABASE_SERVICE_KEY", "svc"),
    ];

    fn config(extra: &[(&str, &str)]) -> Result<AgentConfig> {
        let vars: Vec<(&str, &str)> = BASE.iter().chain(extra.iter()).copied().collect();
        AgentConfig::from_lookup(lookup(&vars))
    }

    #[test]
    fn defaults_apply_when_only_credentials_are_set() {
        let config = config(&[]).unwrap();
        assert_eq!(config.mode, PipelineMode::Published);
        assert_eq!(config.models, vec!["gemini-2.0-flash", "gemini-2.0-flash-lite", "gemini-1.5-flash"]);
        assert_eq!(config.rate_limit_cooldown, Duration::from_secs(10));
        assert_eq!(config.insert_cooldown, Duration::from_secs(15));
        assert_eq!(config.retention_days, 7);
        assert_eq!(config.categories, Category::ALL.to_vec());
        assert_eq!(config.text_extractor_url, DEFAULT_TEXT_EXTRACTOR_URL);
        assert_eq!(config.seed, None);
        assert_eq!(
            config.store,
            StoreConfig::Rest {
                url: "https://abc.supabase.co".to_string(),
                service_key: "svc".to_string()
            }
        );
    }

    #[test]
    fn missing_credential_is_named() {
        let err = AgentConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "g"), ("GNEWS_API_KEY", "x")])).unwrap_err();
        assert!(matches!(err, AgentError::MissingCredential { name: "NEWSDATA_API_KEY" }));

        let err = AgentConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, AgentError::MissingCredential { name: "GEMINI_API_KEY" }));

        let err = AgentConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "g"),
            ("NEWSDATA_API_KEY", "n"),
            ("GNEWS_API_KEY", "gn"),
            ("SUPABASE_URL", "https://abc.supabase.co"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AgentError::MissingCredential { name: "SUPABASE_SERVICE_KEY" }));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let err = AgentConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "   ")])).unwrap_err();
        assert!(matches!(err, AgentError::MissingCredential { name: "GEMINI_API_KEY" }));
    }

    #[test]
    fn database_url_selects_postgres_store() {
        let store = StoreConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/news")])).unwrap();
        assert_eq!(
            store,
            StoreConfig::Postgres {
                database_url: "postgres://localhost/news".to_string()
            }
        );
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config(&[
            ("AGENT_MODE", "Draft"),
            ("GEMINI_MODELS", "model-a, model-b,,"),
            ("RATE_LIMIT_COOLDOWN_SECS", "3"),
            ("INSERT_COOLDOWN_SECS", "0"),
            ("RETENTION_DAYS", "14"),
            ("AGENT_SEED", "42"),
            ("AGENT_CATEGORIES", "world, sports, WORLD"),
            ("HTTP_TIMEOUT_SECS", "5"),
        ])
        .unwrap();

        assert_eq!(config.mode, PipelineMode::Draft);
        assert_eq!(config.models, vec!["model-a", "model-b"]);
        assert_eq!(config.rate_limit_cooldown, Duration::from_secs(3));
        assert_eq!(config.insert_cooldown, Duration::ZERO);
        assert_eq!(config.retention_days, 14);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.categories, vec![Category::World, Category::Sports]);
        assert_eq!(config.fetch.timeout_seconds, 5);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            config(&[("AGENT_MODE", "sometimes")]).unwrap_err(),
            AgentError::InvalidConfig { name: "AGENT_MODE", .. }
        ));
        assert!(matches!(
            config(&[("RETENTION_DAYS", "a week")]).unwrap_err(),
            AgentError::InvalidConfig { name: "RETENTION_DAYS", .. }
        ));
        assert!(matches!(
            config(&[("AGENT_CATEGORIES", "weather")]).unwrap_err(),
            AgentError::InvalidConfig { name: "AGENT_CATEGORIES", .. }
        ));
        assert!(matches!(
            config(&[("GEMINI_MODELS", " , ")]).unwrap_err(),
            AgentError::InvalidConfig { name: "GEMINI_MODELS", .. }
        ));
    }

    #[test]
    fn sweeper_needs_only_store_settings() {
        let config = SweeperConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/news"),
            ("RETENTION_DAYS", "14"),
        ]))
        .unwrap();
        assert_eq!(config.retention_days, 14);

        assert!(matches!(
            SweeperConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x"), ("RETENTION_DAYS", "-1")])).unwrap_err(),
            AgentError::InvalidConfig { name: "RETENTION_DAYS", .. }
        ));
        assert!(matches!(
            SweeperConfig::from_lookup(lookup(&[
                ("DATABASE_URL", "postgres://x"),
                ("RETENTION_DAYS", "200000000"),
            ]))
            .unwrap_err(),
            AgentError::InvalidConfig { name: "RETENTION_DAYS", .. }
        ));
        assert!(matches!(
            SweeperConfig::from_lookup(lookup(&[])).unwrap_err(),
            AgentError::MissingCredential { name: "SUPABASE_URL" }
        ));
    }

    #[test]
    fn drafts_skip_the_insert_cooldown() {
        assert_eq!(config(&[]).unwrap().effective_insert_cooldown(), Duration::from_secs(15));
        assert_eq!(
            config(&[("AGENT_MODE", "draft")]).unwrap().effective_insert_cooldown(),
            Duration::ZERO
        );
    }
}
