use crate::traits::PostStore;
use crate::types::{AgentError, NewPost, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;
use url::Url;

const POSTS_TABLE: &str = "posts";

/// The `posts` table behind a PostgREST endpoint (`<project>/rest/v1/posts`),
/// authenticated with a service key.
pub struct RestPostStore {
    http: Client,
    table_url: Url,
    service_key: String,
}

impl RestPostStore {
    pub fn new(http: Client, project_url: &str, service_key: &str) -> Result<Self> {
        let mut base = Url::parse(project_url.trim())?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let table_url = base.join(&format!("rest/v1/{}", POSTS_TABLE))?;

        Ok(Self {
            http,
            table_url,
            service_key: service_key.to_string(),
        })
    }

    pub fn table_url(&self) -> &Url {
        &self.table_url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
    }

    fn filtered(&self, filters: &[(&str, String)]) -> Url {
        let mut url = self.table_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in filters {
                pairs.append_pair(key, value);
            }
        }
        url
    }
}

async fn ensure_success(operation: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AgentError::Store(format!(
        "{} failed with HTTP {}: {}",
        operation,
        status.as_u16(),
        body.chars().take(300).collect::<String>()
    )))
}

#[async_trait]
impl PostStore for RestPostStore {
    fn store_name(&self) -> String {
        format!("rest:{}", self.table_url.host_str().unwrap_or("unknown"))
    }

    async fn exists(&self, source_url: &str) -> Result<bool> {
        let url = self.filtered(&[
            ("select", "id".to_string()),
            ("source_url", format!("eq.{}", source_url)),
            ("limit", "1".to_string()),
        ]);

        let response = self.authorized(self.http.get(url)).send().await?;
        let rows: Vec<Value> = ensure_success("select", response).await?.json().await?;
        debug!(source_url, found = !rows.is_empty(), "Existence check");
        Ok(!rows.is_empty())
    }

    async fn insert(&self, post: &NewPost) -> Result<()> {
        let request = self
            .http
            .post(self.table_url.clone())
            .header("Prefer", "return=minimal")
            .json(post);

        let response = self.authorized(request).send().await?;
        ensure_success("insert", response).await?;
        Ok(())
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let url = self.filtered(&[
            ("select", "id".to_string()),
            (
                "created_at",
                format!("lt.{}", cutoff.to_rfc3339_opts(SecondsFormat::Micros, true)),
            ),
        ]);

        let request = self
            .http
            .delete(url)
            .header("Prefer", "return=representation");
        let response = self.authorized(request).send().await?;
        let deleted: Vec<Value> = ensure_success("delete", response).await?.json().await?;
        Ok(deleted.len() as u64)
    }
}
