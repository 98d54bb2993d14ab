use crate::types::{AgentError, FetchConfig, Result};
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// HTTP access shared by the feed source, the news APIs and the text extractor.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// GET `url` and return the body. Network errors and 5xx responses are
    /// retried with exponential backoff; any other non-success status fails at once.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let start_time = Instant::now();
        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: Duration::from_secs(self.config.retry_delay_seconds),
            initial_interval: Duration::from_secs(self.config.retry_delay_seconds),
            max_interval: Duration::from_secs(self.config.retry_delay_seconds * 8),
            multiplier: 2.0,
            max_elapsed_time: Some(Duration::from_secs(self.config.timeout_seconds * 2)),
            ..Default::default()
        };

        let mut attempt = 0;
        loop {
            let failure = match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = response.text().await.map_err(|e| AgentError::Http(e.without_url()))?;
                        debug!(
                            url = %redact(url),
                            bytes = body.len(),
                            elapsed_ms = start_time.elapsed().as_millis() as u64,
                            "Fetched"
                        );
                        return Ok(body);
                    }
                    if !status.is_server_error() {
                        return Err(status_error(status));
                    }
                    status_error(status)
                }
                Err(e) => AgentError::Http(e.without_url()),
            };

            if attempt >= self.config.max_retries {
                return Err(failure);
            }
            attempt += 1;

            match backoff.next_backoff() {
                Some(delay) => {
                    warn!(
                        url = %redact(url),
                        attempt,
                        ?delay,
                        error = %failure,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => return Err(failure),
            }
        }
    }

    /// Plain-text rendering of the page at `target`, produced by an extraction
    /// service addressed as `<prefix><target>`.
    pub async fn fetch_extracted_text(&self, extractor_prefix: &str, target: &str) -> Result<String> {
        let url = format!("{}{}", extractor_prefix, target);
        self.fetch_text(&url).await
    }
}

fn status_error(status: StatusCode) -> AgentError {
    AgentError::General(format!(
        "HTTP {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    ))
}

/// Strip query strings before logging: API keys travel as query parameters.
pub(crate) fn redact(url: &str) -> &str {
    url.split_once('?').map(|(base, _)| base).unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_drops_query_string() {
        assert_eq!(
            redact("https://gnews.io/api/v4/top-headlines?apikey=secret&lang=en"),
            "https://gnews.io/api/v4/top-headlines"
        );
        assert_eq!(redact("https://example.com/feed.xml"), "https://example.com/feed.xml");
    }

    #[test]
    fn fetcher_builds_with_default_config() {
        assert!(Fetcher::new(FetchConfig::default()).is_ok());
    }
}
