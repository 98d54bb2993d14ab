use crate::traits::PostStore;
use crate::types::{AgentError, NewPost, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_INSERT_COOLDOWN: Duration = Duration::from_secs(15);

/// The pipeline's only path to the post store: existence checks before
/// generation, and guarded inserts after it.
///
/// Check-then-insert is not atomic. Two overlapping runs can both pass
/// [`PersistenceGate::is_new`] for the same link; only a unique index in the
/// store closes that window.
pub struct PersistenceGate {
    store: Arc<dyn PostStore>,
    insert_cooldown: Duration,
}

impl PersistenceGate {
    pub fn new(store: Arc<dyn PostStore>, insert_cooldown: Duration) -> Self {
        Self {
            store,
            insert_cooldown,
        }
    }

    pub fn store(&self) -> &Arc<dyn PostStore> {
        &self.store
    }

    pub async fn is_new(&self, source_url: &str) -> Result<bool> {
        let exists = self.store.exists(source_url).await?;
        debug!(source_url, exists, "Deduplication check");
        Ok(!exists)
    }

    /// Insert `post` unless a row with its `source_url` appeared meanwhile.
    /// A successful insert is followed by the configured cool-down.
    pub async fn save(&self, post: &NewPost) -> Result<()> {
        if !self.is_new(&post.source_url).await? {
            return Err(AgentError::Duplicate {
                source_url: post.source_url.clone(),
            });
        }

        self.store.insert(post).await?;
        info!(
            store = %self.store.store_name(),
            source_url = %post.source_url,
            category = %post.category,
            published = post.is_published,
            "Post saved"
        );

        if !self.insert_cooldown.is_zero() {
            debug!(cooldown = ?self.insert_cooldown, "Insert cool-down");
            tokio::time::sleep(self.insert_cooldown).await;
        }
        Ok(())
    }
}
