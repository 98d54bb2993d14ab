use crate::traits::PostStore;
use crate::types::{AgentError, Result};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::info;

/// Deletes posts whose age exceeds the retention window.
pub struct RetentionSweeper {
    store: Arc<dyn PostStore>,
    window: Duration,
}

impl RetentionSweeper {
    pub fn new(store: Arc<dyn PostStore>, window: Duration) -> Self {
        Self { store, window }
    }

    pub fn with_days(store: Arc<dyn PostStore>, days: i64) -> Result<Self> {
        let window = Duration::try_days(days).ok_or_else(|| AgentError::InvalidConfig {
            name: "RETENTION_DAYS",
            reason: format!("{} days is out of range", days),
        })?;
        Ok(Self::new(store, window))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub async fn sweep(&self) -> Result<u64> {
        self.sweep_at(Utc::now()).await
    }

    /// Remove every post created strictly before `now - window`. A post exactly
    /// at the cutoff survives.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<u64> {
        let cutoff = now
            .checked_sub_signed(self.window)
            .ok_or_else(|| AgentError::InvalidConfig {
                name: "RETENTION_DAYS",
                reason: format!("a {} day window reaches before the earliest timestamp", self.window.num_days()),
            })?;
        let deleted = self.store.delete_created_before(cutoff).await?;
        info!(
            store = %self.store.store_name(),
            %cutoff,
            deleted,
            "Retention sweep finished"
        );
        Ok(deleted)
    }
}
