//! Ranked, stop-on-first-success attempts.
//!
//! Both the source strategies for a category and the model backends for a
//! generation request are ordered lists tried front to back. This module is
//! the one place that walks such a list.

use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Outcome of trying one ranked entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    Succeeded(T),
    /// Move on to the next entry immediately.
    Failed,
    /// Move on to the next entry after the cascade's cool-down.
    Throttled,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Cascade {
    cooldown: Duration,
}

impl Cascade {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    /// A cascade that never pauses between entries.
    pub fn immediate() -> Self {
        Self::default()
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Try each entry of `ranked` in order and return the first success.
    /// Later entries are never touched once one succeeds. The cool-down is
    /// only slept when a throttled entry is followed by another entry.
    pub async fn run<I, T, F, Fut>(&self, ranked: I, mut attempt: F) -> Option<T>
    where
        I: IntoIterator,
        F: FnMut(I::Item) -> Fut,
        Fut: Future<Output = Attempt<T>>,
    {
        let mut ranked = ranked.into_iter().peekable();
        let mut position = 0usize;

        while let Some(entry) = ranked.next() {
            position += 1;
            match attempt(entry).await {
                Attempt::Succeeded(value) => return Some(value),
                Attempt::Failed => {
                    debug!(position, "Attempt failed, advancing");
                }
                Attempt::Throttled => {
                    if ranked.peek().is_some() && !self.cooldown.is_zero() {
                        debug!(position, cooldown = ?self.cooldown, "Attempt throttled, cooling down");
                        tokio::time::sleep(self.cooldown).await;
                    }
                }
            }
        }

        None
    }
}
