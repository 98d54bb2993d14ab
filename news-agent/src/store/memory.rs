use crate::traits::PostStore;
use crate::types::{AgentError, NewPost, Post, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local post table for development runs and tests.
/// Like the remote table, it does not enforce `source_url` uniqueness itself.
#[derive(Default)]
pub struct MemoryPostStore {
    posts: RwLock<Vec<Post>>,
    reject_inserts: AtomicBool,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent insert fail, as an unreachable store would.
    pub fn reject_inserts(&self, reject: bool) {
        self.reject_inserts.store(reject, Ordering::SeqCst);
    }

    /// Seed a row with an explicit creation time.
    pub async fn insert_at(&self, post: NewPost, created_at: DateTime<Utc>) -> Uuid {
        let id = Uuid::new_v4();
        self.posts.write().await.push(Post {
            id,
            fields: post,
            created_at,
        });
        id
    }

    pub async fn posts(&self) -> Vec<Post> {
        self.posts.read().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.posts.read().await.len()
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    fn store_name(&self) -> String {
        "memory".to_string()
    }

    async fn exists(&self, source_url: &str) -> Result<bool> {
        Ok(self
            .posts
            .read()
            .await
            .iter()
            .any(|p| p.fields.source_url == source_url))
    }

    async fn insert(&self, post: &NewPost) -> Result<()> {
        if self.reject_inserts.load(Ordering::SeqCst) {
            return Err(AgentError::Store("insert rejected".to_string()));
        }
        self.insert_at(post.clone(), Utc::now()).await;
        Ok(())
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut posts = self.posts.write().await;
        let before = posts.len();
        posts.retain(|p| p.created_at >= cutoff);
        Ok((before - posts.len()) as u64)
    }
}
