//! In-memory provider, mostly for tests and demos.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::model::Post;

use super::error::{ProviderError, Result};
use super::traits::PostProvider;

/// Serves a fixed post list, or fails on demand.
#[derive(Debug, Default)]
pub struct StaticProvider {
    posts: Mutex<Vec<Post>>,
    failure: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl StaticProvider {
    pub fn new(posts: Vec<Post>) -> Self {
        Self {
            posts: Mutex::new(posts),
            ..Default::default()
        }
    }

    /// A provider whose every fetch fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Mutex::new(Some(reason.into())),
            ..Default::default()
        }
    }

    /// Replace the posts served by subsequent fetches.
    pub fn set_posts(&self, posts: Vec<Post>) {
        *self.posts.lock().unwrap_or_else(|p| p.into_inner()) = posts;
    }

    /// Make subsequent fetches fail (`Some`) or succeed (`None`).
    pub fn set_failure(&self, reason: Option<String>) {
        *self.failure.lock().unwrap_or_else(|p| p.into_inner()) = reason;
    }

    /// Number of `fetch_all` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PostProvider for StaticProvider {
    async fn fetch_all(&self) -> Result<Vec<Post>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(reason) = self
            .failure
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
        {
            return Err(ProviderError::Unavailable(reason));
        }
        Ok(self.posts.lock().unwrap_or_else(|p| p.into_inner()).clone())
    }
}
