use async_trait::async_trait;

use crate::model::Post;

use super::error::Result;

/// Source of the full post collection.
///
/// Single-shot: one call yields every post or an error. There is no retry or
/// backoff at this layer.
#[async_trait]
pub trait PostProvider: Send + Sync {
    /// Fetch all posts.
    async fn fetch_all(&self) -> Result<Vec<Post>>;
}

#[async_trait]
impl<T: PostProvider + ?Sized> PostProvider for std::sync::Arc<T> {
    async fn fetch_all(&self) -> Result<Vec<Post>> {
        (**self).fetch_all().await
    }
}
