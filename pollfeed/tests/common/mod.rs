//! Shared fixtures for pollfeed integration tests.

#![allow(dead_code)]

use chrono::Utc;
use pollfeed::{Asset, Post, PostOption, PostStore, StaticProvider, StoreConfig, User};
use std::path::PathBuf;
use std::sync::Arc;

/// Directory of the dataset bundled with the crate.
pub fn bundled_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

pub fn mock_user() -> User {
    User::new("1", "pollfeed", Some(Asset::new("avatar_6", "images/avatar_6.png")))
}

pub fn mock_option(voted: u32) -> PostOption {
    PostOption::new(
        uuid::Uuid::new_v4().to_string(),
        Asset::new("post_1_option_1", "images/post_1_option_1.png"),
        voted,
    )
}

/// A two-option post with no votes, authored by [`mock_user`].
pub fn mock_post() -> Post {
    Post::new(
        uuid::Uuid::new_v4().to_string(),
        Utc::now(),
        "Test",
        vec![mock_option(0), mock_option(0)],
        Some(mock_user()),
    )
}

pub fn mock_posts(n: usize) -> Vec<Post> {
    (0..n).map(|_| mock_post()).collect()
}

/// Store over a shared static provider, with no settling delay.
pub fn immediate_store(posts: Vec<Post>) -> (PostStore<Arc<StaticProvider>>, Arc<StaticProvider>) {
    let provider = Arc::new(StaticProvider::new(posts));
    let store = PostStore::new(Arc::clone(&provider), StoreConfig::immediate());
    (store, provider)
}
