//! Domain types for polls, their options and the votes cast on them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

/// A resolved image reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Asset {
    pub name: String,
    pub path: PathBuf,
}

impl Asset {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub avatar: Option<Asset>,
}

impl User {
    pub fn new(id: impl Into<String>, username: impl Into<String>, avatar: Option<Asset>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            avatar,
        }
    }
}

/// One selectable choice within a post.
///
/// Equality and hashing only look at `id`: two snapshots of the same option
/// with different vote counts compare equal.
#[derive(Debug, Clone, Serialize)]
pub struct PostOption {
    pub id: String,
    pub image: Asset,
    pub voted: u32,
}

impl PostOption {
    pub fn new(id: impl Into<String>, image: Asset, voted: u32) -> Self {
        Self {
            id: id.into(),
            image,
            voted,
        }
    }
}

impl PartialEq for PostOption {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for PostOption {}

impl Hash for PostOption {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Attestation that `user` picked `selected_option`.
///
/// `selected_option` is a snapshot taken when the vote was cast, so its
/// `voted` count lags the live option by the vote it records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct VoteRecord {
    pub user: User,
    pub post_id: Option<String>,
    pub selected_option: PostOption,
}

impl VoteRecord {
    pub fn new(user: User, selected_option: PostOption) -> Self {
        Self {
            user,
            post_id: None,
            selected_option,
        }
    }

    /// Attach the record to a post.
    pub fn attached_to(mut self, post_id: impl Into<String>) -> Self {
        self.post_id = Some(post_id.into());
        self
    }

    /// Whether the record counts as a vote on `post`: it must name the post
    /// and select one of its current options.
    pub fn applies_to(&self, post: &Post) -> bool {
        self.post_id.as_deref() == Some(post.id.as_str())
            && post.option(&self.selected_option.id).is_some()
    }
}

/// A poll with its options and the votes cast so far.
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub content: String,
    pub options: Vec<PostOption>,
    pub user: Option<User>,
    pub last_vote_at: Option<DateTime<Utc>>,
    pub voted_bys: Vec<VoteRecord>,
}

impl Post {
    pub fn new(
        id: impl Into<String>,
        created_at: DateTime<Utc>,
        content: impl Into<String>,
        options: Vec<PostOption>,
        user: Option<User>,
    ) -> Self {
        Self {
            id: id.into(),
            created_at,
            content: content.into(),
            options,
            user,
            last_vote_at: None,
            voted_bys: Vec::new(),
        }
    }

    /// Get an option by ID
    pub fn option(&self, id: &str) -> Option<&PostOption> {
        self.options.iter().find(|o| o.id == id)
    }

    pub fn option_ids(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|o| o.id.as_str())
    }

    /// Sum of all option vote counts.
    pub fn total_votes(&self) -> u64 {
        self.options.iter().map(|o| u64::from(o.voted)).sum()
    }

    /// Apply a vote for `option_id` cast by `user` at `at`.
    ///
    /// Returns the appended record, or `None` if the post has no such option.
    /// The record embeds the option as it was before the increment.
    pub(crate) fn apply_vote(
        &mut self,
        option_id: &str,
        user: User,
        at: DateTime<Utc>,
    ) -> Option<VoteRecord> {
        let option = self.options.iter_mut().find(|o| o.id == option_id)?;
        let snapshot = option.clone();
        option.voted = option.voted.saturating_add(1);

        self.last_vote_at = Some(at);
        let record = VoteRecord::new(user, snapshot).attached_to(self.id.clone());
        self.voted_bys.push(record.clone());
        Some(record)
    }
}
