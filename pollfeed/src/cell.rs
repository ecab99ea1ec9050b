//! Render-ready projections of posts.
//!
//! Cells are rebuilt wholesale from the post collection after every change
//! and never patched in place.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{Asset, Post, PostOption, User, VoteRecord};

/// Shown when a post has no author.
pub const UNKNOWN_USERNAME: &str = "-";

/// Derived, read-only view of one post.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellViewModel {
    /// Mirrors the post ID so renderers can diff cells across rebuilds.
    pub id: String,
    pub title: String,
    pub username: String,
    pub avatar: Option<Asset>,
    pub date: DateTime<Utc>,
    pub last_voted_date: Option<DateTime<Utc>>,
    pub total_vote_count: u64,
    pub options: Vec<PostOption>,
    pub is_voted: bool,
    pub current_user: Option<User>,
    pub voted_users: Vec<VoteRecord>,
}

impl CellViewModel {
    pub fn from_post(post: &Post, current_user: Option<&User>) -> Self {
        Self {
            id: post.id.clone(),
            title: post.content.clone(),
            username: post
                .user
                .as_ref()
                .map_or_else(|| UNKNOWN_USERNAME.to_string(), |u| u.username.clone()),
            avatar: post.user.as_ref().and_then(|u| u.avatar.clone()),
            date: post.created_at,
            last_voted_date: post.last_vote_at,
            total_vote_count: post.total_votes(),
            options: post.options.clone(),
            // Scans every record on the post; fine for a bundled dataset.
            is_voted: post.voted_bys.iter().any(|v| v.applies_to(post)),
            current_user: current_user.cloned(),
            voted_users: post.voted_bys.clone(),
        }
    }

    /// Share of the total for `option_id`, rounded to whole percent.
    ///
    /// Returns `None` for an unknown option and 0 while nobody has voted.
    pub fn option_percentage(&self, option_id: &str) -> Option<u8> {
        let option = self.options.iter().find(|o| o.id == option_id)?;
        if self.total_vote_count == 0 {
            return Some(0);
        }
        let pct = (u64::from(option.voted) * 100 + self.total_vote_count / 2) / self.total_vote_count;
        Some(pct.min(100) as u8)
    }

    pub fn vote_count_label(&self) -> String {
        match self.total_vote_count {
            1 => "1 vote".to_string(),
            n => format!("{} votes", n),
        }
    }

    /// Relative age of the last vote, e.g. "5 minutes ago".
    pub fn last_voted_label(&self, now: DateTime<Utc>) -> Option<String> {
        self.last_voted_date.map(|at| relative_time(at, now))
    }
}

/// Map every post to a cell, preserving order.
pub fn derive_cells(posts: &[Post], current_user: Option<&User>) -> Vec<CellViewModel> {
    posts
        .iter()
        .map(|post| CellViewModel::from_post(post, current_user))
        .collect()
}

/// Header text for the list, e.g. "3 Active Polls".
pub fn active_polls_label(count: usize) -> String {
    match count {
        1 => "1 Active Poll".to_string(),
        n => format!("{} Active Polls", n),
    }
}

fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {} ago", unit)
        } else {
            format!("{} {}s ago", n, unit)
        }
    };

    if elapsed.num_minutes() < 1 {
        "just now".to_string()
    } else if elapsed.num_hours() < 1 {
        plural(elapsed.num_minutes(), "minute")
    } else if elapsed.num_days() < 1 {
        plural(elapsed.num_hours(), "hour")
    } else {
        plural(elapsed.num_days(), "day")
    }
}
