//! Display state of the post list.

use serde::Serialize;
use std::fmt;

/// What the renderer should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayState {
    #[default]
    Initialized,
    /// Placeholder cells.
    Loading,
    /// Empty-state view. Also covers failed loads.
    Empty,
    Posts,
    /// Pull-to-refresh indicator.
    Refreshing,
    /// Reserved for pagination; nothing leaves this state.
    LoadingNextPage,
}

impl DisplayState {
    /// Final state once a load has produced `cell_count` cells.
    pub fn settled(cell_count: usize) -> Self {
        if cell_count == 0 {
            DisplayState::Empty
        } else {
            DisplayState::Posts
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayState::Initialized => "initialized",
            DisplayState::Loading => "loading",
            DisplayState::Empty => "empty",
            DisplayState::Posts => "posts",
            DisplayState::Refreshing => "refreshing",
            DisplayState::LoadingNextPage => "loading_next_page",
        }
    }
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
