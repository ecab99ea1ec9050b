//! PostStore implementation - owns the posts, derives cells, applies votes.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cell::{CellViewModel, active_polls_label, derive_cells};
use crate::config::StoreConfig;
use crate::model::{Post, PostOption, User, VoteRecord};
use crate::provider::{self, PostProvider};

use super::error::{Result, StoreError};
use super::event::{Event, Subscription};
use super::state::DisplayState;

/// Which post a vote targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostRef {
    /// Position in the list, as a renderer sees it.
    Index(usize),
    Id(String),
}

impl From<usize> for PostRef {
    fn from(index: usize) -> Self {
        PostRef::Index(index)
    }
}

impl From<&str> for PostRef {
    fn from(id: &str) -> Self {
        PostRef::Id(id.to_string())
    }
}

impl From<String> for PostRef {
    fn from(id: String) -> Self {
        PostRef::Id(id)
    }
}

impl From<&Post> for PostRef {
    fn from(post: &Post) -> Self {
        PostRef::Id(post.id.clone())
    }
}

/// What a call to [`PostStore::vote`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The vote was counted and this record appended.
    Applied(VoteRecord),
    /// No post matched the target. Nothing changed.
    TargetNotFound,
    /// The post has no option with that ID. Nothing changed.
    OptionNotFound,
}

impl VoteOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, VoteOutcome::Applied(_))
    }

    pub fn record(&self) -> Option<&VoteRecord> {
        match self {
            VoteOutcome::Applied(record) => Some(record),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    posts: Vec<Post>,
    cells: Arc<Vec<CellViewModel>>,
    current_user: Option<User>,
    display: DisplayState,
}

struct Inner<P> {
    provider: P,
    config: StoreConfig,
    state: Mutex<StoreState>,
    events: broadcast::Sender<Event>,
}

/// View model for the post list.
///
/// Cloning is cheap and yields another handle to the same store. Every
/// mutation happens under one lock and publishes its events before the lock
/// is released, so subscribers never observe posts and cells out of sync.
/// Loads are not deduplicated: callers keep at most one in flight.
pub struct PostStore<P> {
    inner: Arc<Inner<P>>,
}

impl<P> Clone for PostStore<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: PostProvider + 'static> PostStore<P> {
    /// Create a store in the `loading` state. Nothing is fetched until
    /// [`load`](Self::load) or [`start`](Self::start) is called.
    pub fn new(provider: P, config: StoreConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let inner = Arc::new(Inner {
            provider,
            config,
            state: Mutex::new(StoreState::default()),
            events,
        });

        inner.transition(&mut inner.lock(), DisplayState::Loading);
        Self { inner }
    }

    /// Spawn the initial load on the current runtime.
    pub fn start(&self) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let _ = store.load().await;
        })
    }

    /// Fetch all posts and replace the collection.
    ///
    /// On success the first post's author becomes the current user and the
    /// cells are rebuilt immediately; the display state follows after the
    /// settling delay. On failure the posts are left untouched and the state
    /// settles on `empty`. Returns the number of posts loaded.
    pub async fn load(&self) -> provider::Result<usize> {
        self.fetch(DisplayState::Loading).await
    }

    /// User-initiated reload. Shows `refreshing` until the fetch settles.
    pub async fn refresh(&self) -> provider::Result<usize> {
        self.fetch(DisplayState::Refreshing).await
    }

    /// Enter `loading_next_page`. Pagination is not implemented, so the
    /// store stays there until the next load or refresh.
    pub fn load_next_page(&self) {
        let inner = &self.inner;
        inner.transition(&mut inner.lock(), DisplayState::LoadingNextPage);
        debug!("Next page requested, pagination is not supported");
    }

    async fn fetch(&self, pending: DisplayState) -> provider::Result<usize> {
        let inner = &self.inner;
        inner.transition(&mut inner.lock(), pending);

        match inner.provider.fetch_all().await {
            Ok(posts) => {
                let count = posts.len();
                {
                    let mut state = inner.lock();
                    state.current_user = posts.first().and_then(|p| p.user.clone());
                    state.posts = posts;
                    inner.publish(Event::CurrentUserChanged(state.current_user.clone()));
                    inner.rebuild_cells(&mut state);
                }
                info!("Loaded {} posts", count);
                self.settle(false);
                Ok(count)
            }
            Err(e) => {
                warn!("Failed to load posts: {}", e);
                self.settle(true);
                Err(e)
            }
        }
    }

    /// Schedule the post-load state transition.
    ///
    /// The target is computed when the delay expires, from the cells present
    /// at that moment. Pending transitions are never cancelled.
    fn settle(&self, failed: bool) {
        let delay = self.inner.config.settle_delay;
        if delay.is_zero() {
            self.inner.settle_now(failed);
            return;
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.settle_now(failed);
        });
    }

    /// Cast a vote by the current user for `option` on the `target` post.
    ///
    /// An unknown target or option is a no-op. Voting before a current user
    /// exists is rejected with [`StoreError::NoCurrentUser`]. The display
    /// state is left alone.
    pub fn vote(&self, option: &PostOption, target: impl Into<PostRef>) -> Result<VoteOutcome> {
        let target = target.into();
        let inner = &self.inner;
        let mut state = inner.lock();

        let Some(index) = resolve(&state.posts, &target) else {
            debug!("Vote target {:?} not found", target);
            return Ok(VoteOutcome::TargetNotFound);
        };
        if state.posts[index].option(&option.id).is_none() {
            debug!(
                "Option {} not found on post {}",
                option.id, state.posts[index].id
            );
            return Ok(VoteOutcome::OptionNotFound);
        }
        let user = state.current_user.clone().ok_or(StoreError::NoCurrentUser)?;

        let Some(record) = state.posts[index].apply_vote(&option.id, user, Utc::now()) else {
            return Ok(VoteOutcome::OptionNotFound);
        };
        info!(
            "User {} voted {} on post {}",
            record.user.id, option.id, state.posts[index].id
        );

        inner.rebuild_cells(&mut state);
        Ok(VoteOutcome::Applied(record))
    }

    /// Replace the voter identity. Cells are rebuilt since they carry it.
    pub fn set_current_user(&self, user: Option<User>) {
        let inner = &self.inner;
        let mut state = inner.lock();
        state.current_user = user;
        inner.publish(Event::CurrentUserChanged(state.current_user.clone()));
        inner.rebuild_cells(&mut state);
    }
}

impl<P> PostStore<P> {
    /// Subscribe to future changes. Current values are available through the
    /// getters.
    pub fn subscribe(&self) -> Subscription {
        Subscription::new(self.inner.events.subscribe())
    }

    pub fn state(&self) -> DisplayState {
        self.inner.lock().display
    }

    pub fn cells(&self) -> Arc<Vec<CellViewModel>> {
        Arc::clone(&self.inner.lock().cells)
    }

    pub fn current_user(&self) -> Option<User> {
        self.inner.lock().current_user.clone()
    }

    /// Snapshot of the authoritative post collection.
    pub fn posts(&self) -> Vec<Post> {
        self.inner.lock().posts.clone()
    }

    pub fn page_title(&self) -> &str {
        &self.inner.config.page_title
    }

    /// List header text, e.g. "7 Active Polls".
    pub fn header_label(&self) -> String {
        active_polls_label(self.inner.lock().cells.len())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn provider(&self) -> &P {
        &self.inner.provider
    }
}

impl<P> Inner<P> {
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn publish(&self, event: Event) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Move to `new`, publishing only if the state actually changes.
    fn transition(&self, state: &mut StoreState, new: DisplayState) -> bool {
        if state.display == new {
            return false;
        }
        let old = std::mem::replace(&mut state.display, new);
        debug!("Display state {} -> {}", old, new);
        self.publish(Event::StateChanged { old, new });
        true
    }

    fn rebuild_cells(&self, state: &mut StoreState) {
        state.cells = Arc::new(derive_cells(&state.posts, state.current_user.as_ref()));
        self.publish(Event::CellsChanged(Arc::clone(&state.cells)));
    }

    fn settle_now(&self, failed: bool) {
        let mut state = self.lock();
        let target = if failed {
            DisplayState::Empty
        } else {
            DisplayState::settled(state.cells.len())
        };
        self.transition(&mut state, target);
    }
}

fn resolve(posts: &[Post], target: &PostRef) -> Option<usize> {
    match target {
        PostRef::Index(i) => (*i < posts.len()).then_some(*i),
        PostRef::Id(id) => posts.iter().position(|p| &p.id == id),
    }
}
