//! Post store: the view-model layer between a provider and a renderer.
//!
//! # Architecture
//!
//! ```text
//! PostProvider ──fetch_all()──→ PostStore ──derive──→ Vec<CellViewModel>
//!                                   ↑                        ↓
//!                       vote(option, target)          Event (broadcast)
//!                                   ↑                        ↓
//!                                renderer ←────── Subscription::recv()
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use pollfeed::{PostStore, StoreConfig, StaticProvider, Event};
//!
//! let store = PostStore::new(StaticProvider::new(posts), StoreConfig::default());
//! let mut events = store.subscribe();
//! store.load().await;
//!
//! while let Ok(event) = events.recv().await {
//!     if let Event::StateChanged { new, .. } = event {
//!         println!("state: {new}");
//!     }
//! }
//! ```

mod error;
mod event;
mod post_store;
mod state;

pub use error::{Result, StoreError};
pub use event::{Event, Subscription};
pub use post_store::{PostRef, PostStore, VoteOutcome};
pub use state::DisplayState;
