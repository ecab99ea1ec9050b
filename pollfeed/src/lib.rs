pub mod cell;
pub mod config;
pub mod model;
pub mod provider;
pub mod store;

pub use cell::CellViewModel;
pub use config::StoreConfig;
pub use model::{Asset, Post, PostOption, User, VoteRecord};
pub use provider::{AssetCatalog, FileProvider, PostProvider, ProviderError, StaticProvider};
pub use store::{DisplayState, Event, PostRef, PostStore, StoreError, Subscription, VoteOutcome};
