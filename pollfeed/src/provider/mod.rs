//! Post data sources.
//!
//! A [`PostProvider`] hands the store the complete post collection in one
//! shot. The store treats every failure the same way, so providers only need
//! to describe what went wrong for logging.
//!
//! # Architecture
//!
//! ```text
//! posts.json ─→ PostRecord (serde) ─→ AssetCatalog::resolve ─→ Post
//!                                          ↓
//!                                  ProviderError::DataCorrupted
//! ```

mod catalog;
mod error;
mod file;
mod memory;
mod record;
mod traits;

pub use catalog::AssetCatalog;
pub use error::{ProviderError, Result};
pub use file::FileProvider;
pub use memory::StaticProvider;
pub use record::{OptionRecord, PostRecord, UserRecord, VoteRecordDto, decode_posts};
pub use traits::PostProvider;
