//! Wire format of the bundled post payload.
//!
//! The payload is a JSON list of snake_case records with ISO-8601
//! timestamps. Records reference images by name; converting them into domain
//! values resolves those names against an [`AssetCatalog`].

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::model::{Post, PostOption, User, VoteRecord};

use super::catalog::AssetCatalog;
use super::error::{ProviderError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub image_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionRecord {
    pub id: String,
    pub image_name: String,
    #[serde(default)]
    pub voted: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoteRecordDto {
    pub user: UserRecord,
    #[serde(default)]
    pub post_id: Option<String>,
    pub selected_option: OptionRecord,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub content: String,
    pub options: Vec<OptionRecord>,
    #[serde(default)]
    pub user: Option<UserRecord>,
    #[serde(default)]
    pub last_vote_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub voted_bys: Vec<VoteRecordDto>,
}

impl UserRecord {
    /// Avatars are cosmetic: an unknown name is dropped instead of failing
    /// the whole payload.
    fn into_user(self, catalog: &AssetCatalog) -> User {
        let avatar = self.image_name.and_then(|name| {
            let asset = catalog.resolve(&name).cloned();
            if asset.is_none() {
                warn!("Avatar '{}' for user {} not found, ignoring", name, self.id);
            }
            asset
        });
        User::new(self.id, self.username, avatar)
    }
}

impl OptionRecord {
    fn into_option(self, catalog: &AssetCatalog, field_path: String) -> Result<PostOption> {
        let image = catalog
            .resolve(&self.image_name)
            .cloned()
            .ok_or(ProviderError::DataCorrupted {
                asset: self.image_name,
                field_path,
            })?;
        Ok(PostOption::new(self.id, image, self.voted))
    }
}

impl PostRecord {
    /// Convert into a domain post. `index` is the record's position in the
    /// payload and only feeds error paths.
    pub fn into_post(self, index: usize, catalog: &AssetCatalog) -> Result<Post> {
        let options = self
            .options
            .into_iter()
            .enumerate()
            .map(|(i, option)| {
                option.into_option(catalog, format!("[{index}].options[{i}].image_name"))
            })
            .collect::<Result<Vec<_>>>()?;

        let voted_bys = self
            .voted_bys
            .into_iter()
            .enumerate()
            .map(|(i, vote)| {
                let selected = vote.selected_option.into_option(
                    catalog,
                    format!("[{index}].voted_bys[{i}].selected_option.image_name"),
                )?;
                Ok(VoteRecord {
                    user: vote.user.into_user(catalog),
                    post_id: vote.post_id,
                    selected_option: selected,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Post {
            id: self.id,
            created_at: self.created_at,
            content: self.content,
            options,
            user: self.user.map(|u| u.into_user(catalog)),
            last_vote_at: self.last_vote_at,
            voted_bys,
        })
    }
}

/// Decode a JSON payload into posts, resolving every asset reference.
pub fn decode_posts(bytes: &[u8], catalog: &AssetCatalog) -> Result<Vec<Post>> {
    let records: Vec<PostRecord> = serde_json::from_slice(bytes)?;
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.into_post(index, catalog))
        .collect()
}
