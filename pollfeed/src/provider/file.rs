//! Provider backed by a JSON payload on disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::model::Post;

use super::catalog::AssetCatalog;
use super::error::{ProviderError, Result};
use super::record::decode_posts;
use super::traits::PostProvider;

/// Reads `<data_dir>/<source_name>.json` on every fetch.
#[derive(Debug, Clone)]
pub struct FileProvider {
    data_dir: PathBuf,
    source_name: String,
    catalog: AssetCatalog,
}

impl FileProvider {
    pub fn new(
        data_dir: impl Into<PathBuf>,
        source_name: impl Into<String>,
        catalog: AssetCatalog,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            source_name: source_name.into(),
            catalog,
        }
    }

    /// Open a data directory laid out as `<source_name>.json` next to an
    /// `assets.json` manifest.
    pub async fn open(data_dir: impl Into<PathBuf>, source_name: impl Into<String>) -> Result<Self> {
        let data_dir = data_dir.into();
        let catalog = AssetCatalog::load(&data_dir.join("assets.json")).await?;
        Ok(Self::new(data_dir, source_name, catalog))
    }

    /// Path of the payload file.
    pub fn source_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", self.source_name))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }
}

#[async_trait]
impl PostProvider for FileProvider {
    async fn fetch_all(&self) -> Result<Vec<Post>> {
        let path = self.source_path();
        debug!("Reading posts from {}", path.display());

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProviderError::SourceNotFound { path });
            }
            Err(source) => return Err(ProviderError::SourceUnreadable { path, source }),
        };

        let posts = decode_posts(&bytes, &self.catalog)?;
        info!("Fetched {} posts from {}", posts.len(), path.display());
        Ok(posts)
    }
}
