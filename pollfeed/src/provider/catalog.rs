//! Named image assets that post records may reference.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::model::Asset;

use super::error::{ProviderError, Result};

/// Lookup table from asset name to its location.
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    assets: HashMap<String, Asset>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a manifest of the form `{ "name": "relative/path.png" }`.
    ///
    /// Relative paths are resolved against the manifest's directory.
    pub async fn load(manifest: &Path) -> Result<Self> {
        let bytes = match tokio::fs::read(manifest).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProviderError::SourceNotFound {
                    path: manifest.to_path_buf(),
                });
            }
            Err(source) => {
                return Err(ProviderError::SourceUnreadable {
                    path: manifest.to_path_buf(),
                    source,
                });
            }
        };

        let entries: HashMap<String, PathBuf> = serde_json::from_slice(&bytes)?;
        let base = manifest.parent().unwrap_or_else(|| Path::new(""));
        let catalog = entries
            .into_iter()
            .map(|(name, path)| {
                let path = if path.is_absolute() {
                    path
                } else {
                    base.join(path)
                };
                Asset::new(name, path)
            })
            .collect::<Self>();

        debug!(
            "Loaded {} assets from {}",
            catalog.len(),
            manifest.display()
        );
        Ok(catalog)
    }

    /// Register an asset, replacing any previous one with the same name.
    pub fn insert(&mut self, asset: Asset) {
        self.assets.insert(asset.name.clone(), asset);
    }

    pub fn with(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.insert(Asset::new(name, path));
        self
    }

    pub fn resolve(&self, name: &str) -> Option<&Asset> {
        self.assets.get(name)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl FromIterator<Asset> for AssetCatalog {
    fn from_iter<I: IntoIterator<Item = Asset>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for asset in iter {
            catalog.insert(asset);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_manifest_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("assets.json");
        std::fs::write(
            &manifest,
            r#"{ "avatar_1": "images/avatar_1.png", "abs": "/tmp/abs.png" }"#,
        )
        .unwrap();

        let catalog = AssetCatalog::load(&manifest).await.unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.resolve("avatar_1").unwrap().path,
            dir.path().join("images/avatar_1.png")
        );
        assert_eq!(
            catalog.resolve("abs").unwrap().path,
            PathBuf::from("/tmp/abs.png")
        );
        assert!(catalog.resolve("missing").is_none());
    }

    #[tokio::test]
    async fn test_load_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let err = AssetCatalog::load(&dir.path().join("nope.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::SourceNotFound { .. }));
    }

    #[test]
    fn test_insert_replaces_by_name() {
        let catalog = AssetCatalog::new()
            .with("a", "one.png")
            .with("a", "two.png");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.resolve("a").unwrap().path, PathBuf::from("two.png"));
    }
}
