//! Item catalog loading.
//!
//! This module provides:
//! - Loading item definitions from `assets/items.toml` or a directory of
//!   `*.toml` files
//! - Item validation on load
//! - Load statistics
//!
//! A catalog file looks like:
//!
//! ```toml
//! [[items]]
//! id = 1
//! name = "Wood"
//!
//! [[items]]
//! id = 10
//! name = "Workbench"
//! [items.prefab.front]
//! sprite = "workbench"
//! size = [2, 1]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use homestead_common::HomesteadError;
use homestead_gameplay::{CatalogError, Item, ItemCatalog};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default asset path for the item catalog.
pub const DEFAULT_CATALOG_PATH: &str = "assets/items.toml";

/// Errors that can occur during item loading.
#[derive(Debug, Error)]
pub enum ItemLoadError {
    /// File not found.
    #[error("Item catalog not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read file.
    #[error("Failed to read item file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML.
    #[error("Failed to parse item TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Catalog rejected the definitions.
    #[error("Item catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Result type for item loading operations.
pub type ItemLoadResult<T> = Result<T, ItemLoadError>;

impl From<ItemLoadError> for HomesteadError {
    fn from(err: ItemLoadError) -> Self {
        match err {
            ItemLoadError::ReadError(e) => Self::Io(e),
            e => Self::Content(e.to_string()),
        }
    }
}

/// A collection of items from a single file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemFile {
    /// File format version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Items in this file.
    #[serde(default)]
    pub items: Vec<Item>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

/// Statistics for the item loader.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ItemLoaderStats {
    /// Number of files loaded.
    pub files_loaded: u32,
    /// Number of items registered.
    pub items_loaded: u32,
    /// Number of items skipped as invalid or duplicate.
    pub validation_errors: u32,
}

/// Fills in what a hand-written definition may leave out.
fn normalize(mut item: Item) -> Item {
    if item.sprites.front.is_empty() {
        item.sprites.front = item.name.to_lowercase();
    }
    if item.prefab.is_some() {
        item.placeable = true;
    }
    item
}

/// Builds an [`ItemCatalog`] from TOML files.
#[derive(Debug, Default)]
pub struct ItemLoader {
    catalog: ItemCatalog,
    stats: ItemLoaderStats,
}

impl ItemLoader {
    /// Creates a loader with an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a catalog from a file or every `*.toml` file in a directory.
    pub fn load_path(path: impl AsRef<Path>) -> ItemLoadResult<(ItemCatalog, ItemLoaderStats)> {
        let path = path.as_ref();
        let mut loader = Self::new();
        if path.is_dir() {
            loader.load_dir(path)?;
        } else if path.is_file() {
            loader.load_file(path)?;
        } else {
            return Err(ItemLoadError::NotFound(path.to_path_buf()));
        }
        info!(
            "Loaded {} items from {} files ({} skipped)",
            loader.stats.items_loaded, loader.stats.files_loaded, loader.stats.validation_errors
        );
        Ok(loader.finish())
    }

    /// Returns loader statistics.
    #[must_use]
    pub const fn stats(&self) -> &ItemLoaderStats {
        &self.stats
    }

    /// Returns the catalog built so far.
    #[must_use]
    pub const fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    /// Loads every `*.toml` file in a directory, in file name order.
    pub fn load_dir(&mut self, dir: &Path) -> ItemLoadResult<()> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
            .collect();
        paths.sort();

        for path in paths {
            if let Err(e) = self.load_file(&path) {
                warn!("Failed to load item file {:?}: {}", path, e);
                self.stats.validation_errors += 1;
            }
        }
        Ok(())
    }

    /// Loads items from a single file.
    pub fn load_file(&mut self, path: &Path) -> ItemLoadResult<()> {
        debug!("Loading item file: {:?}", path);
        let content = fs::read_to_string(path)?;
        let loaded = self.load_str(&content)?;
        self.stats.files_loaded += 1;
        debug!("Loaded {} items from {:?}", loaded, path);
        Ok(())
    }

    /// Loads items from TOML text, returning how many were registered.
    ///
    /// Invalid and duplicate items are skipped and counted.
    pub fn load_str(&mut self, content: &str) -> ItemLoadResult<u32> {
        let file: ItemFile = toml::from_str(content)?;

        let mut loaded_count = 0;
        for item in file.items {
            let item = normalize(item);
            match self.catalog.register(item) {
                Ok(()) => loaded_count += 1,
                Err(e) => {
                    warn!("Skipping item: {}", e);
                    self.stats.validation_errors += 1;
                },
            }
        }
        self.stats.items_loaded += loaded_count;
        Ok(loaded_count)
    }

    /// Consumes the loader, returning the catalog and statistics.
    #[must_use]
    pub fn finish(self) -> (ItemCatalog, ItemLoaderStats) {
        (self.catalog, self.stats)
    }
}
