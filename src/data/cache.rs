use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::LoadError;
use super::loader;
use super::model::Dataset;

/// Observable state of a [`DatasetCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    NotLoaded,
    Ready,
    Failed,
}

/// Holds the dataset for the lifetime of the session.
///
/// The file is read at most once: the first `get_or_load*` call stores
/// either the dataset or the load error, and every later call returns the
/// stored outcome. Dropping the cache is the only way to reload.
#[derive(Debug)]
pub struct DatasetCache {
    path: PathBuf,
    slot: Option<Result<Arc<Dataset>, Arc<LoadError>>>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            slot: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> CacheState {
        match &self.slot {
            None => CacheState::NotLoaded,
            Some(Ok(_)) => CacheState::Ready,
            Some(Err(_)) => CacheState::Failed,
        }
    }

    /// The dataset, if a load already succeeded.
    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        self.slot.as_ref().and_then(|r| r.as_ref().ok())
    }

    /// Load from the configured path on first use.
    pub fn get_or_load(&mut self) -> Result<Arc<Dataset>, Arc<LoadError>> {
        self.get_or_load_with(loader::load_file)
    }

    /// Like [`DatasetCache::get_or_load`] with a caller-supplied reader.
    pub fn get_or_load_with<F>(&mut self, load: F) -> Result<Arc<Dataset>, Arc<LoadError>>
    where
        F: FnOnce(&Path) -> Result<Dataset, LoadError>,
    {
        let path = &self.path;
        self.slot
            .get_or_insert_with(|| {
                let outcome = load(path).map(Arc::new).map_err(Arc::new);
                match &outcome {
                    Ok(ds) => log::info!(
                        "Loaded {} records ({} companies, {} years) from {}",
                        ds.len(),
                        ds.stock_codes.len(),
                        ds.years.len(),
                        path.display()
                    ),
                    Err(e) => log::error!("Failed to load {}: {e}", path.display()),
                }
                outcome
            })
            .clone()
    }
}
