use std::{
    collections::HashMap,
    hash::Hash,
    path::{Path, PathBuf},
};

use log::debug;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    builder::StoreBuilder,
    error::{OpenError, SyncError},
    persist,
};

/// A map from `K` to `V` mirrored to a single file.
#[derive(Debug)]
pub struct MapStore<K, V> {
    pub(crate) entries: HashMap<K, V>,
    pub(crate) path: PathBuf,
    pub(crate) sync_mode: bool,
}

impl<K, V> MapStore<K, V>
where
    K: Eq + Hash + Serialize + DeserializeOwned,
    V: Serialize + DeserializeOwned,
{
    pub fn builder() -> StoreBuilder {
        StoreBuilder::default()
    }

    /// Opens the map stored at `path`, creating an empty one if the file does not exist.
    pub fn open(path: &Path) -> Result<MapStore<K, V>, OpenError> {
        Self::open_with(path, false)
    }

    pub(crate) fn open_with(path: &Path, sync_mode: bool) -> Result<MapStore<K, V>, OpenError> {
        let entries: HashMap<K, V> = persist::load(path)?;
        debug!("Opened map store {} with {} entries", path.display(), entries.len());
        Ok(MapStore {
            entries,
            path: path.to_path_buf(),
            sync_mode,
        })
    }

    pub fn list(&self) -> &HashMap<K, V> {
        &self.entries
    }

    /// Merges `entries` into the map and rewrites the file.
    ///
    /// Existing keys are overwritten. If a key appears more than once in `entries`,
    /// the last occurrence wins.
    pub fn add<I>(&mut self, entries: I) -> Result<(), SyncError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.entries.extend(entries);
        self.sync()
    }

    /// Removes `keys` from the map and rewrites the file. Missing keys are ignored.
    pub fn delete(&mut self, keys: &[K]) -> Result<(), SyncError> {
        for key in keys {
            self.entries.remove(key);
        }
        self.sync()
    }

    pub fn delete_all(&mut self) -> Result<(), SyncError> {
        debug!("Clearing {} entries from {}", self.entries.len(), self.path.display());
        self.entries.clear();
        self.sync()
    }

    pub fn sync(&self) -> Result<(), SyncError> {
        persist::write(&self.path, &self.entries, self.sync_mode)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
