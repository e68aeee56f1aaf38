use std::path::{Path, PathBuf};

use log::debug;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    builder::StoreBuilder,
    error::{OpenError, SyncError},
    persist,
};

/// An ordered list of `T` mirrored to a single file.
///
/// Every mutation rewrites the whole file. Values keep their insertion order and
/// duplicates are allowed.
#[derive(Debug)]
pub struct ListStore<T> {
    pub(crate) values: Vec<T>,
    pub(crate) path: PathBuf,
    pub(crate) sync_mode: bool,
}

impl<T> ListStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn builder() -> StoreBuilder {
        StoreBuilder::default()
    }

    /// Opens the list stored at `path`, creating an empty one if the file does not exist.
    pub fn open(path: &Path) -> Result<ListStore<T>, OpenError> {
        Self::open_with(path, false)
    }

    pub(crate) fn open_with(path: &Path, sync_mode: bool) -> Result<ListStore<T>, OpenError> {
        let values: Vec<T> = persist::load(path)?;
        debug!("Opened list store {} with {} values", path.display(), values.len());
        Ok(ListStore {
            values,
            path: path.to_path_buf(),
            sync_mode,
        })
    }

    /// Returns every value in the store.
    pub fn list(&self) -> &[T] {
        &self.values
    }

    /// Appends `values` and rewrites the file.
    pub fn add<I>(&mut self, values: I) -> Result<(), SyncError>
    where
        I: IntoIterator<Item = T>,
    {
        self.values.extend(values);
        self.sync()
    }

    /// Removes all values and writes an empty list to the file.
    pub fn delete_all(&mut self) -> Result<(), SyncError> {
        debug!("Clearing {} values from {}", self.values.len(), self.path.display());
        self.values.clear();
        self.sync()
    }

    /// Writes the in-memory list to the file, replacing its previous contents.
    pub fn sync(&self) -> Result<(), SyncError> {
        persist::write(&self.path, &self.values, self.sync_mode)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T> ListStore<T>
where
    T: Serialize + DeserializeOwned + PartialEq,
{
    /// Removes every occurrence of each of `values` and rewrites the file.
    ///
    /// Values that are not in the list are ignored. The file is rewritten either way.
    pub fn delete(&mut self, values: &[T]) -> Result<(), SyncError> {
        self.values.retain(|value| !values.contains(value));
        self.sync()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::ListStore;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn test_open_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store: ListStore<String> = ListStore::open(&temp_dir.path().join("list.bindb")).unwrap();

        assert!(store.is_empty());
        assert_eq!(store.list(), &[] as &[String]);
        assert!(!store.sync_mode);
    }

    #[test]
    fn test_add_keeps_order_and_duplicates() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = ListStore::open(&temp_dir.path().join("list.bindb")).unwrap();

        store.add(names(&["barbara", "victor"])).unwrap();
        store.add(names(&["walter", "victor"])).unwrap();

        assert_eq!(store.list(), names(&["barbara", "victor", "walter", "victor"]));
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_add_rewrites_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("list.bindb");
        let mut store = ListStore::open(&path).unwrap();

        store.add([1u64, 2, 3]).unwrap();

        let on_disk = fs::read(&path).unwrap();
        assert_eq!(on_disk, bincode::serialize(&vec![1u64, 2, 3]).unwrap());
    }

    #[test]
    fn test_delete_removes_every_occurrence() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = ListStore::open(&temp_dir.path().join("list.bindb")).unwrap();
        store.add([1, 2, 3, 2, 4, 1]).unwrap();

        store.delete(&[2, 1]).unwrap();

        assert_eq!(store.list(), &[3, 4]);
    }

    #[test]
    fn test_delete_missing_value() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = ListStore::open(&temp_dir.path().join("list.bindb")).unwrap();
        store.add(names(&["walter"])).unwrap();

        store.delete(&names(&["nobody"])).unwrap();

        assert_eq!(store.list(), names(&["walter"]));
    }

    #[test]
    fn test_delete_all_writes_empty_list() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("list.bindb");
        let mut store = ListStore::open(&path).unwrap();
        store.add(names(&["barbara", "victor"])).unwrap();

        store.delete_all().unwrap();

        assert!(store.is_empty());
        // An encoded empty list is just its length prefix.
        assert_eq!(fs::read(&path).unwrap(), 0u64.to_le_bytes().to_vec());
    }

    #[test]
    fn test_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("list.bindb");
        let store: ListStore<u8> = ListStore::open(&path).unwrap();
        assert_eq!(store.path(), path.as_path());
    }
}
