use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use log::debug;
use serde::de::DeserializeOwned;

use crate::{
    builder::StoreBuilder,
    error::{
        AddError, AddErrorKind, OpenError, OpenErrorKind, RegistryError, SyncError,
        SyncErrorKind,
    },
    persist,
    registry::{Registry, StoredValue, Value},
};

/// A map from string keys to values of any registered type, mirrored to a single file.
///
/// Each value is stored together with the name its type was registered under, so a
/// store must register the same types (under the same names) every time it is opened.
/// Common primitive types, `String`, `Vec<u8>` and `Vec<String>` are registered
/// out of the box.
///
/// ```no_run
/// use bindb::AnyStore;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, Debug, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let mut store = AnyStore::builder()
///     .register_as::<Point>("point")
///     .open_any("shapes.bindb".as_ref())?;
///
/// store.insert("origin", Point { x: 0, y: 0 })?;
/// store.insert("label", String::from("home"))?;
///
/// let origin = store.list()["origin"].downcast_ref::<Point>();
/// assert_eq!(origin, Some(&Point { x: 0, y: 0 }));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct AnyStore {
    pub(crate) entries: HashMap<String, Box<dyn Value>>,
    pub(crate) registry: Registry,
    pub(crate) path: PathBuf,
    pub(crate) sync_mode: bool,
}

impl AnyStore {
    pub fn builder() -> StoreBuilder {
        StoreBuilder::default()
    }

    /// Opens the store at `path` knowing only the built-in value types.
    pub fn open(path: &Path) -> Result<AnyStore, OpenError> {
        Self::open_with(path, false, Registry::default())
    }

    pub(crate) fn open_with(
        path: &Path,
        sync_mode: bool,
        registry: Registry,
    ) -> Result<AnyStore, OpenError> {
        let stored: HashMap<String, StoredValue> = persist::load(path)?;

        let mut entries = HashMap::with_capacity(stored.len());
        for (key, stored_value) in stored {
            let value = registry
                .decode(&stored_value)
                .map_err(|err| OpenError {
                    kind: OpenErrorKind::Deserialize(err),
                    path: path.to_path_buf(),
                })?
                .ok_or_else(|| OpenError {
                    kind: OpenErrorKind::UnregisteredType(stored_value.type_name.clone()),
                    path: path.to_path_buf(),
                })?;
            entries.insert(key, value);
        }

        debug!("Opened any store {} with {} entries", path.display(), entries.len());
        Ok(AnyStore {
            entries,
            registry,
            path: path.to_path_buf(),
            sync_mode,
        })
    }

    /// Registers `T` under its Rust type name so values of `T` can be added.
    pub fn register<T>(&mut self) -> Result<(), RegistryError>
    where
        T: Value + DeserializeOwned,
    {
        self.registry.register::<T>()
    }

    pub fn register_as<T>(&mut self, name: &str) -> Result<(), RegistryError>
    where
        T: Value + DeserializeOwned,
    {
        self.registry.register_as::<T>(name)
    }

    pub fn list(&self) -> &HashMap<String, Box<dyn Value>> {
        &self.entries
    }

    /// Merges `entries` into the store and rewrites the file.
    ///
    /// Fails without touching memory or disk if any value's type is not registered.
    pub fn add<I, K>(&mut self, entries: I) -> Result<(), AddError>
    where
        I: IntoIterator<Item = (K, Box<dyn Value>)>,
        K: Into<String>,
    {
        let entries: Vec<(String, Box<dyn Value>)> = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect();

        for (key, value) in &entries {
            if !self.registry.is_registered(&**value) {
                return Err(AddError {
                    kind: AddErrorKind::UnregisteredType {
                        key: key.clone(),
                        type_name: value.type_name(),
                    },
                });
            }
        }

        self.entries.extend(entries);
        self.sync()?;
        Ok(())
    }

    /// Adds a single value. See [`add`](Self::add).
    pub fn insert<K, T>(&mut self, key: K, value: T) -> Result<(), AddError>
    where
        K: Into<String>,
        T: Value,
    {
        let value: Box<dyn Value> = Box::new(value);
        self.add([(key, value)])
    }

    /// Removes `keys` and rewrites the file. Missing keys are ignored.
    pub fn delete(&mut self, keys: &[&str]) -> Result<(), SyncError> {
        for key in keys {
            self.entries.remove(*key);
        }
        self.sync()
    }

    pub fn delete_all(&mut self) -> Result<(), SyncError> {
        debug!("Clearing {} entries from {}", self.entries.len(), self.path.display());
        self.entries.clear();
        self.sync()
    }

    pub fn sync(&self) -> Result<(), SyncError> {
        let mut stored: HashMap<&str, StoredValue> = HashMap::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            let stored_value = self
                .registry
                .encode(&**value)
                .map_err(|err| SyncError {
                    kind: SyncErrorKind::Serialize(err),
                    path: self.path.clone(),
                })?
                .ok_or_else(|| SyncError {
                    kind: SyncErrorKind::UnregisteredType {
                        key: key.clone(),
                        type_name: value.type_name(),
                    },
                    path: self.path.clone(),
                })?;
            stored.insert(key.as_str(), stored_value);
        }

        persist::write(&self.path, &stored, self.sync_mode)?;
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
