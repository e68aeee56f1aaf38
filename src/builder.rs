use std::{hash::Hash, path::Path};

use serde::{de::DeserializeOwned, Serialize};

use crate::{
    any::AnyStore,
    error::{OpenError, OpenErrorKind, RegistryError},
    list::ListStore,
    map::MapStore,
    registry::{Registry, Value},
};

/// Configures and opens a store.
///
/// ```no_run
/// use bindb::StoreBuilder;
///
/// let mut names = StoreBuilder::default()
///     .set_sync_mode(true)
///     .open_list::<String>("names.bindb".as_ref())?;
/// names.add(["walter".to_string()])?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct StoreBuilder {
    sync_mode: bool,
    registry: Registry,
    registry_error: Option<RegistryError>,
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self {
            sync_mode: false,
            registry: Registry::default(),
            registry_error: None,
        }
    }
}

impl StoreBuilder {
    /// If set, every full rewrite is followed by an fsync of the backing file.
    pub fn set_sync_mode(mut self, sync_mode: bool) -> Self {
        self.sync_mode = sync_mode;
        self
    }

    /// Registers `T` for stores opened with [`open_any`](Self::open_any).
    ///
    /// A conflicting registration is reported when the store is opened.
    pub fn register<T>(mut self) -> Self
    where
        T: Value + DeserializeOwned,
    {
        if let Err(err) = self.registry.register::<T>() {
            if self.registry_error.is_none() {
                self.registry_error = Some(err);
            }
        }
        self
    }

    /// Like [`register`](Self::register), but stores values of `T` under `name`.
    pub fn register_as<T>(mut self, name: &str) -> Self
    where
        T: Value + DeserializeOwned,
    {
        if let Err(err) = self.registry.register_as::<T>(name) {
            if self.registry_error.is_none() {
                self.registry_error = Some(err);
            }
        }
        self
    }

    pub fn open_list<T>(self, path: &Path) -> Result<ListStore<T>, OpenError>
    where
        T: Serialize + DeserializeOwned,
    {
        ListStore::open_with(path, self.sync_mode)
    }

    pub fn open_map<K, V>(self, path: &Path) -> Result<MapStore<K, V>, OpenError>
    where
        K: Eq + Hash + Serialize + DeserializeOwned,
        V: Serialize + DeserializeOwned,
    {
        MapStore::open_with(path, self.sync_mode)
    }

    pub fn open_any(self, path: &Path) -> Result<AnyStore, OpenError> {
        if let Some(err) = self.registry_error {
            return Err(OpenError {
                kind: OpenErrorKind::Registry(err),
                path: path.to_path_buf(),
            });
        }
        AnyStore::open_with(path, self.sync_mode, self.registry)
    }
}
