use std::{
    any::{type_name, Any, TypeId},
    collections::{hash_map::Entry, HashMap},
    fmt::Debug,
};

use bincode::Options;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{error::RegistryError, persist::decode_options};

/// A value that can live in an [`AnyStore`](crate::AnyStore).
///
/// Implemented for every serializable `'static` type. To be stored a value's type
/// must also be registered with the store, since decoding needs a concrete type.
pub trait Value: Any + Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn type_name(&self) -> &'static str;

    fn encode(&self) -> bincode::Result<Vec<u8>>;
}

impl<T> Value for T
where
    T: Serialize + Any + Debug + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn encode(&self) -> bincode::Result<Vec<u8>> {
        bincode::serialize(self)
    }
}

impl dyn Value {
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// On-disk form of a single value in an any store.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoredValue {
    pub type_name: String,
    pub payload: Vec<u8>,
}

type DecodeFn = fn(&[u8]) -> bincode::Result<Box<dyn Value>>;

struct Registration {
    rust_type: &'static str,
    decode: DecodeFn,
}

fn decode<T>(payload: &[u8]) -> bincode::Result<Box<dyn Value>>
where
    T: Value + DeserializeOwned,
{
    let value: T = decode_options(payload.len() as u64).deserialize(payload)?;
    Ok(Box::new(value))
}

/// Maps stored type names to decoders, and Rust types to stored type names.
pub struct Registry {
    by_name: HashMap<String, Registration>,
    names: HashMap<TypeId, String>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Registry::empty();
        registry.register_builtins();
        registry
    }
}

impl Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.by_name.keys().collect();
        names.sort_unstable();
        f.debug_struct("Registry").field("names", &names).finish()
    }
}

impl Registry {
    /// A registry that knows no types, not even the built-in ones.
    pub fn empty() -> Self {
        Registry {
            by_name: HashMap::new(),
            names: HashMap::new(),
        }
    }

    /// Registers `T` under its Rust type name.
    pub fn register<T>(&mut self) -> Result<(), RegistryError>
    where
        T: Value + DeserializeOwned,
    {
        self.register_as::<T>(type_name::<T>())
    }

    /// Registers `T` under `name`. Registering the same pair twice is a no-op.
    pub fn register_as<T>(&mut self, name: &str) -> Result<(), RegistryError>
    where
        T: Value + DeserializeOwned,
    {
        let type_id = TypeId::of::<T>();

        if let Some(existing) = self.names.get(&type_id) {
            if existing == name {
                return Ok(());
            }
            return Err(RegistryError::DuplicateType {
                type_name: type_name::<T>(),
                existing: existing.clone(),
            });
        }

        match self.by_name.entry(name.to_string()) {
            Entry::Occupied(entry) => Err(RegistryError::DuplicateName {
                name: name.to_string(),
                existing: entry.get().rust_type,
            }),
            Entry::Vacant(entry) => {
                entry.insert(Registration {
                    rust_type: type_name::<T>(),
                    decode: decode::<T>,
                });
                self.names.insert(type_id, name.to_string());
                Ok(())
            }
        }
    }

    pub fn is_registered(&self, value: &dyn Value) -> bool {
        self.names.contains_key(&value.as_any().type_id())
    }

    /// Returns the stored name of the value's type, if it is registered.
    pub fn name_of(&self, value: &dyn Value) -> Option<&str> {
        self.names
            .get(&value.as_any().type_id())
            .map(String::as_str)
    }

    /// Encodes `value` together with its registered type name.
    ///
    /// Returns `Ok(None)` when the value's type is not registered.
    pub fn encode(&self, value: &dyn Value) -> bincode::Result<Option<StoredValue>> {
        let type_name = match self.name_of(value) {
            Some(name) => name.to_string(),
            None => return Ok(None),
        };
        Ok(Some(StoredValue {
            type_name,
            payload: value.encode()?,
        }))
    }

    /// Decodes a stored value. Returns `Ok(None)` when its type name is unknown.
    pub fn decode(&self, stored: &StoredValue) -> bincode::Result<Option<Box<dyn Value>>> {
        match self.by_name.get(&stored.type_name) {
            Some(registration) => (registration.decode)(&stored.payload).map(Some),
            None => Ok(None),
        }
    }

    fn register_builtins(&mut self) {
        type Register = fn(&mut Registry, &str) -> Result<(), RegistryError>;
        let builtins: [(&str, Register); 15] = [
            ("bool", Registry::register_as::<bool>),
            ("char", Registry::register_as::<char>),
            ("string", Registry::register_as::<String>),
            ("i8", Registry::register_as::<i8>),
            ("i16", Registry::register_as::<i16>),
            ("i32", Registry::register_as::<i32>),
            ("i64", Registry::register_as::<i64>),
            ("u8", Registry::register_as::<u8>),
            ("u16", Registry::register_as::<u16>),
            ("u32", Registry::register_as::<u32>),
            ("u64", Registry::register_as::<u64>),
            ("f32", Registry::register_as::<f32>),
            ("f64", Registry::register_as::<f64>),
            ("bytes", Registry::register_as::<Vec<u8>>),
            ("strings", Registry::register_as::<Vec<String>>),
        ];

        for (name, register) in builtins {
            let result = register(self, name);
            debug_assert!(result.is_ok(), "built-in `{}` failed to register: {:?}", name, result);
        }
    }
}
