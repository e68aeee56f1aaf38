//! A small file-backed store that keeps its whole collection in memory and
//! rewrites the backing file with [bincode](https://docs.rs/bincode) on every change.
//!
//! Three flavours of store share the same load / mutate / rewrite cycle:
//!
//! * [`ListStore<T>`]: an ordered list of `T`.
//! * [`MapStore<K, V>`]: a map from `K` to `V`.
//! * [`AnyStore`]: a map from `String` to values of any [registered](Registry) type.
//!
//! There is no write-ahead log and no locking. The last full write wins.

pub mod any;
pub mod builder;
pub mod error;
pub mod list;
pub mod map;
mod persist;
pub mod registry;

pub use any::AnyStore;
pub use builder::StoreBuilder;
pub use error::{
    AddError, AddErrorKind, OpenError, OpenErrorKind, RegistryError, SyncError, SyncErrorKind,
};
pub use list::ListStore;
pub use map::MapStore;
pub use registry::{Registry, StoredValue, Value};
