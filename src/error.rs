use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
#[error("Failed to open store at {}: {kind}", .path.display())]
pub struct OpenError {
    pub kind: OpenErrorKind,
    pub path: PathBuf,
}

#[derive(Error, Debug)]
pub enum OpenErrorKind {
    #[error("io error: {0}")]
    Io(#[source] io::Error),

    #[error("could not decode collection: {0}")]
    Deserialize(#[source] bincode::Error),

    #[error("stored value has unregistered type `{0}`")]
    UnregisteredType(String),

    #[error(transparent)]
    Registry(RegistryError),
}

/// Returned when rewriting the backing file fails. The in-memory collection
/// keeps the mutation that triggered the rewrite.
#[derive(Error, Debug)]
#[error("Failed to sync store to {}: {kind}", .path.display())]
pub struct SyncError {
    pub kind: SyncErrorKind,
    pub path: PathBuf,
}

#[derive(Error, Debug)]
pub enum SyncErrorKind {
    #[error("io error: {0}")]
    Io(#[source] io::Error),

    #[error("could not encode collection: {0}")]
    Serialize(#[source] bincode::Error),

    #[error("value for key `{key}` has unregistered type `{type_name}`")]
    UnregisteredType {
        key: String,
        type_name: &'static str,
    },
}

#[derive(Error, Debug)]
#[error("Failed to add values: {kind}")]
pub struct AddError {
    pub kind: AddErrorKind,
}

#[derive(Error, Debug)]
pub enum AddErrorKind {
    #[error("value for key `{key}` has unregistered type `{type_name}`")]
    UnregisteredType {
        key: String,
        type_name: &'static str,
    },

    #[error(transparent)]
    Sync(SyncError),
}

impl From<SyncError> for AddError {
    fn from(err: SyncError) -> Self {
        AddError {
            kind: AddErrorKind::Sync(err),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum RegistryError {
    #[error("type name `{name}` is already registered to `{existing}`")]
    DuplicateName { name: String, existing: &'static str },

    #[error("type `{type_name}` is already registered as `{existing}`")]
    DuplicateType {
        type_name: &'static str,
        existing: String,
    },
}
