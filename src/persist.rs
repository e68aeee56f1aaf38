use std::{
    fs::{File, OpenOptions},
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use bincode::Options;
use log::trace;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{OpenError, OpenErrorKind, SyncError, SyncErrorKind};

/// Loads the collection stored at `path`, creating an empty file if none exists.
///
/// A zero-length file decodes to `C::default()`. Anything else must hold a complete
/// bincode encoding of `C`; bytes after the first encoded value are ignored.
pub fn load<C>(path: &Path) -> Result<C, OpenError>
where
    C: DeserializeOwned + Default,
{
    let open_err = |err| OpenError {
        kind: OpenErrorKind::Io(err),
        path: path.to_path_buf(),
    };

    // Reading only needs read access. Write access is needed once, to create the file.
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            OpenOptions::new()
                .write(true)
                .create(true)
                .open(path)
                .map_err(open_err)?;
            trace!("Created {}, starting from an empty collection", path.display());
            return Ok(C::default());
        }
        Err(err) => return Err(open_err(err)),
    };

    let file_len = file.metadata().map_err(open_err)?.len();

    if file_len == 0 {
        trace!("{} is empty, starting from an empty collection", path.display());
        return Ok(C::default());
    }

    let collection = decode_options(file_len)
        .deserialize_from(BufReader::new(file))
        .map_err(|err| OpenError {
            kind: OpenErrorKind::Deserialize(err),
            path: path.to_path_buf(),
        })?;

    trace!("Decoded {} bytes from {}", file_len, path.display());
    Ok(collection)
}

/// Options matching `bincode::serialize`, but refusing to decode more than `limit` bytes.
///
/// A corrupt length prefix then fails the decode instead of triggering a huge allocation.
pub(crate) fn decode_options(limit: u64) -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
        .with_limit(limit)
}

/// Replaces the contents of `path` with the encoding of `collection`.
///
/// Returns the number of bytes written. With `sync_mode` set, the file is
/// fsynced before returning.
pub fn write<C>(path: &Path, collection: &C, sync_mode: bool) -> Result<u64, SyncError>
where
    C: Serialize + ?Sized,
{
    let encoded = bincode::serialize(collection).map_err(|err| SyncError {
        kind: SyncErrorKind::Serialize(err),
        path: path.to_path_buf(),
    })?;

    let io_err = |err| SyncError {
        kind: SyncErrorKind::Io(err),
        path: path.to_path_buf(),
    };

    let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
    writer.write_all(&encoded).map_err(io_err)?;
    writer.flush().map_err(io_err)?;
    if sync_mode {
        // Force the write to disk.
        writer.get_ref().sync_all().map_err(io_err)?;
    }

    trace!("Wrote {} bytes to {}", encoded.len(), path.display());
    Ok(encoded.len() as u64)
}
