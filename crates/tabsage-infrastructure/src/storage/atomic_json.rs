//! Crash-safe JSON documents on disk.
//!
//! A save writes `.{name}.tmp` next to the target, fsyncs it and renames it
//! into place, so readers see either the old or the new document. `update`
//! serializes writers, across processes too, with an exclusive lock on a
//! sibling `{stem}.lock` file.

use fs2::FileExt;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tabsage_core::TabSageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JsonFileError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} does not hold a valid document: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot encode document for {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot lock {}: {source}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<JsonFileError> for TabSageError {
    fn from(err: JsonFileError) -> Self {
        TabSageError::storage(err.to_string())
    }
}

/// A JSON document of type `T` stored at one path.
pub struct AtomicJsonFile<T> {
    path: PathBuf,
    _document: PhantomData<fn() -> T>,
}

impl<T> AtomicJsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _document: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the document; a missing or blank file is `None`.
    pub fn load(&self) -> Result<Option<T>, JsonFileError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.io_error(&self.path, source)),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| JsonFileError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Replaces the document on disk.
    pub fn save(&self, document: &T) -> Result<(), JsonFileError> {
        let bytes = serde_json::to_vec_pretty(document).map_err(|source| JsonFileError::Encode {
            path: self.path.clone(),
            source,
        })?;

        let tmp_path = self.temp_path();
        write_synced(&tmp_path, &bytes).map_err(|source| self.io_error(&tmp_path, source))?;
        fs::rename(&tmp_path, &self.path).map_err(|source| self.io_error(&self.path, source))
    }

    /// Locked read-modify-write; `default` stands in for a missing file.
    ///
    /// Returns whatever `apply` returns.
    pub fn update<R>(&self, default: T, apply: impl FnOnce(&mut T) -> R) -> Result<R, JsonFileError> {
        let _lock = self.lock()?;

        let mut document = self.load()?.unwrap_or(default);
        let result = apply(&mut document);
        self.save(&document)?;
        Ok(result)
    }

    /// Holds an exclusive lock until the returned handle is dropped.
    fn lock(&self) -> Result<File, JsonFileError> {
        let lock_path = self.path.with_extension("lock");
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).map_err(|source| self.io_error(parent, source))?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|source| self.io_error(&lock_path, source))?;
        file.lock_exclusive().map_err(|source| JsonFileError::Lock {
            path: lock_path,
            source,
        })?;
        Ok(file)
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.path.with_file_name(format!(".{name}.tmp"))
    }

    fn io_error(&self, path: &Path, source: io::Error) -> JsonFileError {
        JsonFileError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
