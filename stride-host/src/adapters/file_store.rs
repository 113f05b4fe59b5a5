//! Directory-backed key-value storage
//!
//! Each key lives in its own file named after the key. Writes go to a
//! temporary sibling first and are renamed into place, so a crash mid-write
//! leaves either the old value or the new one.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use stride_hal::{KeyValueStore, StorageError, StorageKey};

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) the data directory
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `key`
    pub fn path_for(&self, key: StorageKey) -> PathBuf {
        self.dir.join(format!("{}.bin", key.name()))
    }

    fn temp_path_for(&self, key: StorageKey) -> PathBuf {
        self.dir.join(format!(".{}.tmp", key.name()))
    }
}

fn map_io(key: StorageKey, e: io::Error) -> StorageError {
    if e.kind() == io::ErrorKind::NotFound {
        StorageError::NotFound
    } else {
        tracing::warn!(key = key.name(), error = %e, "storage I/O error");
        StorageError::Io
    }
}

impl KeyValueStore for FileStore {
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let data = fs::read(self.path_for(key)).map_err(|e| map_io(key, e))?;
        let dest = buffer
            .get_mut(..data.len())
            .ok_or(StorageError::BufferTooSmall)?;
        dest.copy_from_slice(&data);
        Ok(data.len())
    }

    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
        let temp = self.temp_path_for(key);
        let result = fs::File::create(&temp)
            .and_then(|mut file| {
                file.write_all(data)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&temp, self.path_for(key)));
        if let Err(e) = result {
            let _ = fs::remove_file(&temp);
            return Err(map_io(key, e));
        }
        Ok(())
    }
}
