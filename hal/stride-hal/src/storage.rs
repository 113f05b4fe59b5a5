//! Key-value storage abstraction
//!
//! Each logical record the pedometer keeps lives under its own key so it
//! can be read, written, and corrupted independently of the others.

use core::fmt;

/// Keys for persisted records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Latest step record (count + timestamp)
    StepRecord = 0,
    /// Daily reset time as `HH:MM` text
    ResetTime = 1,
    /// Rolling history of archived daily totals
    History = 2,
}

impl StorageKey {
    /// All keys, in storage order
    pub const ALL: [StorageKey; 3] = [
        StorageKey::StepRecord,
        StorageKey::ResetTime,
        StorageKey::History,
    ];

    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Stable name, usable as a file name or map key
    pub fn name(self) -> &'static str {
        match self {
            StorageKey::StepRecord => "step-record",
            StorageKey::ResetTime => "reset-time",
            StorageKey::History => "history",
        }
    }
}

/// Errors from storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Backend I/O failed
    Io,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Data corrupted or invalid
    Corrupted,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            StorageError::Io => "storage I/O failed",
            StorageError::NotFound => "key not found",
            StorageError::BufferTooSmall => "buffer too small",
            StorageError::Corrupted => "stored data corrupted",
        };
        f.write_str(msg)
    }
}

/// Keyed byte storage
///
/// Access is synchronous and expected to complete near-instantly
/// (in-process maps, small files). Implementations should make a write
/// either fully visible or not visible at all.
pub trait KeyValueStore {
    /// Read a value by key into the provided buffer
    ///
    /// # Returns
    /// The number of bytes read, or an error.
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value by key, replacing any previous value
    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError>;

    /// Check if a key exists in storage
    fn exists(&mut self, key: StorageKey) -> bool {
        let mut probe = [0u8; 0];
        !matches!(self.read(key, &mut probe), Err(StorageError::NotFound))
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &mut T {
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError> {
        (**self).read(key, buffer)
    }

    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
        (**self).write(key, data)
    }

    fn exists(&mut self, key: StorageKey) -> bool {
        (**self).exists(key)
    }
}
