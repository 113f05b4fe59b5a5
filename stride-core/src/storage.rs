//! Step store over keyed byte storage
//!
//! Records are postcard-encoded; the reset time is stored as its `HH:MM`
//! text. Every read validates what it finds and substitutes a default on
//! any failure, so a corrupted key never takes the pedometer down.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::str;

use stride_hal::{KeyValueStore, StorageError, StorageKey};

use crate::error::StrideError;
use crate::model::{HistoryEntry, StepRecord, MAX_HISTORY};
use crate::schedule::ResetTime;
use crate::traits::StepStore;

/// Largest encoded record (a full history with long date strings fits)
pub const MAX_RECORD_SIZE: usize = 4096;

/// Encoded step record: u32 and i64 varints need at most 5 + 10 bytes
const STEP_RECORD_SIZE: usize = 16;

/// [`StepStore`] backed by any [`KeyValueStore`]
#[derive(Debug)]
pub struct KvStepStore<K> {
    kv: K,
}

impl<K: KeyValueStore> KvStepStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Access the underlying storage
    pub fn kv(&self) -> &K {
        &self.kv
    }

    pub fn kv_mut(&mut self) -> &mut K {
        &mut self.kv
    }

    pub fn into_inner(self) -> K {
        self.kv
    }

    /// Read a key into `buffer`, returning the filled prefix
    fn read_raw<'b>(
        &mut self,
        key: StorageKey,
        buffer: &'b mut [u8],
    ) -> Result<&'b [u8], StorageError> {
        let len = self.kv.read(key, buffer)?;
        buffer.get(..len).ok_or(StorageError::Corrupted)
    }

    fn write_raw(&mut self, key: StorageKey, bytes: &[u8]) -> Result<(), StrideError> {
        self.kv
            .write(key, bytes)
            .map_err(StrideError::StorageWrite)?;
        tracing::trace!(key = key.name(), len = bytes.len(), "record written");
        Ok(())
    }

    /// Load the step record, distinguishing "never saved" from failure
    ///
    /// `Ok(None)` means nothing is stored. Unreadable, undecodable, or
    /// negative-timestamp records are [`StrideError::StorageRead`].
    pub fn try_load_step_data(&mut self) -> Result<Option<StepRecord>, StrideError> {
        let mut buffer = [0u8; STEP_RECORD_SIZE];
        let bytes = match self.read_raw(StorageKey::StepRecord, &mut buffer) {
            Ok(bytes) => bytes,
            Err(StorageError::NotFound) => return Ok(None),
            Err(e) => return Err(StrideError::StorageRead(e)),
        };
        let record: StepRecord = postcard::from_bytes(bytes)
            .map_err(|_| StrideError::StorageRead(StorageError::Corrupted))?;
        if record.timestamp < 0 {
            return Err(StrideError::StorageRead(StorageError::Corrupted));
        }
        Ok(Some(record))
    }

    pub fn try_save_step_data(&mut self, record: &StepRecord) -> Result<(), StrideError> {
        let mut buffer = [0u8; STEP_RECORD_SIZE];
        let bytes = postcard::to_slice(record, &mut buffer)
            .map_err(|_| StrideError::StorageWrite(StorageError::BufferTooSmall))?;
        self.write_raw(StorageKey::StepRecord, bytes)
    }

    /// Validate and persist a reset time
    pub fn try_set_reset_time(&mut self, candidate: &str) -> Result<(), StrideError> {
        ResetTime::parse(candidate)?;
        self.write_raw(StorageKey::ResetTime, candidate.as_bytes())
    }

    /// Load history; `Ok` with an empty list when nothing is stored
    pub fn try_load_history(&mut self) -> Result<Vec<HistoryEntry>, StrideError> {
        let mut buffer = [0u8; MAX_RECORD_SIZE];
        let bytes = match self.read_raw(StorageKey::History, &mut buffer) {
            Ok(bytes) => bytes,
            Err(StorageError::NotFound) => return Ok(Vec::new()),
            Err(e) => return Err(StrideError::StorageRead(e)),
        };
        postcard::from_bytes(bytes).map_err(|_| StrideError::StorageRead(StorageError::Corrupted))
    }

    fn try_save_history(&mut self, history: &[HistoryEntry]) -> Result<(), StrideError> {
        let bytes = postcard::to_allocvec(history)
            .map_err(|_| StrideError::StorageWrite(StorageError::Corrupted))?;
        if bytes.len() > MAX_RECORD_SIZE {
            return Err(StrideError::StorageWrite(StorageError::BufferTooSmall));
        }
        self.write_raw(StorageKey::History, &bytes)
    }
}

impl<K: KeyValueStore> StepStore for KvStepStore<K> {
    fn load_step_data(&mut self) -> Option<StepRecord> {
        match self.try_load_step_data() {
            Ok(Some(record)) => Some(record),
            Ok(None) => {
                tracing::debug!("no stored step record");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load step record, using defaults");
                None
            }
        }
    }

    fn save_step_data(&mut self, record: &StepRecord) -> bool {
        match self.try_save_step_data(record) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(steps = record.steps, error = %e, "step record not saved");
                false
            }
        }
    }

    fn reset_time(&mut self) -> ResetTime {
        let mut buffer = [0u8; 16];
        let parsed = self
            .read_raw(StorageKey::ResetTime, &mut buffer)
            .and_then(|bytes| str::from_utf8(bytes).map_err(|_| StorageError::Corrupted))
            .and_then(|text| ResetTime::parse(text).map_err(|_| StorageError::Corrupted));
        match parsed {
            Ok(reset) => reset,
            Err(StorageError::NotFound) => ResetTime::default(),
            Err(e) => {
                tracing::warn!(error = %e, "stored reset time unusable, using 00:00");
                ResetTime::default()
            }
        }
    }

    fn set_reset_time(&mut self, candidate: &str) -> bool {
        match self.try_set_reset_time(candidate) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(candidate, error = %e, "reset time not saved");
                false
            }
        }
    }

    fn save_history(&mut self, entry: HistoryEntry) -> bool {
        let mut history = self.load_history();
        history.push(entry);
        if history.len() > MAX_HISTORY {
            let excess = history.len() - MAX_HISTORY;
            history.drain(..excess);
        }
        match self.try_save_history(&history) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "history not saved");
                false
            }
        }
    }

    fn load_history(&mut self) -> Vec<HistoryEntry> {
        self.try_load_history().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load history, starting empty");
            Vec::new()
        })
    }
}

/// In-memory [`KeyValueStore`]
///
/// Useful for tests and for running without a data directory. Writes can be
/// made to fail on demand.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<u8, Vec<u8>>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with [`StorageError::Io`]
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Raw bytes stored under `key`
    pub fn raw(&self, key: StorageKey) -> Option<&[u8]> {
        self.entries.get(&key.as_u8()).map(Vec::as_slice)
    }

    /// Overwrite `key` with arbitrary bytes, bypassing validation
    pub fn put_raw(&mut self, key: StorageKey, data: &[u8]) {
        self.entries.insert(key.as_u8(), data.to_vec());
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError> {
        let data = self
            .entries
            .get(&key.as_u8())
            .ok_or(StorageError::NotFound)?;
        let dest = buffer
            .get_mut(..data.len())
            .ok_or(StorageError::BufferTooSmall)?;
        dest.copy_from_slice(data);
        Ok(data.len())
    }

    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Io);
        }
        self.entries.insert(key.as_u8(), data.to_vec());
        Ok(())
    }
}
