//! Stride platform abstraction layer
//!
//! Defines the storage traits a platform implements so the pedometer core
//! can persist its state without knowing where bytes end up.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Runtime (stride-host, ...)             │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  stride-core (typed step store)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  stride-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`storage::KeyValueStore`] - Persistent keyed byte storage

#![no_std]
#![deny(unsafe_code)]

pub mod storage;

pub use storage::{KeyValueStore, StorageError, StorageKey};
