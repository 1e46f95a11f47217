//! # Decorators
//!
//! `Producer -> Producer` wrappers that push write layers onto the interface
//! they receive and attach named extensions. They work at any level: on a
//! whole composed store, or on one unit's producer before it is composed.

pub mod history;
pub mod persist;

pub use history::{with_history, History, HistoryConfig, HISTORY_EXTENSION};
pub use persist::{
    persist, persisted, Partialize, Partializer, PersistHandle, PersistOptions,
    PERSIST_EXTENSION,
};
