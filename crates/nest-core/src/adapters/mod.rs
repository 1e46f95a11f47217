//! # Adapters
//!
//! In-memory implementations of the ports: the physical store the root
//! interface commits to, and the storage the persistence decorator writes.

pub mod memory_storage;
pub mod memory_store;

pub use memory_storage::InMemoryStorage;
pub use memory_store::InMemoryStore;
