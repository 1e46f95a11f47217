//! # Nest Core
//!
//! Namespace composition for single-container state stores: independently
//! defined chunks of state are combined into one root store, while each chunk
//! keeps a read/write/subscribe interface of its own as if it were a
//! top-level store.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `State`, `Update`: state objects and write requests
//!   - `Address`: nested or flattened placement of a namespace, with
//!     `project_down` / `project_up` translation
//!   - `NamespaceConfig`, `ComposeOptions`: configuration with validation
//!   - `NamespaceError`: composition and lookup errors
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `StateStore`: the underlying store contract (driven)
//!   - `KeyValueStorage`: storage used by persistence (driven)
//!
//! - **Adapters Layer** (`adapters/`): In-memory implementations
//!   - `InMemoryStore`, `InMemoryStorage`
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `Unit`: namespace descriptor
//!   - `Api`: root and delegated interfaces, write layers, extensions
//!   - `Coalescer`: routes one write to its namespaces, commits once
//!   - `Composition`, `namespaced`: the composition entry point
//!   - `accessor`: per-namespace accessors for consumers
//!
//! - **Decorators** (`decorators/`): history (undo/redo) and persistence
//!
//! ## Invariants
//!
//! - **Single commit**: one `set_state` on any interface produces at most one
//!   physical commit, whatever the nesting depth of the namespaces it touches.
//! - **Isolation**: a namespace's writes never alter keys owned by a sibling.
//! - **Round trip**: `project_down(project_up(v)) == v` for any address path.
//!
//! ## Usage Example
//!
//! ```
//! use nest_core::{accessor, create_store, initial, namespaced_with, Unit};
//! use serde_json::json;
//!
//! let counter = Unit::builder("counter")
//!     .flatten()
//!     .build(initial(json!({"count": 0})))?;
//! let store = create_store(namespaced_with(
//!     initial(json!({"title": "demo"})),
//!     [counter.clone()],
//! ))?;
//!
//! let acc = accessor(&store, &counter)?;
//! acc.set_state(json!({"count": 5}), false);
//!
//! assert_eq!(store.get_state()["counter_count"], json!(5));
//! # Ok::<(), nest_core::NamespaceError>(())
//! ```

pub mod adapters;
pub mod decorators;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::{InMemoryStorage, InMemoryStore};
pub use decorators::{
    persist, persisted, with_history, History, HistoryConfig, Partializer, PersistHandle,
    PersistOptions,
};
pub use domain::{
    project_down_path, project_up_path, to_state, Address, Addressing, CollisionPolicy,
    ComposeOptions, NamespaceConfig, NamespaceConfigBuilder, NamespaceError, State, Update,
    DEFAULT_SEPARATOR,
};
pub use ports::{KeyValueStorage, Listener, StateStore, Subscription};
pub use service::{
    accessor, accessors, create_store, create_store_with, initial, namespaced, namespaced_with,
    producer, Accessor, Api, Composition, Next, Producer, Unit, UnitBuilder, UnitId, WeakApi,
    WriteLayer,
};
