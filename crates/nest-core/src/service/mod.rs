//! # Service Layer
//!
//! Unit descriptors, the interface tree, the write coalescer, and the
//! composition and accessor entry points.

pub mod accessor;
pub mod api;
pub mod coalescer;
pub mod compose;
pub mod store;
pub mod unit;

pub use accessor::{accessor, accessors, Accessor};
pub use api::{Api, Next, WeakApi, WriteLayer};
pub use coalescer::Coalescer;
pub use compose::{namespaced, namespaced_with, Composition};
pub use store::{create_store, create_store_with};
pub use unit::{initial, producer, Producer, Unit, UnitBuilder, UnitId};
