//! # Unit Descriptors
//!
//! A [`Unit`] describes one composable namespace: its key and addressing,
//! the producer of its local state, and opaque unit-scoped options.
//! Descriptors are immutable and cheap to clone; composing the same
//! descriptor into several stores is allowed.

use crate::domain::{Address, NamespaceConfig, NamespaceError, State};
use crate::service::api::Api;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Produces a state given the interface it will live behind.
///
/// Mirrors a store's construction contract: the producer may keep a clone of
/// the interface to write later, may push write layers, and returns the
/// initial state.
pub type Producer = Rc<dyn Fn(&Api) -> Result<State, NamespaceError>>;

/// Wrap a closure as a [`Producer`].
pub fn producer<F>(f: F) -> Producer
where
    F: Fn(&Api) -> Result<State, NamespaceError> + 'static,
{
    Rc::new(f)
}

/// A producer that always yields `value` (objects only; anything else is empty).
pub fn initial(value: Value) -> Producer {
    let state = crate::domain::to_state(value);
    Rc::new(move |_| Ok(state.clone()))
}

/// Process-unique identity of a unit descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UnitId(u64);

impl UnitId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        UnitId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

struct UnitInner {
    id: UnitId,
    address: Address,
    producer: Producer,
    options: Option<Rc<dyn Any>>,
}

/// Declarative record for one namespace.
#[derive(Clone)]
pub struct Unit {
    inner: Rc<UnitInner>,
}

impl Unit {
    /// A nested namespace with default configuration.
    pub fn new(key: impl Into<String>, producer: Producer) -> Result<Self, NamespaceError> {
        UnitBuilder::new(key).build(producer)
    }

    /// A namespace with explicit addressing configuration.
    pub fn with_config(
        key: impl Into<String>,
        config: NamespaceConfig,
        producer: Producer,
    ) -> Result<Self, NamespaceError> {
        UnitBuilder::new(key).config(config).build(producer)
    }

    pub fn builder(key: impl Into<String>) -> UnitBuilder {
        UnitBuilder::new(key)
    }

    pub fn id(&self) -> UnitId {
        self.inner.id
    }

    pub fn key(&self) -> &str {
        self.inner.address.key()
    }

    pub fn address(&self) -> &Address {
        &self.inner.address
    }

    pub fn producer(&self) -> &Producer {
        &self.inner.producer
    }

    /// Unit options, if present and of type `T`.
    pub fn options<T: Any>(&self) -> Option<&T> {
        self.inner.options.as_ref()?.downcast_ref::<T>()
    }

    /// The same unit with its producer replaced, for decorators applied after
    /// the descriptor was built. The result is a new descriptor.
    pub fn map_producer(&self, f: impl FnOnce(Producer) -> Producer) -> Self {
        Self {
            inner: Rc::new(UnitInner {
                id: UnitId::next(),
                address: self.inner.address.clone(),
                producer: f(self.inner.producer.clone()),
                options: self.inner.options.clone(),
            }),
        }
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("id", &self.inner.id)
            .field("address", &self.inner.address)
            .field("has_options", &self.inner.options.is_some())
            .finish()
    }
}

/// Fluent construction of a [`Unit`].
pub struct UnitBuilder {
    key: String,
    config: NamespaceConfig,
    options: Option<Rc<dyn Any>>,
}

impl UnitBuilder {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            config: NamespaceConfig::default(),
            options: None,
        }
    }

    pub fn config(mut self, config: NamespaceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn flatten(mut self) -> Self {
        self.config.flatten = true;
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.config.separator = separator.into();
        self
    }

    /// Attach opaque options, retrievable with [`Unit::options`].
    pub fn options<T: Any>(mut self, options: T) -> Self {
        self.options = Some(Rc::new(options));
        self
    }

    pub fn build(self, producer: Producer) -> Result<Unit, NamespaceError> {
        let address = self.config.address(&self.key)?;
        Ok(Unit {
            inner: Rc::new(UnitInner {
                id: UnitId::next(),
                address,
                producer,
                options: self.options,
            }),
        })
    }
}
