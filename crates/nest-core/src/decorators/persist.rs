//! # Persistence
//!
//! Saves the decorated interface's state to a [`KeyValueStorage`] whenever a
//! write through it commits a change, and rehydrates it when the producer
//! runs. The saved value is the committed state, read from the commit
//! notification.
//!
//! The stored value is a JSON envelope carrying the state and a version tag;
//! a stored value with another version, or one that does not parse, is
//! ignored.

use crate::domain::{merged, NamespaceError, State, Update};
use crate::ports::{KeyValueStorage, Subscription};
use crate::service::api::{Api, Next, WriteLayer};
use crate::service::unit::{Producer, Unit};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, warn};

/// Extension name under which [`PersistHandle`] is attached.
pub const PERSIST_EXTENSION: &str = "persist";

/// Selects the fields that get persisted.
pub type Partialize = Rc<dyn Fn(&State) -> State>;

/// Unit option carrying a partializer, read by [`persisted`].
#[derive(Clone)]
pub struct Partializer(pub Partialize);

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    state: State,
    version: u32,
}

/// Persistence options
#[derive(Clone)]
pub struct PersistOptions {
    pub name: String,
    pub storage: Rc<dyn KeyValueStorage>,
    pub version: u32,
    pub partialize: Option<Partialize>,
}

impl PersistOptions {
    pub fn new(name: impl Into<String>, storage: Rc<dyn KeyValueStorage>) -> Self {
        Self {
            name: name.into(),
            storage,
            version: 0,
            partialize: None,
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_partialize(mut self, f: impl Fn(&State) -> State + 'static) -> Self {
        self.partialize = Some(Rc::new(f));
        self
    }

    fn save(&self, state: &State) -> Result<(), NamespaceError> {
        let state = match &self.partialize {
            Some(f) => f(state),
            None => state.clone(),
        };
        let raw = serde_json::to_string(&Envelope {
            state,
            version: self.version,
        })?;
        self.storage.set_item(&self.name, raw);
        Ok(())
    }

    fn load(&self) -> Result<Option<State>, NamespaceError> {
        let Some(raw) = self.storage.get_item(&self.name) else {
            return Ok(None);
        };
        let envelope: Envelope = serde_json::from_str(&raw)?;
        if envelope.version != self.version {
            warn!(
                name = %self.name,
                stored = envelope.version,
                expected = self.version,
                "Stored state version mismatch, ignoring"
            );
            return Ok(None);
        }
        Ok(Some(envelope.state))
    }
}

impl fmt::Debug for PersistOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistOptions")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("partialize", &self.partialize.is_some())
            .finish()
    }
}

/// Marks that a write passed through the persisted interface.
struct PersistLayer {
    pending: Rc<Cell<bool>>,
}

impl WriteLayer for PersistLayer {
    fn write(&self, _api: &Api, update: Update, replace: bool, next: Next<'_>) {
        self.pending.set(true);
        next.run(update, replace);
    }
}

/// Storage handle attached to a persisted interface.
pub struct PersistHandle {
    options: PersistOptions,
    _commits: Subscription,
}

impl PersistHandle {
    pub fn name(&self) -> &str {
        &self.options.name
    }

    /// Remove the stored value. The in-memory state is untouched.
    pub fn clear_storage(&self) {
        self.options.storage.remove_item(&self.options.name);
    }
}

/// Decorate `producer` with persistence.
pub fn persist(producer: Producer, options: PersistOptions) -> Producer {
    Rc::new(move |api: &Api| {
        let initial = producer(api)?;
        let state = match options.load() {
            Ok(Some(stored)) => {
                debug!(name = %options.name, fields = stored.len(), "State rehydrated");
                merged(&initial, stored)
            }
            Ok(None) => initial,
            Err(e) => {
                warn!(name = %options.name, error = %e, "Stored state unreadable, ignoring");
                initial
            }
        };
        let pending = Rc::new(Cell::new(false));
        let saver = options.clone();
        let marker = pending.clone();
        let commits = api.subscribe(move |next, previous| {
            if !marker.replace(false) || next == previous {
                return;
            }
            if let Err(e) = saver.save(next) {
                warn!(name = %saver.name, error = %e, "Failed to persist state");
            }
        });
        api.push_layer(Rc::new(PersistLayer { pending }));
        api.insert_extension(
            PERSIST_EXTENSION,
            PersistHandle {
                options: options.clone(),
                _commits: commits,
            },
        );
        Ok(state)
    })
}

/// `unit` with its producer persisted under the unit's key, using the
/// unit's [`Partializer`] option when present.
pub fn persisted(unit: &Unit, storage: Rc<dyn KeyValueStorage>) -> Unit {
    let mut options = PersistOptions::new(unit.key(), storage);
    options.partialize = unit.options::<Partializer>().map(|p| p.0.clone());
    unit.map_producer(|producer| persist(producer, options))
}
