//! # Interfaces
//!
//! [`Api`] is the read/write/subscribe surface exposed at every level of
//! composition. The root interface sits directly on a [`StateStore`]; a
//! delegated interface speaks its unit's local coordinates and forwards to
//! its parent.
//!
//! ## Write path
//!
//! ```text
//! set_state ──→ [layer n] ──→ ... ──→ [layer 1] ──→ write_through
//!               (decorators, coalescer)              │
//!                                   root: commit to the store
//!                                   delegated: contribute to the parent's
//!                                   payload, or call parent.set_state
//! ```
//!
//! Layers pushed later run first. Composition pushes the coalescer; a
//! decorator wrapping a composed producer therefore sees one merged write.

use crate::domain::{
    merge, project_up_path, Address, NamespaceError, State, Update,
};
use crate::ports::{Listener, StateStore, Subscription};
use crate::service::unit::{Unit, UnitId};
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

/// A write interceptor installed on one interface.
pub trait WriteLayer {
    /// Handle a write. Call `next.run` to pass it down the chain.
    fn write(&self, api: &Api, update: Update, replace: bool, next: Next<'_>);
}

/// The remainder of a write chain.
pub struct Next<'a> {
    api: &'a Api,
    layers: &'a [Rc<dyn WriteLayer>],
}

impl Next<'_> {
    pub fn run(self, update: Update, replace: bool) {
        match self.layers.split_last() {
            Some((layer, rest)) => layer.write(
                self.api,
                update,
                replace,
                Next {
                    api: self.api,
                    layers: rest,
                },
            ),
            None => self.api.write_through(update, replace),
        }
    }
}

/// Contributions collected while a coalesced write is in progress.
#[derive(Debug, Default)]
pub(crate) struct Payload {
    values: State,
    removed: BTreeSet<String>,
}

impl Payload {
    fn contribute(&mut self, values: State, removed: Vec<String>) {
        for key in removed {
            self.values.remove(&key);
            self.removed.insert(key);
        }
        for (key, value) in values {
            self.removed.remove(&key);
            self.values.insert(key, value);
        }
    }

    pub(crate) fn into_parts(self) -> (State, BTreeSet<String>) {
        (self.values, self.removed)
    }
}

/// Scope of one coalesced write on one interface.
///
/// The first session opened on an interface owns its payload; the payload
/// is released when the owner is dropped, on every exit path.
pub(crate) struct PayloadSession<'a> {
    api: &'a Api,
    owner: bool,
}

impl<'a> PayloadSession<'a> {
    pub(crate) fn open(api: &'a Api) -> Self {
        let mut slot = api.inner.payload.borrow_mut();
        let owner = slot.is_none();
        if owner {
            *slot = Some(Payload::default());
        }
        Self { api, owner }
    }

    pub(crate) fn is_owner(&self) -> bool {
        self.owner
    }

    /// Take the collected payload, closing the session for new contributions.
    pub(crate) fn take(&self) -> Payload {
        self.api
            .inner
            .payload
            .borrow_mut()
            .take()
            .unwrap_or_default()
    }
}

impl Drop for PayloadSession<'_> {
    fn drop(&mut self) {
        if self.owner {
            self.api.inner.payload.borrow_mut().take();
        }
    }
}

/// Marks an interface as the originator of the write in progress.
struct InFlight<'a> {
    api: &'a Api,
}

impl<'a> InFlight<'a> {
    fn enter(api: &'a Api) -> Self {
        let count = &api.inner.in_flight;
        count.set(count.get() + 1);
        Self { api }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let count = &self.api.inner.in_flight;
        count.set(count.get().saturating_sub(1));
    }
}

/// A registered child interface.
#[derive(Clone)]
pub(crate) struct Child {
    pub(crate) id: UnitId,
    pub(crate) address: Address,
    pub(crate) api: Api,
}

enum Link {
    Root(Rc<dyn StateStore>),
    Delegated {
        parent: Weak<ApiInner>,
        address: Address,
        path: Vec<Address>,
    },
}

struct ApiInner {
    link: Link,
    layers: RefCell<Vec<Rc<dyn WriteLayer>>>,
    children: RefCell<Vec<Child>>,
    composed: Cell<bool>,
    payload: RefCell<Option<Payload>>,
    in_flight: Cell<usize>,
    extensions: RefCell<HashMap<String, Rc<dyn Any>>>,
}

/// Read/write/subscribe interface for one level of a composed store.
#[derive(Clone)]
pub struct Api {
    inner: Rc<ApiInner>,
}

/// Non-owning handle to an [`Api`], for capabilities stored on the interface.
#[derive(Clone)]
pub struct WeakApi {
    inner: Weak<ApiInner>,
}

impl WeakApi {
    pub fn upgrade(&self) -> Option<Api> {
        self.inner.upgrade().map(|inner| Api { inner })
    }
}

impl Api {
    fn with_link(link: Link) -> Self {
        Self {
            inner: Rc::new(ApiInner {
                link,
                layers: RefCell::new(Vec::new()),
                children: RefCell::new(Vec::new()),
                composed: Cell::new(false),
                payload: RefCell::new(None),
                in_flight: Cell::new(0),
                extensions: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Root interface committing to `store`.
    pub fn root(store: Rc<dyn StateStore>) -> Self {
        Self::with_link(Link::Root(store))
    }

    /// Interface for `unit`, delegating to `parent`.
    pub(crate) fn delegated(parent: &Api, unit: &Unit) -> Self {
        let mut path = parent.address_path().to_vec();
        path.push(unit.address().clone());
        Self::with_link(Link::Delegated {
            parent: Rc::downgrade(&parent.inner),
            address: unit.address().clone(),
            path,
        })
    }

    pub fn downgrade(&self) -> WeakApi {
        WeakApi {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self.inner.link, Link::Root(_))
    }

    /// Address of this interface inside its parent; `None` at the root.
    pub fn address(&self) -> Option<&Address> {
        match &self.inner.link {
            Link::Root(_) => None,
            Link::Delegated { address, .. } => Some(address),
        }
    }

    /// Addresses from the root down to this interface; empty at the root.
    pub fn address_path(&self) -> &[Address] {
        match &self.inner.link {
            Link::Root(_) => &[],
            Link::Delegated { path, .. } => path,
        }
    }

    pub fn parent(&self) -> Option<Api> {
        match &self.inner.link {
            Link::Root(_) => None,
            Link::Delegated { parent, .. } => parent.upgrade().map(|inner| Api { inner }),
        }
    }

    /// Whether a write originated by this interface is in progress.
    pub fn is_in_flight(&self) -> bool {
        self.inner.in_flight.get() > 0
    }

    // =========================================================================
    // Read / write / subscribe
    // =========================================================================

    /// Current state in this interface's coordinates.
    pub fn get_state(&self) -> State {
        match &self.inner.link {
            Link::Root(store) => store.get_state(),
            Link::Delegated {
                parent, address, ..
            } => match parent.upgrade() {
                Some(inner) => address.project_down(&Api { inner }.get_state()),
                None => State::new(),
            },
        }
    }

    /// This unit's slice expressed in root coordinates.
    pub fn get_raw_state(&self) -> State {
        project_up_path(self.get_state(), self.address_path())
    }

    /// Write through every installed layer.
    pub fn set_state(&self, update: impl Into<Update>, replace: bool) {
        let layers = self.inner.layers.borrow().clone();
        Next {
            api: self,
            layers: &layers,
        }
        .run(update.into(), replace);
    }

    /// Listen for committed changes, projected into this interface's coordinates.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&State, &State) + 'static,
    {
        self.subscribe_listener(Rc::new(listener))
    }

    fn subscribe_listener(&self, listener: Listener) -> Subscription {
        match &self.inner.link {
            Link::Root(store) => store.subscribe(listener),
            Link::Delegated {
                parent, address, ..
            } => {
                let Some(inner) = parent.upgrade() else {
                    warn!(namespace = %address.key(), "Subscribe on a dropped store");
                    return Subscription::empty();
                };
                let address = address.clone();
                let projected: Listener = Rc::new(move |next: &State, previous: &State| {
                    listener(&address.project_down(next), &address.project_down(previous))
                });
                Api { inner }.subscribe_listener(projected)
            }
        }
    }

    /// The write below every layer.
    fn write_through(&self, update: Update, replace: bool) {
        match &self.inner.link {
            Link::Root(store) => {
                if self.has_payload() {
                    // A root write issued while the root is routing joins its commit.
                    let current = self.get_state();
                    let next = update.resolve(&current);
                    let removed = if replace {
                        absent_keys(&current, &next)
                    } else {
                        Vec::new()
                    };
                    self.contribute(next, removed);
                } else {
                    store.set_state(update, replace);
                }
            }
            Link::Delegated {
                parent, address, ..
            } => {
                let Some(inner) = parent.upgrade() else {
                    warn!(namespace = %address.key(), "Write on a dropped store ignored");
                    return;
                };
                let parent = Api { inner };
                let _flight = InFlight::enter(self);

                let current = self.get_state();
                let next = update.resolve(&current);
                let (values, removed) = if replace {
                    let stale = absent_keys(&current, &next);
                    let removed = if address.is_flattened() {
                        let stale: State = stale
                            .into_iter()
                            .map(|k| (k, serde_json::Value::Null))
                            .collect();
                        address
                            .project_up(stale)
                            .into_iter()
                            .map(|(k, _)| k)
                            .collect::<Vec<_>>()
                    } else {
                        Vec::new()
                    };
                    (address.project_up(next), removed)
                } else {
                    let mut local = current;
                    merge(&mut local, next);
                    (address.project_up(local), Vec::new())
                };

                if parent.has_payload() {
                    parent.contribute(values, removed);
                } else if removed.is_empty() {
                    parent.set_state(Update::Partial(values), false);
                } else {
                    let mut full = parent.get_state();
                    for key in &removed {
                        full.remove(key);
                    }
                    merge(&mut full, values);
                    parent.set_state(Update::Partial(full), true);
                }
            }
        }
    }

    // =========================================================================
    // Payload
    // =========================================================================

    pub(crate) fn has_payload(&self) -> bool {
        self.inner.payload.borrow().is_some()
    }

    /// Add to the active payload; a no-op when none is active.
    pub(crate) fn contribute(&self, values: State, removed: Vec<String>) {
        if let Some(payload) = self.inner.payload.borrow_mut().as_mut() {
            payload.contribute(values, removed);
        }
    }

    // =========================================================================
    // Registry
    // =========================================================================

    /// Claim this interface for composition; fails if already composed.
    pub(crate) fn mark_composed(&self) -> Result<(), NamespaceError> {
        if self.inner.composed.replace(true) {
            return Err(NamespaceError::AlreadyComposed);
        }
        Ok(())
    }

    pub(crate) fn register_child(&self, unit: &Unit, api: Api) {
        self.inner.children.borrow_mut().push(Child {
            id: unit.id(),
            address: unit.address().clone(),
            api,
        });
    }

    /// Registered children in registration order.
    pub(crate) fn children(&self) -> Vec<Child> {
        self.inner.children.borrow().clone()
    }

    /// Keys of registered children in registration order.
    pub fn child_keys(&self) -> Vec<String> {
        self.inner
            .children
            .borrow()
            .iter()
            .map(|c| c.address.key().to_string())
            .collect()
    }

    /// The delegated interface registered for `unit` at composition time.
    pub fn namespace(&self, unit: &Unit) -> Result<Api, NamespaceError> {
        self.inner
            .children
            .borrow()
            .iter()
            .find(|c| c.id == unit.id())
            .map(|c| c.api.clone())
            .ok_or_else(|| {
                debug!(namespace = %unit.key(), "Namespace lookup failed");
                NamespaceError::NamespaceNotFound {
                    key: unit.key().to_string(),
                }
            })
    }

    // =========================================================================
    // Layers and extensions
    // =========================================================================

    /// Install a write layer; it runs before every layer installed earlier.
    pub fn push_layer(&self, layer: Rc<dyn WriteLayer>) {
        self.inner.layers.borrow_mut().push(layer);
    }

    pub fn layer_count(&self) -> usize {
        self.inner.layers.borrow().len()
    }

    /// Attach a named capability, replacing any previous one with that name.
    pub fn insert_extension<T: Any>(&self, name: impl Into<String>, value: T) {
        self.inner
            .extensions
            .borrow_mut()
            .insert(name.into(), Rc::new(value));
    }

    /// A named capability, if present and of type `T`.
    pub fn extension<T: Any>(&self, name: &str) -> Option<Rc<T>> {
        let ext = self.inner.extensions.borrow().get(name).cloned()?;
        ext.downcast::<T>().ok()
    }

    pub fn extension_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.extensions.borrow().keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("path", &self.address_path())
            .field("children", &self.child_keys())
            .field("layers", &self.layer_count())
            .field("extensions", &self.extension_names())
            .finish()
    }
}

/// Keys of `current` missing from `next`.
pub(crate) fn absent_keys(current: &State, next: &State) -> Vec<String> {
    current
        .keys()
        .filter(|k| !next.contains_key(*k))
        .cloned()
        .collect()
}
