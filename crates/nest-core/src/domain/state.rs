//! # State values and updates
//!
//! Every level of composition exchanges state as a JSON object map. Values
//! that are absent or not objects are read as the empty map.

use serde_json::{Map, Value};
use std::fmt;

/// A state object: string keys to JSON values.
pub type State = Map<String, Value>;

/// A write request, before it is resolved against the current state.
pub enum Update {
    /// Fields to merge (or to replace with, when `replace` is set).
    Partial(State),
    /// Computes the fields from the current state of the target interface.
    Compute(Box<dyn FnOnce(&State) -> State>),
}

impl Update {
    /// Build a function-form update.
    pub fn compute<F>(f: F) -> Self
    where
        F: FnOnce(&State) -> State + 'static,
    {
        Update::Compute(Box::new(f))
    }

    /// Resolve to a concrete partial state.
    pub fn resolve(self, current: &State) -> State {
        match self {
            Update::Partial(partial) => partial,
            Update::Compute(f) => f(current),
        }
    }
}

impl fmt::Debug for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::Partial(partial) => f.debug_tuple("Partial").field(partial).finish(),
            Update::Compute(_) => f.write_str("Compute(..)"),
        }
    }
}

impl From<State> for Update {
    fn from(partial: State) -> Self {
        Update::Partial(partial)
    }
}

impl From<Value> for Update {
    fn from(value: Value) -> Self {
        Update::Partial(to_state(value))
    }
}

/// Convert a JSON value into a state object; anything but an object is empty.
pub fn to_state(value: Value) -> State {
    match value {
        Value::Object(map) => map,
        _ => State::new(),
    }
}

/// Borrowing variant of [`to_state`].
pub fn as_state(value: Option<&Value>) -> State {
    match value {
        Some(Value::Object(map)) => map.clone(),
        _ => State::new(),
    }
}

/// Shallow merge: every key of `partial` overwrites the same key in `base`.
pub fn merge(base: &mut State, partial: State) {
    for (key, value) in partial {
        base.insert(key, value);
    }
}

/// Shallow merge returning a new map.
pub fn merged(base: &State, partial: State) -> State {
    let mut out = base.clone();
    merge(&mut out, partial);
    out
}

/// True when writing `partial` over `current` would not change anything.
pub fn is_noop(current: &State, partial: &State) -> bool {
    partial
        .iter()
        .all(|(key, value)| current.get(key) == Some(value))
}
