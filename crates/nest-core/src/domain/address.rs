//! # Address Translation
//!
//! Converts between a unit's local state and its slice of a composite state.
//!
//! ```text
//! nested:     { A: { count: 1 } }   <->  A local { count: 1 }
//! flattened:  { A_count: 1 }        <->  A local { count: 1 }
//! ```
//!
//! Both directions compose over an address path. Down through `[A, B]` is
//! `down(down(state, A), B)`; up walks the same path in reverse.

use super::state::{as_state, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a unit's fields are laid out inside its parent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Addressing {
    /// Local state lives under `parent[key]`.
    Nested,
    /// Every local key `k` lives at `parent[key + separator + k]`.
    Flattened { separator: String },
}

/// The location of one unit inside its parent's state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    key: String,
    addressing: Addressing,
}

impl Address {
    pub fn nested(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            addressing: Addressing::Nested,
        }
    }

    pub fn flattened(key: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            addressing: Addressing::Flattened {
                separator: separator.into(),
            },
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn addressing(&self) -> &Addressing {
        &self.addressing
    }

    pub fn is_flattened(&self) -> bool {
        matches!(self.addressing, Addressing::Flattened { .. })
    }

    /// Prefix shared by every owned key in flattened mode.
    pub fn prefix(&self) -> Option<String> {
        match &self.addressing {
            Addressing::Nested => None,
            Addressing::Flattened { separator } => Some(format!("{}{}", self.key, separator)),
        }
    }

    /// Whether `composite_key` belongs to this unit.
    pub fn owns(&self, composite_key: &str) -> bool {
        match self.prefix() {
            None => composite_key == self.key,
            Some(prefix) => composite_key.starts_with(&prefix),
        }
    }

    /// The nested key, or the prefix of every flattened key.
    fn claim(&self) -> String {
        self.prefix().unwrap_or_else(|| self.key.clone())
    }

    /// Whether either address can own a key that belongs to the other.
    pub fn overlaps(&self, other: &Address) -> bool {
        let covers = |a: &Address, b: &Address| {
            a.prefix()
                .is_some_and(|prefix| b.claim().starts_with(&prefix))
        };
        self.key == other.key || covers(self, other) || covers(other, self)
    }

    /// Composite keys of `composite` owned by this unit.
    pub fn owned_keys(&self, composite: &State) -> Vec<String> {
        composite
            .keys()
            .filter(|k| self.owns(k))
            .cloned()
            .collect()
    }

    /// Select this unit's local state out of a composite state.
    pub fn project_down(&self, composite: &State) -> State {
        match self.prefix() {
            None => as_state(composite.get(&self.key)),
            Some(prefix) => composite
                .iter()
                .filter_map(|(k, v)| {
                    k.strip_prefix(prefix.as_str())
                        .map(|local| (local.to_string(), v.clone()))
                })
                .collect(),
        }
    }

    /// Lift a local state into a partial composite state.
    pub fn project_up(&self, local: State) -> State {
        match self.prefix() {
            None => {
                let mut out = State::new();
                out.insert(self.key.clone(), Value::Object(local));
                out
            }
            Some(prefix) => local
                .into_iter()
                .map(|(k, v)| (format!("{}{}", prefix, k), v))
                .collect(),
        }
    }
}

/// Project down through every address of `path`, root first.
pub fn project_down_path(composite: &State, path: &[Address]) -> State {
    path.iter()
        .fold(composite.clone(), |state, address| address.project_down(&state))
}

/// Project up through `path`, innermost address first.
pub fn project_up_path(local: State, path: &[Address]) -> State {
    path.iter()
        .rev()
        .fold(local, |state, address| address.project_up(state))
}
