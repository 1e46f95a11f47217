//! Accessors for consumers: one per requested unit, looked up in the
//! registry recorded at composition time.

use crate::domain::{NamespaceError, State};
use crate::service::api::Api;
use crate::service::unit::Unit;
use std::ops::Deref;

/// A unit's delegated interface, plus selector-style reads.
///
/// Derefs to [`Api`], so `get_state`, `set_state`, `subscribe`,
/// `get_raw_state` and every attached extension are available directly.
#[derive(Clone, Debug)]
pub struct Accessor {
    api: Api,
}

impl Accessor {
    /// Full local state.
    pub fn state(&self) -> State {
        self.api.get_state()
    }

    /// Project the local state through `selector`.
    pub fn select<T>(&self, selector: impl FnOnce(&State) -> T) -> T {
        selector(&self.api.get_state())
    }

    /// Accessor for a direct child of this unit.
    pub fn accessor(&self, unit: &Unit) -> Result<Accessor, NamespaceError> {
        accessor(&self.api, unit)
    }

    pub fn api(&self) -> &Api {
        &self.api
    }
}

impl Deref for Accessor {
    type Target = Api;

    fn deref(&self) -> &Api {
        &self.api
    }
}

/// Accessor for `unit`, which must be a direct child of `api`.
pub fn accessor(api: &Api, unit: &Unit) -> Result<Accessor, NamespaceError> {
    api.namespace(unit).map(|api| Accessor { api })
}

/// Accessors for several direct children, in the order requested.
pub fn accessors(api: &Api, units: &[&Unit]) -> Result<Vec<Accessor>, NamespaceError> {
    units.iter().map(|unit| accessor(api, unit)).collect()
}
