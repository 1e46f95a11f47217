//! # Composition
//!
//! Builds one producer out of a base producer (fields owned by no unit) and
//! an ordered list of units. The resulting producer can be handed to a store
//! or used as the producer of yet another unit, which is how nesting works.

use crate::domain::{CollisionPolicy, ComposeOptions, NamespaceError, State};
use crate::service::api::Api;
use crate::service::coalescer::Coalescer;
use crate::service::unit::{Producer, Unit};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::{debug, warn};

/// Fluent builder for a composed [`Producer`].
#[derive(Default)]
pub struct Composition {
    base: Option<Producer>,
    units: Vec<Unit>,
    options: ComposeOptions,
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Producer for the fields owned by no unit. It receives the composed
    /// interface itself.
    pub fn base(mut self, producer: Producer) -> Self {
        self.base = Some(producer);
        self
    }

    pub fn unit(mut self, unit: Unit) -> Self {
        self.units.push(unit);
        self
    }

    pub fn units(mut self, units: impl IntoIterator<Item = Unit>) -> Self {
        self.units.extend(units);
        self
    }

    pub fn options(mut self, options: ComposeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.options.collision_policy = policy;
        self
    }

    pub fn build(self) -> Producer {
        let Composition {
            base,
            units,
            options,
        } = self;
        Rc::new(move |api: &Api| compose_level(api, base.as_ref(), &units, &options))
    }
}

/// Compose `units` with no base fields.
pub fn namespaced(units: impl IntoIterator<Item = Unit>) -> Producer {
    Composition::new().units(units).build()
}

/// Compose `units` over a base producer.
pub fn namespaced_with(base: Producer, units: impl IntoIterator<Item = Unit>) -> Producer {
    Composition::new().base(base).units(units).build()
}

fn compose_level(
    api: &Api,
    base: Option<&Producer>,
    units: &[Unit],
    options: &ComposeOptions,
) -> Result<State, NamespaceError> {
    check_sibling_keys(units)?;
    api.mark_composed()?;
    api.push_layer(Rc::new(Coalescer));

    let mut composite = CompositeBuilder::new(options.collision_policy);

    if let Some(base) = base {
        for (key, value) in base(api)? {
            if let Some(unit) = units.iter().find(|u| u.address().owns(&key)) {
                composite.collide(&key, "base state", &unit_label(unit))?;
            }
            composite.insert(key, value, "base state".to_string())?;
        }
    }

    for unit in units {
        let child = Api::delegated(api, unit);
        api.register_child(unit, child.clone());
        let local = (unit.producer())(&child)?;
        debug!(
            namespace = %unit.key(),
            depth = child.address_path().len(),
            fields = local.len(),
            "Namespace composed"
        );
        for (key, value) in unit.address().project_up(local) {
            composite.insert(key, value, unit_label(unit))?;
        }
    }

    debug!(
        namespaces = units.len(),
        keys = composite.state.len(),
        "Composition level built"
    );
    Ok(composite.state)
}

/// Sibling keys must be unique and no sibling may own keys of another.
fn check_sibling_keys(units: &[Unit]) -> Result<(), NamespaceError> {
    let mut seen = HashSet::new();
    for unit in units {
        if !seen.insert(unit.key()) {
            return Err(NamespaceError::DuplicateNamespace {
                key: unit.key().to_string(),
            });
        }
    }
    for (i, first) in units.iter().enumerate() {
        if let Some(second) = units[i + 1..]
            .iter()
            .find(|other| first.address().overlaps(other.address()))
        {
            return Err(NamespaceError::KeyCollision {
                key: second.key().to_string(),
                first: unit_label(first),
                second: unit_label(second),
            });
        }
    }
    Ok(())
}

fn unit_label(unit: &Unit) -> String {
    format!("namespace '{}'", unit.key())
}

/// Composite state under construction, tracking which owner wrote each key.
struct CompositeBuilder {
    policy: CollisionPolicy,
    state: State,
    owners: HashMap<String, String>,
}

impl CompositeBuilder {
    fn new(policy: CollisionPolicy) -> Self {
        Self {
            policy,
            state: State::new(),
            owners: HashMap::new(),
        }
    }

    fn insert(&mut self, key: String, value: Value, owner: String) -> Result<(), NamespaceError> {
        if let Some(first) = self.owners.get(&key).cloned() {
            self.collide(&key, &first, &owner)?;
        }
        self.owners.insert(key.clone(), owner);
        self.state.insert(key, value);
        Ok(())
    }

    fn collide(&self, key: &str, first: &str, second: &str) -> Result<(), NamespaceError> {
        match self.policy {
            CollisionPolicy::Reject => Err(NamespaceError::KeyCollision {
                key: key.to_string(),
                first: first.to_string(),
                second: second.to_string(),
            }),
            CollisionPolicy::LastWins => {
                warn!(key, first, second, "Composite key collision, later owner wins");
                Ok(())
            }
        }
    }
}
