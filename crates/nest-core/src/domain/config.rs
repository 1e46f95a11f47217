//! Namespace and composition configuration
//!
//! # Example
//!
//! ```ignore
//! use nest_core::domain::NamespaceConfigBuilder;
//!
//! let config = NamespaceConfigBuilder::new()
//!     .flatten(true)
//!     .separator("_")
//!     .build()?;
//! ```

use super::address::Address;
use super::errors::NamespaceError;
use serde::{Deserialize, Serialize};

/// Separator used by flattened addressing unless configured otherwise.
pub const DEFAULT_SEPARATOR: &str = "_";

/// Addressing configuration for one namespace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceConfig {
    /// Store local keys at the parent level under a prefix instead of nesting.
    pub flatten: bool,
    /// Joins the namespace key and local key in flattened mode.
    pub separator: String,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            flatten: false,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl NamespaceConfig {
    /// Flattened addressing with the default separator.
    pub fn flattened() -> Self {
        Self {
            flatten: true,
            ..Self::default()
        }
    }

    /// Validate the configuration for a namespace named `key`.
    pub fn validate(&self, key: &str) -> Result<(), NamespaceError> {
        if key.is_empty() {
            return Err(NamespaceError::InvalidAddressing {
                key: key.to_string(),
                reason: "namespace key cannot be empty".to_string(),
            });
        }

        if self.flatten && self.separator.is_empty() {
            return Err(NamespaceError::InvalidAddressing {
                key: key.to_string(),
                reason: "separator cannot be empty when flattening".to_string(),
            });
        }

        Ok(())
    }

    /// Build the address for `key` after validating.
    pub fn address(&self, key: &str) -> Result<Address, NamespaceError> {
        self.validate(key)?;
        Ok(if self.flatten {
            Address::flattened(key, self.separator.clone())
        } else {
            Address::nested(key)
        })
    }

    /// Builder-style method to toggle flattening
    pub fn with_flatten(mut self, flatten: bool) -> Self {
        self.flatten = flatten;
        self
    }

    /// Builder-style method to set the separator
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }
}

/// Builder for NamespaceConfig with validation
#[derive(Default)]
pub struct NamespaceConfigBuilder {
    flatten: Option<bool>,
    separator: Option<String>,
}

impl NamespaceConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flatten(mut self, flatten: bool) -> Self {
        self.flatten = Some(flatten);
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    /// Build the config. Only the separator is checked here; the key is
    /// checked when the config is bound to a namespace.
    pub fn build(self) -> Result<NamespaceConfig, NamespaceError> {
        let defaults = NamespaceConfig::default();
        let config = NamespaceConfig {
            flatten: self.flatten.unwrap_or(defaults.flatten),
            separator: self.separator.unwrap_or(defaults.separator),
        };
        if config.flatten && config.separator.is_empty() {
            return Err(NamespaceError::InvalidAddressing {
                key: String::new(),
                reason: "separator cannot be empty when flattening".to_string(),
            });
        }
        Ok(config)
    }
}

/// What composition does when two owners claim the same composite key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionPolicy {
    /// Fail composition with [`NamespaceError::KeyCollision`].
    #[default]
    Reject,
    /// Keep the later contribution and log a warning.
    LastWins,
}

/// Options for one composition level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeOptions {
    pub collision_policy: CollisionPolicy,
}

impl ComposeOptions {
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }
}
