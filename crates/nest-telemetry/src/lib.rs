//! # Nest Telemetry
//!
//! Structured logging for applications built on `nest-core`. The core emits
//! `tracing` events (composition at `debug`, commits at `trace`, ignored
//! rehydration and collisions at `warn`); this crate installs the subscriber
//! that prints them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nest_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     init_telemetry(&TelemetryConfig::from_env()).expect("Failed to init telemetry");
//!     // Your application code here
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `NEST_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `NEST_JSON_LOGS` | `false` | JSON instead of pretty output |
//! | `NEST_CONSOLE_OUTPUT` | `true` | Print to the console at all |
//! | `NEST_SERVICE_NAME` | `nest` | Service name on the startup event |

mod config;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::env_filter;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Initialize logging. Fails if a global subscriber is already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    tracing_setup::init_tracing(config)
}
