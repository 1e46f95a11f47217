//! # Nest Test Suite
//!
//! Cross-module scenarios for namespace composition.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── scenarios.rs    # Composition shapes and accessor lookup
//!     ├── coalescing.rs   # Single commit, isolation, replace, cleanup
//!     └── decorators.rs   # History and persistence across namespaces
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p nest-tests
//! cargo test -p nest-tests integration::coalescing
//!
//! # Benchmarks
//! cargo bench -p nest-tests
//! ```


use nest_telemetry::{init_telemetry, TelemetryConfig};
use std::sync::Once;

static LOGGING: Once = Once::new();

/// Install a subscriber once per test binary, only when a log level is set
/// through `NEST_LOG_LEVEL` or `RUST_LOG`.
pub fn init_test_logging() {
    LOGGING.call_once(|| {
        if std::env::var("NEST_LOG_LEVEL").is_err() && std::env::var("RUST_LOG").is_err() {
            return;
        }
        // Another harness may already own the global subscriber.
        let _ = init_telemetry(&TelemetryConfig::from_env());
    });
}
