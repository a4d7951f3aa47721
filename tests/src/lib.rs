//! # TetraCrypt Failsafe Test Suite
//!
//! Cross-crate scenarios that exercise the engine together with the
//! reference backends and the runtime.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── scenarios.rs    # Coordinator scenarios with scripted backends
//! │   ├── backends.rs     # Reference backends behind the manager
//! │   ├── events.rs       # Event stream during switches and failovers
//! │   └── runtime.rs      # Container bootstrap, commands, monitor
//! └── benches/
//!     └── failover_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p failsafe-tests
//! cargo test -p failsafe-tests integration::scenarios::
//! cargo bench -p failsafe-tests
//! ```

pub mod integration;
