#![forbid(unsafe_code)]

//! Deterministic scenario harness for titlefit.
//!
//! - [`GlyphMetrics`] measures labels with fixed per-character advances, so
//!   layouts are exact and reproducible without a renderer.
//! - [`ScenarioRunner`] plays a scripted [`Scenario`] against a badge at a
//!   fixed frame rate.
//! - [`Trace`] collects one JSONL record per step and hashes the result with
//!   blake3 for golden comparisons.
//!
//! Set `TITLEFIT_LOG=debug` (or any `EnvFilter` directive) to see engine
//! logs while running tests; call [`init_test_logging`] first.

pub mod glyphs;
pub mod scenario;
pub mod trace;

pub use glyphs::GlyphMetrics;
pub use scenario::{DEFAULT_MAX_SETTLE_FRAMES, FRAME, HarnessError, Scenario, ScenarioRunner, Step};
pub use trace::{SCHEMA_VERSION, Trace, TraceRecord, event_name};

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "TITLEFIT_LOG";

/// Install a test-friendly fmt subscriber. Safe to call more than once.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
