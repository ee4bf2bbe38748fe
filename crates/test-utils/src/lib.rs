//! Shared test utilities for the webdata source-tree workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Capability document fixtures
//! - In-memory host collaborators (live surface, notifier, state store)
//! - A canned capability fetcher
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in integration tests:
//!
//! ```ignore
//! use test_utils::{fixtures, RecordingSurface, StaticFetcher};
//! ```

pub mod doubles;
pub mod fixtures;

pub use doubles::*;

use std::sync::Once;

static LOGGING: Once = Once::new();

/// Install a test-friendly `tracing` subscriber once per test binary.
///
/// Honours `RUST_LOG`; defaults to `debug` for the workspace crates.
pub fn init_test_logging() {
    LOGGING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("source_tree=debug,ogc_capabilities=debug,webdata_common=debug")
        });
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
