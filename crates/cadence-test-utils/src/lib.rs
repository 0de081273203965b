//! Test utilities and recording fixtures for Cadence development.
//!
//! Provides a tracing initializer for tests plus recording doubles for
//! scheduler callbacks ([`CallLog`]) and diagnostics
//! ([`RecordingListener`]).

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{CallLog, Event, ListenerEvent, RecordingListener};

/// Install an env-filtered fmt subscriber that writes through the test
/// harness. Safe to call from every test; only the first call wins.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
