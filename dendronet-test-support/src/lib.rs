//! Shared test utilities used across dendronet crates.
//!
//! [`tracing::RecordingLayer`] captures spans and events so instrumentation
//! can be asserted, and [`proptest_profile::ProptestRunProfile`] reads
//! property-test tuning from the environment.

pub mod proptest_profile;
pub mod tracing;
