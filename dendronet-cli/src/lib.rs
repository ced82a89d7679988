//! Support library for the dendronet CLI binary.
//!
//! Exposes the CLI and logging modules so tests and doctests can exercise the
//! command pipeline without spawning a subprocess.

pub mod cli;
pub mod logging;
