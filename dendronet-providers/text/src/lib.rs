//! Text resource loading for dendronet networks.
//!
//! Parses whitespace-separated matrices, linkage tables and per-node arrays,
//! fetches them from local files or HTTP, and assembles a
//! [`dendronet_core::Network`] from a JSON load manifest.

mod config;
mod errors;
mod fetch;
mod load;
mod parse;

pub use crate::{
    config::{LoadConfig, ThresholdConfig},
    errors::{LoadError, LoadErrorCode, ParseError},
    fetch::{
        AutoFetcher, DEFAULT_HTTP_TIMEOUT, FsFetcher, HttpFetcher, MAX_BODY_BYTES,
        ResourceFetcher, is_remote,
    },
    load::{load_manifest, load_network},
    parse::{parse_matrix, parse_strings, parse_vector},
};

#[cfg(test)]
mod tests;
