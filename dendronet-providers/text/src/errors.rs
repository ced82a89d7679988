//! Error types for text parsing and network loading.

use std::fmt;

use dendronet_core::{NetworkError, NetworkErrorCode};
use thiserror::Error;

/// Failure to decode a whitespace text resource.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// A token could not be read as a number.
    #[error("line {line}, column {column}: `{token}` is not a number")]
    InvalidNumber {
        /// One-based line number.
        line: usize,
        /// One-based token position within the line.
        column: usize,
        /// The offending token.
        token: String,
    },
}

/// Failure to load a network from a manifest.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    /// A resource could not be retrieved.
    #[error("failed to fetch `{location}`: {message}")]
    Fetch {
        /// Path or URL of the resource.
        location: String,
        /// Description of the underlying failure.
        message: String,
    },
    /// A resource was retrieved but its contents were malformed.
    #[error("failed to parse `{location}`: {source}")]
    Parse {
        /// Path or URL of the resource.
        location: String,
        /// Parser failure.
        #[source]
        source: ParseError,
    },
    /// The manifest was not valid JSON or did not match the schema.
    #[error("invalid load manifest: {0}")]
    Manifest(#[from] serde_json::Error),
    /// The loaded data did not form a valid network.
    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// Stable codes describing [`LoadError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum LoadErrorCode {
    /// A resource could not be retrieved.
    FetchFailure,
    /// A resource had malformed contents.
    ParseFailure,
    /// The manifest was malformed.
    InvalidManifest,
    /// The network rejected the loaded data.
    Network(NetworkErrorCode),
}

impl LoadErrorCode {
    /// Return the stable machine-readable representation of this error code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FetchFailure => "LOAD_FETCH_FAILURE",
            Self::ParseFailure => "LOAD_PARSE_FAILURE",
            Self::InvalidManifest => "LOAD_INVALID_MANIFEST",
            Self::Network(code) => code.as_str(),
        }
    }
}

impl fmt::Display for LoadErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LoadError {
    /// Retrieve the stable [`LoadErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> LoadErrorCode {
        match self {
            Self::Fetch { .. } => LoadErrorCode::FetchFailure,
            Self::Parse { .. } => LoadErrorCode::ParseFailure,
            Self::Manifest(_) => LoadErrorCode::InvalidManifest,
            Self::Network(error) => LoadErrorCode::Network(error.code()),
        }
    }

    pub(crate) fn fetch(location: &str, message: &impl fmt::Display) -> Self {
        Self::Fetch {
            location: location.to_owned(),
            message: message.to_string(),
        }
    }
}
