//! Resource fetchers for local files and HTTP endpoints.

use std::{path::Path, time::Duration};

use cap_std::{ambient_authority, fs::Dir};
use tracing::{debug, instrument};

use crate::errors::LoadError;

/// Default timeout applied to every HTTP request.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest HTTP response body accepted, in bytes.
pub const MAX_BODY_BYTES: u64 = 256 * 1024 * 1024;

/// Retrieves the text of a resource named in a load manifest.
///
/// Implementations must be shareable across the rayon pool that drives the
/// parallel load.
pub trait ResourceFetcher: Send + Sync {
    /// Returns the full text of `location`.
    ///
    /// # Errors
    /// Returns [`LoadError::Fetch`] when the resource cannot be read.
    fn fetch(&self, location: &str) -> Result<String, LoadError>;
}

/// Reads files relative to a base directory.
///
/// The base is opened as a capability: locations must be relative and may not
/// escape it.
#[derive(Debug)]
pub struct FsFetcher {
    dir: Dir,
}

impl FsFetcher {
    /// Opens `base` as the root for subsequent fetches.
    ///
    /// # Errors
    /// Returns [`LoadError::Fetch`] when the directory cannot be opened.
    pub fn open(base: impl AsRef<Path>) -> Result<Self, LoadError> {
        let base = base.as_ref();
        let dir = Dir::open_ambient_dir(base, ambient_authority())
            .map_err(|err| LoadError::fetch(&base.display().to_string(), &err))?;
        Ok(Self { dir })
    }
}

impl ResourceFetcher for FsFetcher {
    #[instrument(name = "providers.fetch_file", err, skip(self))]
    fn fetch(&self, location: &str) -> Result<String, LoadError> {
        let text = self
            .dir
            .read_to_string(location)
            .map_err(|err| LoadError::fetch(location, &err))?;
        debug!(bytes = text.len(), "read file");
        Ok(text)
    }
}

/// Downloads resources over HTTP(S).
#[derive(Debug)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Creates a fetcher whose requests fail after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        Self { agent }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_HTTP_TIMEOUT)
    }
}

impl ResourceFetcher for HttpFetcher {
    #[instrument(name = "providers.fetch_http", err, skip(self))]
    fn fetch(&self, location: &str) -> Result<String, LoadError> {
        let mut response = self
            .agent
            .get(location)
            .call()
            .map_err(|err| LoadError::fetch(location, &err))?;
        let text = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_string()
            .map_err(|err| LoadError::fetch(location, &err))?;
        debug!(bytes = text.len(), "downloaded resource");
        Ok(text)
    }
}

/// Sends `http://` and `https://` locations to an [`HttpFetcher`] and
/// everything else to an [`FsFetcher`].
#[derive(Debug)]
pub struct AutoFetcher {
    files: FsFetcher,
    http: HttpFetcher,
}

impl AutoFetcher {
    /// Combines the two fetchers.
    #[must_use]
    pub fn new(files: FsFetcher, http: HttpFetcher) -> Self {
        Self { files, http }
    }
}

impl ResourceFetcher for AutoFetcher {
    fn fetch(&self, location: &str) -> Result<String, LoadError> {
        if is_remote(location) {
            self.http.fetch(location)
        } else {
            self.files.fetch(location)
        }
    }
}

/// Returns whether `location` names an HTTP(S) resource.
#[must_use]
pub fn is_remote(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
