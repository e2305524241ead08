//! Destination parsing and classification
//!
//! A destination is either a Cloud Storage object written as
//! `gs://container/key` or a local filesystem path. Anything that does not
//! carry the `gs` scheme is passed through as a local path unchanged.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use percent_encoding::percent_decode_str;
use serde::Serialize;
use url::Url;

use crate::error::{Error, Result};

/// URI scheme that selects the remote backend
pub const REMOTE_SCHEME: &str = "gs";

/// Which backend a destination is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationKind {
    /// Object storage bucket
    Remote,
    /// Local filesystem
    Local,
}

impl fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DestinationKind::Remote => f.write_str("remote"),
            DestinationKind::Local => f.write_str("local"),
        }
    }
}

/// A resolved output location
///
/// Immutable once constructed. `container` is only set for remote
/// destinations and `key` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Destination {
    raw: String,
    kind: DestinationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    container: Option<String>,
    key: String,
}

impl Destination {
    fn local(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            kind: DestinationKind::Local,
            container: None,
            key: raw.to_string(),
        }
    }

    /// The string this destination was resolved from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> DestinationKind {
        self.kind
    }

    /// Bucket name, present only for remote destinations
    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    /// Object key for remote destinations, filesystem path for local ones
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_remote(&self) -> bool {
        self.kind == DestinationKind::Remote
    }

    pub fn is_local(&self) -> bool {
        self.kind == DestinationKind::Local
    }

    /// Filesystem path for local destinations
    pub fn as_local_path(&self) -> Option<&Path> {
        match self.kind {
            DestinationKind::Local => Some(Path::new(&self.key)),
            DestinationKind::Remote => None,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Destination {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        resolve(s)
    }
}

/// Resolve a destination string into a [`Destination`]
///
/// - Strings that fail to parse as a URI are local paths.
/// - `gs://container/key` is remote; one leading `/` is stripped from the
///   key and percent-escapes are decoded.
/// - Any other scheme (including drive letters such as `C:\out.txt`) is a
///   local path taken verbatim.
pub fn resolve(raw: &str) -> Result<Destination> {
    if raw.is_empty() {
        return Err(Error::InvalidDestination(
            "Destination cannot be empty".into(),
        ));
    }

    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) => return Ok(Destination::local(raw)),
    };

    if url.scheme() != REMOTE_SCHEME {
        return Ok(Destination::local(raw));
    }

    // Url silently drops these, which would change the bucket or key
    if raw.contains(['\t', '\r', '\n']) {
        return Err(Error::InvalidDestination(format!(
            "'{}' contains a tab or line break",
            raw.escape_debug()
        )));
    }

    if url.port().is_some() || !url.username().is_empty() || url.password().is_some() {
        return Err(Error::InvalidDestination(format!(
            "'{raw}' must not carry a port or user info. Use format: {REMOTE_SCHEME}://bucket/key"
        )));
    }

    let container = match url.host_str() {
        Some(host) if !host.is_empty() && has_authority(raw) => host.to_string(),
        _ => {
            return Err(Error::InvalidDestination(format!(
                "'{raw}' is missing a bucket. Use format: {REMOTE_SCHEME}://bucket/key"
            )));
        }
    };

    let path = url.path();
    let path = path.strip_prefix('/').unwrap_or(path);
    let key = percent_decode_str(path)
        .decode_utf8()
        .map_err(|e| Error::InvalidDestination(format!("'{raw}' has an invalid key: {e}")))?
        .into_owned();

    if key.is_empty() {
        return Err(Error::InvalidDestination(format!(
            "'{raw}' is missing an object key. Use format: {REMOTE_SCHEME}://bucket/key"
        )));
    }

    Ok(Destination {
        raw: raw.to_string(),
        kind: DestinationKind::Remote,
        container: Some(container),
        key,
    })
}

/// `gs:bucket/key` parses with a scheme but no `//` authority marker
fn has_authority(raw: &str) -> bool {
    raw.get(REMOTE_SCHEME.len()..)
        .is_some_and(|rest| rest.starts_with("://"))
}
