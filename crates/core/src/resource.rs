//! Writable resource capabilities
//!
//! These traits decouple the sink and opener from any concrete backend.
//! The local backend lives in this crate; the remote backend is provided by
//! an adapter crate and plugged in through [`RemoteConnector`].

use async_trait::async_trait;

use crate::destination::DestinationKind;
use crate::error::Result;

/// An open, exclusively owned output stream
///
/// Exposes only `write` and `close`. Implementations may buffer internally
/// but must have handed every accepted byte to their backend once `close`
/// returns `Ok`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WritableResource: Send {
    /// Backend this resource writes to, used for error context
    fn kind(&self) -> DestinationKind;

    /// Write some bytes, returning how many were accepted
    async fn write(&mut self, buf: &[u8]) -> std::io::Result<usize>;

    /// Release the resource
    async fn close(&mut self) -> std::io::Result<()>;
}

/// A connected remote storage client
pub trait RemoteClient: Send + Sync {
    /// Address an object for writing
    fn object_writer(&self, container: &str, key: &str) -> Box<dyn WritableResource>;
}

/// Constructs remote clients
///
/// `connect` fails with [`Error::BackendUnavailable`](crate::Error::BackendUnavailable)
/// when the client cannot be built, e.g. because credentials are missing.
#[async_trait]
pub trait RemoteConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn RemoteClient>>;
}
