//! Backend selection
//!
//! [`Opener`] turns a resolved [`Destination`] into an open
//! [`WritableResource`]: remote destinations go through the configured
//! [`RemoteConnector`], local destinations are created on disk.

use crate::destination::{Destination, DestinationKind, resolve};
use crate::error::{Error, Result};
use crate::local::LocalResource;
use crate::resource::{RemoteConnector, WritableResource};
use crate::sink::{BufferedSink, DEFAULT_BUFFER_SIZE, SinkStats};

/// Notified whenever a destination has been opened
pub trait OpenObserver: Send + Sync {
    fn opened(&self, destination: &Destination);
}

/// Reports opened destinations as `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl OpenObserver for TracingObserver {
    fn opened(&self, destination: &Destination) {
        match destination.kind() {
            DestinationKind::Remote => tracing::info!(
                host = destination.container().unwrap_or_default(),
                path = destination.key(),
                "writing to google storage"
            ),
            DestinationKind::Local => tracing::info!(path = destination.key(), "writing to disk"),
        }
    }
}

/// Opens writable resources for destinations
pub struct Opener {
    remote: Box<dyn RemoteConnector>,
    observer: Box<dyn OpenObserver>,
    buffer_size: usize,
}

impl Opener {
    /// Create an opener using `remote` for `gs://` destinations
    pub fn new(remote: impl RemoteConnector + 'static) -> Self {
        Self {
            remote: Box::new(remote),
            observer: Box::new(TracingObserver),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Replace the default [`TracingObserver`]
    pub fn with_observer(mut self, observer: impl OpenObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Buffer size used by [`Opener::open_sink`]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Open the backend resource for `destination`
    ///
    /// The remote client is only constructed for remote destinations.
    pub async fn open(&self, destination: &Destination) -> Result<Box<dyn WritableResource>> {
        let resource: Box<dyn WritableResource> = match destination.kind() {
            DestinationKind::Remote => {
                let container = destination.container().ok_or_else(|| {
                    Error::InvalidDestination(format!("'{destination}' is missing a bucket"))
                })?;
                let client = self.remote.connect().await?;
                client.object_writer(container, destination.key())
            }
            DestinationKind::Local => Box::new(LocalResource::create(destination.key()).await?),
        };

        self.observer.opened(destination);
        Ok(resource)
    }

    /// Open `destination` and wrap it in a [`BufferedSink`]
    pub async fn open_sink(&self, destination: &Destination) -> Result<BufferedSink> {
        let resource = self.open(destination).await?;
        Ok(BufferedSink::with_capacity(
            resource,
            destination.key(),
            self.buffer_size,
        ))
    }

    /// Resolve `raw`, write every line and close
    ///
    /// The sink is closed whether or not the writes succeed.
    pub async fn write_lines<I>(&self, raw: &str, lines: I) -> Result<SinkStats>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let destination = resolve(raw)?;
        let mut sink = self.open_sink(&destination).await?;
        sink.scoped(async move |sink| sink.write_lines(lines).await)
            .await?;
        Ok(sink.stats())
    }
}

impl std::fmt::Debug for Opener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Opener")
            .field("buffer_size", &self.buffer_size)
            .finish_non_exhaustive()
    }
}
