//! gsw-core: Core library for the gswrite CLI
//!
//! This crate provides the core functionality for gsw, including:
//! - Destination parsing (`gs://bucket/key` or a local path)
//! - The `WritableResource` capability and the local file backend
//! - Backend selection through `Opener`
//! - `BufferedSink`, the line-oriented buffered writer
//! - Configuration management
//!
//! This crate is independent of any cloud SDK; the remote backend is
//! plugged in through the `RemoteConnector` trait.

pub mod config;
pub mod destination;
pub mod error;
pub mod local;
pub mod opener;
pub mod resource;
pub mod sink;

#[cfg(test)]
mod testing;

pub use config::{Config, ConfigManager, RemoteConfig, SinkConfig, TimeoutConfig};
pub use destination::{Destination, DestinationKind, REMOTE_SCHEME, resolve};
pub use error::{Error, Result};
pub use local::LocalResource;
pub use opener::{OpenObserver, Opener, TracingObserver};
pub use resource::{RemoteClient, RemoteConnector, WritableResource};
pub use sink::{BufferedSink, DEFAULT_BUFFER_SIZE, SinkState, SinkStats};
