//! Buffered line sink
//!
//! [`BufferedSink`] owns one [`WritableResource`] and turns a sequence of
//! byte lines into newline-terminated output. Bytes are collected in a
//! pending buffer and handed to the resource once the buffer fills, on
//! `flush`, and on `close`.
//!
//! A sink moves from `Open` to `Closed` exactly once. Closing twice returns
//! [`Error::SinkAlreadyClosed`]; writing or flushing after close returns
//! [`Error::SinkClosed`]. A sink dropped while still open releases its
//! resource without flushing.

use std::io;

use serde::Serialize;

use crate::destination::DestinationKind;
use crate::error::{Error, Result};
use crate::resource::WritableResource;

/// Default pending buffer size in bytes
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Lifecycle state of a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    Open,
    Closed,
}

/// Counters reported after a sink has been used
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SinkStats {
    /// Lines accepted by `write`
    pub lines: u64,
    /// Bytes handed to the underlying resource
    pub bytes: u64,
}

/// A failure from the resource that subsequent flushes keep reporting
#[derive(Debug)]
struct StickyError {
    kind: io::ErrorKind,
    message: String,
}

/// Line-oriented buffered writer over a single resource
pub struct BufferedSink {
    resource: Option<Box<dyn WritableResource>>,
    kind: DestinationKind,
    key: String,
    pending: Vec<u8>,
    capacity: usize,
    state: SinkState,
    failed: Option<StickyError>,
    stats: SinkStats,
}

impl BufferedSink {
    /// Wrap an open resource using [`DEFAULT_BUFFER_SIZE`]
    ///
    /// `key` names the destination in error messages.
    pub fn new(resource: Box<dyn WritableResource>, key: impl Into<String>) -> Self {
        Self::with_capacity(resource, key, DEFAULT_BUFFER_SIZE)
    }

    /// Wrap an open resource with a custom buffer size (at least one byte)
    pub fn with_capacity(
        resource: Box<dyn WritableResource>,
        key: impl Into<String>,
        capacity: usize,
    ) -> Self {
        let capacity = capacity.max(1);
        Self {
            kind: resource.kind(),
            resource: Some(resource),
            key: key.into(),
            pending: Vec::with_capacity(capacity),
            capacity,
            state: SinkState::Open,
            failed: None,
            stats: SinkStats::default(),
        }
    }

    pub fn state(&self) -> SinkState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == SinkState::Closed
    }

    pub fn kind(&self) -> DestinationKind {
        self.kind
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Bytes accepted but not yet handed to the resource
    pub fn buffered(&self) -> usize {
        self.pending.len()
    }

    pub fn stats(&self) -> SinkStats {
        self.stats
    }

    /// Append one line
    ///
    /// Trailing whitespace is removed and a single `\n` appended. The
    /// pending buffer is forwarded to the resource once it reaches capacity.
    pub async fn write(&mut self, line: impl AsRef<[u8]>) -> Result<()> {
        self.ensure_open()?;
        self.check_failed()?;

        self.pending.extend_from_slice(trim_line_end(line.as_ref()));
        self.pending.push(b'\n');
        self.stats.lines += 1;

        if self.pending.len() >= self.capacity {
            self.drain().await?;
        }
        Ok(())
    }

    /// Append every line in order
    pub async fn write_lines<I>(&mut self, lines: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        for line in lines {
            self.write(line).await?;
        }
        Ok(())
    }

    /// Forward all pending bytes to the resource
    ///
    /// Flushing with nothing pending is a successful no-op.
    pub async fn flush(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.check_failed()?;
        self.drain().await
    }

    /// Flush, then release the resource
    ///
    /// The sink is `Closed` afterwards even if the flush failed, and the
    /// resource is released in either case. The flush error takes
    /// precedence over a release error.
    pub async fn close(&mut self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::SinkAlreadyClosed);
        }

        let flushed = match self.check_failed() {
            Ok(()) => self.drain().await,
            Err(e) => Err(e),
        };
        self.state = SinkState::Closed;

        let released = match self.resource.take() {
            Some(mut resource) => resource.close().await.map_err(|e| self.io_error(e)),
            None => Ok(()),
        };

        tracing::debug!(
            kind = %self.kind,
            key = %self.key,
            lines = self.stats.lines,
            bytes = self.stats.bytes,
            "sink closed"
        );

        flushed.and(released)
    }

    /// Run `body` against this sink, then close it
    ///
    /// The sink is closed on every exit path of `body`. If `body` fails the
    /// body's error is returned and a close failure is only logged. If
    /// `body` closes the sink itself, no second close is attempted.
    pub async fn scoped<T, F>(&mut self, body: F) -> Result<T>
    where
        F: AsyncFnOnce(&mut BufferedSink) -> Result<T>,
    {
        let outcome = body(self).await;
        let closed = if self.is_closed() {
            Ok(())
        } else {
            self.close().await
        };

        match (outcome, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                tracing::warn!(key = %self.key, error = %close_err, "close failed after write error");
                Err(e)
            }
        }
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            SinkState::Open => Ok(()),
            SinkState::Closed => Err(Error::SinkClosed),
        }
    }

    fn check_failed(&self) -> Result<()> {
        match &self.failed {
            Some(failed) => Err(self.io_error(io::Error::new(failed.kind, failed.message.clone()))),
            None => Ok(()),
        }
    }

    async fn drain(&mut self) -> Result<()> {
        let Some(resource) = self.resource.as_mut() else {
            return Err(Error::SinkClosed);
        };

        let outcome = loop {
            if self.pending.is_empty() {
                break Ok(());
            }
            match resource.write(&self.pending).await {
                Ok(0) => break Err(io::Error::from(io::ErrorKind::WriteZero)),
                Ok(n) => {
                    let n = n.min(self.pending.len());
                    self.pending.drain(..n);
                    self.stats.bytes += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => break Err(e),
            }
        };

        outcome.map_err(|e| {
            self.failed = Some(StickyError {
                kind: e.kind(),
                message: e.to_string(),
            });
            self.io_error(e)
        })
    }

    fn io_error(&self, source: io::Error) -> Error {
        Error::Io {
            kind: self.kind,
            key: self.key.clone(),
            source,
        }
    }
}

impl Drop for BufferedSink {
    fn drop(&mut self) {
        if self.state == SinkState::Open {
            tracing::warn!(
                kind = %self.kind,
                key = %self.key,
                pending = self.pending.len(),
                "sink dropped without close, releasing resource"
            );
        }
    }
}

impl std::fmt::Debug for BufferedSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferedSink")
            .field("kind", &self.kind)
            .field("key", &self.key)
            .field("state", &self.state)
            .field("buffered", &self.pending.len())
            .field("capacity", &self.capacity)
            .field("stats", &self.stats)
            .finish()
    }
}

/// Strip trailing whitespace, Unicode-aware when the line is valid UTF-8
fn trim_line_end(line: &[u8]) -> &[u8] {
    match std::str::from_utf8(line) {
        Ok(s) => s.trim_end().as_bytes(),
        Err(_) => line.trim_ascii_end(),
    }
}
