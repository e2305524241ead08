//! Object writer
//!
//! Accumulates the object body in memory and uploads it with a single
//! `PutObject` on close, so the object only becomes visible once the write
//! has completed.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_smithy_types::error::display::DisplayErrorContext;

use gsw_core::{DestinationKind, WritableResource};

/// Content type attached to uploaded objects
const CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// A writable remote object
#[derive(Debug)]
pub struct RemoteResource {
    client: aws_sdk_s3::Client,
    bucket: String,
    key: String,
    body: Vec<u8>,
    closed: bool,
}

impl RemoteResource {
    /// Address `bucket`/`key` for writing
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key: key.into(),
            body: Vec::new(),
            closed: false,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl WritableResource for RemoteResource {
    fn kind(&self) -> DestinationKind {
        DestinationKind::Remote
    }

    async fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.closed {
            return Err(std::io::Error::other("object writer is closed"));
        }
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    async fn close(&mut self) -> std::io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let body = std::mem::take(&mut self.body);
        let size = body.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .content_type(CONTENT_TYPE)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| std::io::Error::other(DisplayErrorContext(e).to_string()))?;

        tracing::debug!(bucket = %self.bucket, key = %self.key, size, "object uploaded");
        Ok(())
    }
}
