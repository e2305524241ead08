//! In-memory resources for unit tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::destination::DestinationKind;
use crate::error::Result;
use crate::resource::{RemoteClient, RemoteConnector, WritableResource};

#[derive(Debug, Default)]
struct Recorded {
    contents: Vec<u8>,
    write_calls: usize,
    close_calls: usize,
}

/// A resource that records everything written to it
///
/// Clones share the same recording, so a test can keep one handle while the
/// sink owns another.
#[derive(Debug, Clone)]
pub(crate) struct MemoryResource {
    kind: DestinationKind,
    inner: Arc<Mutex<Recorded>>,
}

impl MemoryResource {
    pub(crate) fn new(kind: DestinationKind) -> Self {
        Self {
            kind,
            inner: Arc::default(),
        }
    }

    pub(crate) fn contents(&self) -> Vec<u8> {
        self.inner.lock().unwrap().contents.clone()
    }

    pub(crate) fn write_calls(&self) -> usize {
        self.inner.lock().unwrap().write_calls
    }

    pub(crate) fn close_calls(&self) -> usize {
        self.inner.lock().unwrap().close_calls
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.close_calls() > 0
    }

    /// True once every other handle, including the sink's, has been dropped
    pub(crate) fn is_released(&self) -> bool {
        Arc::strong_count(&self.inner) == 1
    }
}

#[async_trait]
impl WritableResource for MemoryResource {
    fn kind(&self) -> DestinationKind {
        self.kind
    }

    async fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        inner.contents.extend_from_slice(buf);
        inner.write_calls += 1;
        Ok(buf.len())
    }

    async fn close(&mut self) -> std::io::Result<()> {
        self.inner.lock().unwrap().close_calls += 1;
        Ok(())
    }
}

/// Remote connector handing out [`MemoryResource`]s keyed by `container/key`
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryRemote {
    objects: Arc<Mutex<Vec<(String, MemoryResource)>>>,
}

impl MemoryRemote {
    pub(crate) fn object(&self, container: &str, key: &str) -> Option<MemoryResource> {
        let name = format!("{container}/{key}");
        self.objects
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, r)| r.clone())
    }
}

impl RemoteClient for MemoryRemote {
    fn object_writer(&self, container: &str, key: &str) -> Box<dyn WritableResource> {
        let resource = MemoryResource::new(DestinationKind::Remote);
        self.objects
            .lock()
            .unwrap()
            .push((format!("{container}/{key}"), resource.clone()));
        Box::new(resource)
    }
}

#[async_trait]
impl RemoteConnector for MemoryRemote {
    async fn connect(&self) -> Result<Box<dyn RemoteClient>> {
        Ok(Box::new(self.clone()))
    }
}
