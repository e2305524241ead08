//! gsw-s3: Remote backend for the gswrite CLI
//!
//! Cloud Storage exposes an S3-compatible XML API. This crate implements the
//! gsw-core `RemoteConnector` and `WritableResource` traits on top of
//! aws-sdk-s3 and is the only crate that directly depends on the AWS SDK.

pub mod client;
pub mod writer;

pub use client::{S3Client, S3Connector};
pub use writer::RemoteResource;
