//! Remote client construction
//!
//! Builds an aws-sdk-s3 client pointed at the Cloud Storage XML API using
//! HMAC credentials, and implements the gsw-core connector traits on it.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::config::{RequestChecksumCalculation, ResponseChecksumValidation};

use gsw_core::{Error, RemoteClient, RemoteConfig, RemoteConnector, Result, WritableResource};

use crate::writer::RemoteResource;

/// Connects to the remote backend on demand
#[derive(Debug, Clone)]
pub struct S3Connector {
    source: Source,
}

#[derive(Debug, Clone)]
enum Source {
    Config(RemoteConfig),
    Client(aws_sdk_s3::Client),
}

impl S3Connector {
    /// Connector that builds its client from `config` when first needed
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            source: Source::Config(config),
        }
    }

    /// Connector that hands out an already constructed client
    pub fn with_client(client: aws_sdk_s3::Client) -> Self {
        Self {
            source: Source::Client(client),
        }
    }
}

#[async_trait]
impl RemoteConnector for S3Connector {
    async fn connect(&self) -> Result<Box<dyn RemoteClient>> {
        let client = match &self.source {
            Source::Config(config) => S3Client::new(config).await?,
            Source::Client(client) => S3Client::from_client(client.clone()),
        };
        Ok(Box::new(client))
    }
}

/// S3-protocol client wrapper
#[derive(Debug, Clone)]
pub struct S3Client {
    inner: aws_sdk_s3::Client,
}

impl S3Client {
    /// Create a new client from the remote configuration
    ///
    /// Fails with `BackendUnavailable` when credentials are missing or the
    /// endpoint is not a valid URL. Retries are disabled.
    pub async fn new(config: &RemoteConfig) -> Result<Self> {
        let (access_key, secret_key) = config.credentials().ok_or_else(|| {
            Error::BackendUnavailable(
                "missing HMAC credentials; set GSW_ACCESS_KEY and GSW_SECRET_KEY or run `gsw config set`"
                    .into(),
            )
        })?;

        url::Url::parse(&config.endpoint).map_err(|e| {
            Error::BackendUnavailable(format!("invalid endpoint '{}': {e}", config.endpoint))
        })?;

        let credentials = aws_credential_types::Credentials::new(
            access_key,
            secret_key,
            None, // session token
            None, // expiry
            "gsw-static-credentials",
        );

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(aws_config::Region::new(config.region.clone()))
            .endpoint_url(&config.endpoint)
            .retry_config(aws_config::retry::RetryConfig::disabled());

        if let Some(timeout) = &config.timeout {
            loader = loader.timeout_config(
                aws_config::timeout::TimeoutConfig::builder()
                    .connect_timeout(Duration::from_millis(timeout.connect_ms))
                    .read_timeout(Duration::from_millis(timeout.read_ms))
                    .build(),
            );
        }

        let sdk_config = loader.load().await;

        // Cloud Storage only understands path-style requests and rejects
        // the SDK's default flexible checksums.
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .response_checksum_validation(ResponseChecksumValidation::WhenRequired)
            .build();

        tracing::debug!(endpoint = %config.endpoint, region = %config.region, "remote client ready");

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
        })
    }

    /// Wrap an existing aws-sdk-s3 client
    pub fn from_client(inner: aws_sdk_s3::Client) -> Self {
        Self { inner }
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }
}

impl RemoteClient for S3Client {
    fn object_writer(&self, container: &str, key: &str) -> Box<dyn WritableResource> {
        Box::new(RemoteResource::new(self.inner.clone(), container, key))
    }
}
