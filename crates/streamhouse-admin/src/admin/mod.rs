//! Admin Client
//!
//! [`AdminClient`] is the async facade callers use to manage a cluster. It is
//! constructed once per broker connection through a handshake that negotiates
//! the configuration-update capability, and after that holds no mutable state
//! besides the closed flag.
//!
//! ## Construction Handshake
//!
//! 1. Describe the cluster to find the controller
//! 2. Describe the controller's broker config
//! 3. Read the entry whose name contains `inter.broker.protocol.version`
//!    (or fall back to `1.0-UNKNOWN`)
//! 4. Parse the version and select [`Capability`]: <= 2.3 uses full-replace
//!    `AlterConfigs`, later versions use `IncrementalAlterConfigs`
//!
//! If any RPC fails the client is not built and the error is returned.
//!
//! ## Concurrency
//!
//! All operations take `&self` and can run concurrently; share the client via
//! `Arc<AdminClient>`. No operation retries: every RPC is attempted once.
//!
//! ## Operations
//!
//! Operations are grouped by area:
//! - `cluster`: cluster snapshot, log dirs, version
//! - `topics`: topic and partition lifecycle, offsets, records
//! - `configs`: topic and broker configuration
//! - `groups`: consumer groups and their committed offsets
//!
//! ## Examples
//!
//! ```ignore
//! use streamhouse_admin::AdminClient;
//!
//! let admin = AdminClient::builder()
//!     .transport(kafka_transport)
//!     .cluster_name("prod-eu")
//!     .build()
//!     .await?;
//!
//! let topics = admin.list_topics(false).await?;
//! admin.update_topic_config("orders", configs).await?;
//! admin.close();
//! ```

mod cluster;
mod configs;
mod groups;
mod topics;

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use crate::completion::bridge;
use crate::config::AdminConfig;
use crate::error::{AdminError, Result, TransportError, TransportResult};
use crate::transport::AdminTransport;
use crate::types::{ConfigResource, DescribeConfigsOptions};
use crate::version::{Capability, ClusterVersion};

/// Async admin facade over an [`AdminTransport`].
pub struct AdminClient {
    /// Owned transport, closed exactly once
    transport: Box<dyn AdminTransport>,

    config: AdminConfig,

    /// Protocol version reported by the controller at construction
    version: String,

    /// Config-update protocol selected at construction
    capability: Capability,

    closed: AtomicBool,
}

impl AdminClient {
    pub fn builder() -> AdminClientBuilder {
        AdminClientBuilder::new()
    }

    /// Run the handshake against `transport` with default configuration.
    pub async fn create(transport: impl AdminTransport + 'static) -> Result<Self> {
        Self::builder().transport(transport).build().await
    }

    /// Protocol version string negotiated at construction.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Close the underlying transport. Safe to call more than once; the
    /// transport is closed only on the first call.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.transport.close();
            info!(cluster = %self.config.cluster_name, "Admin client closed");
        }
    }

    /// The transport, or `Closed` once the client has been closed.
    fn transport(&self) -> Result<&dyn AdminTransport> {
        if self.is_closed() {
            return Err(TransportError::Closed.into());
        }
        Ok(self.transport.as_ref())
    }
}

impl Drop for AdminClient {
    fn drop(&mut self) {
        self.close();
    }
}

/// Read the protocol version from the controller's broker config.
async fn fetch_cluster_version(
    transport: &dyn AdminTransport,
    config: &AdminConfig,
) -> TransportResult<String> {
    let controller = match bridge(transport.describe_cluster().controller).await? {
        Some(controller) => controller,
        None => {
            warn!(
                cluster = %config.cluster_name,
                fallback = %config.fallback_version,
                "No controller elected, using fallback version"
            );
            return Ok(config.fallback_version.clone());
        }
    };

    let configs = bridge(transport.describe_configs(
        vec![ConfigResource::broker(controller.id)],
        DescribeConfigsOptions::default(),
    ))
    .await?;

    let version = configs
        .values()
        .flatten()
        .find(|entry| entry.name.contains(&config.protocol_version_key))
        .and_then(|entry| entry.value.clone());

    match version {
        Some(version) => Ok(version),
        None => {
            warn!(
                cluster = %config.cluster_name,
                controller = controller.id,
                fallback = %config.fallback_version,
                "Controller config has no protocol version, using fallback"
            );
            Ok(config.fallback_version.clone())
        }
    }
}

/// Builder for [`AdminClient`].
///
/// The transport is required; everything else has defaults.
pub struct AdminClientBuilder {
    transport: Option<Box<dyn AdminTransport>>,
    config: AdminConfig,
}

impl AdminClientBuilder {
    pub fn new() -> Self {
        Self {
            transport: None,
            config: AdminConfig::default(),
        }
    }

    /// Set the transport (required). The client takes ownership and closes it.
    pub fn transport(mut self, transport: impl AdminTransport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn config(mut self, config: AdminConfig) -> Self {
        self.config = config;
        self
    }

    pub fn cluster_name(mut self, name: impl Into<String>) -> Self {
        self.config.cluster_name = name.into();
        self
    }

    /// Run the handshake and return a ready client.
    ///
    /// # Errors
    ///
    /// - `ConfigError`: no transport was set
    /// - `Transport`: any handshake RPC failed (the transport is closed)
    pub async fn build(self) -> Result<AdminClient> {
        let transport = self
            .transport
            .ok_or_else(|| AdminError::ConfigError("transport is required".to_string()))?;
        let config = self.config;

        debug!(cluster = %config.cluster_name, "Negotiating admin capabilities");

        let version = match fetch_cluster_version(transport.as_ref(), &config).await {
            Ok(version) => version,
            Err(e) => {
                warn!(cluster = %config.cluster_name, error = %e, "Admin handshake failed");
                transport.close();
                return Err(e.into());
            }
        };

        let capability = Capability::for_version(ClusterVersion::parse(&version));

        info!(
            cluster = %config.cluster_name,
            version = %version,
            capability = %capability,
            "Admin client ready"
        );

        Ok(AdminClient {
            transport,
            config,
            version,
            capability,
            closed: AtomicBool::new(false),
        })
    }
}

impl Default for AdminClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
