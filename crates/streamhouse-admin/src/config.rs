//! Admin Client Configuration
//!
//! ## AdminConfig
//!
//! - **cluster_name**: Label attached to every log event of this client (default: "default")
//! - **protocol_version_key**: Broker config key holding the protocol version
//!   (default: "inter.broker.protocol.version")
//! - **fallback_version**: Version assumed when the key is absent (default: "1.0-UNKNOWN")
//!
//! ## Environment Variables
//!
//! - `STREAMHOUSE_ADMIN_CLUSTER_NAME`
//! - `STREAMHOUSE_ADMIN_PROTOCOL_VERSION_KEY`
//! - `STREAMHOUSE_ADMIN_FALLBACK_VERSION`
//!
//! ## Usage
//!
//! ```ignore
//! use streamhouse_admin::AdminConfig;
//!
//! let config = AdminConfig {
//!     cluster_name: "prod-eu".to_string(),
//!     ..Default::default()
//! };
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Cluster label for log events
    #[serde(default = "default_cluster_name")]
    pub cluster_name: String,

    /// Substring identifying the protocol version entry in broker configs
    #[serde(default = "default_protocol_version_key")]
    pub protocol_version_key: String,

    /// Version used when the controller doesn't report one
    #[serde(default = "default_fallback_version")]
    pub fallback_version: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            cluster_name: default_cluster_name(),
            protocol_version_key: default_protocol_version_key(),
            fallback_version: default_fallback_version(),
        }
    }
}

impl AdminConfig {
    /// Defaults overridden by `STREAMHOUSE_ADMIN_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(name) = std::env::var("STREAMHOUSE_ADMIN_CLUSTER_NAME") {
            config.cluster_name = name;
        }
        if let Ok(key) = std::env::var("STREAMHOUSE_ADMIN_PROTOCOL_VERSION_KEY") {
            config.protocol_version_key = key;
        }
        if let Ok(version) = std::env::var("STREAMHOUSE_ADMIN_FALLBACK_VERSION") {
            config.fallback_version = version;
        }

        config
    }
}

fn default_cluster_name() -> String {
    "default".to_string()
}

fn default_protocol_version_key() -> String {
    "inter.broker.protocol.version".to_string()
}

fn default_fallback_version() -> String {
    "1.0-UNKNOWN".to_string()
}
