//! Cluster version parsing and config-update capability selection.
//!
//! Brokers up to 2.3 only understand the full-replace `AlterConfigs` request;
//! later brokers support `IncrementalAlterConfigs`. The capability is picked
//! once from the controller's `inter.broker.protocol.version` and never
//! re-evaluated.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Highest version that still requires the full-replace update protocol.
const LEGACY_MAX: ClusterVersion = ClusterVersion { major: 2, minor: 3 };

/// How configuration updates are applied to a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// One SET op per entry; entries not mentioned are untouched.
    IncrementalAlterConfigs,
    /// Whole-config replacement; entries not mentioned are cleared by the broker.
    AlterConfigs,
}

impl Capability {
    pub fn for_version(version: ClusterVersion) -> Self {
        if version <= LEGACY_MAX {
            Capability::AlterConfigs
        } else {
            Capability::IncrementalAlterConfigs
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::IncrementalAlterConfigs => f.write_str("incremental-alter-configs"),
            Capability::AlterConfigs => f.write_str("alter-configs"),
        }
    }
}

/// `major.minor` of a broker protocol version. Orders numerically, so 2.10 > 2.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClusterVersion {
    pub major: u32,
    pub minor: u32,
}

impl ClusterVersion {
    /// Used when the version string can't be understood.
    pub const MINIMUM: ClusterVersion = ClusterVersion { major: 0, minor: 0 };

    /// Parse strings such as `2.8-IV1`, `3.5`, `0.10.2-IV0` or `1.0-UNKNOWN`.
    ///
    /// Anything after the first `-` is ignored, as are segments past the minor
    /// one. A missing minor counts as 0. Malformed input never fails: it yields
    /// [`ClusterVersion::MINIMUM`].
    pub fn parse(raw: &str) -> Self {
        match Self::try_parse(raw) {
            Some(version) => version,
            None => {
                warn!(version = %raw, "Unparseable cluster version, assuming minimum");
                Self::MINIMUM
            }
        }
    }

    fn try_parse(raw: &str) -> Option<Self> {
        let numeric = raw.trim().split('-').next()?;
        let mut parts = numeric.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = match parts.next() {
            Some(minor) => minor.parse().ok()?,
            None => 0,
        };
        Some(Self { major, minor })
    }
}

impl fmt::Display for ClusterVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
