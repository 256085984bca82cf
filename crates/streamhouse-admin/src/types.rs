//! Admin Type Definitions
//!
//! Value types exchanged with the RPC transport and returned to callers.
//!
//! ## Types Overview
//!
//! ### Cluster
//! `Node`, `AclOperation` and `ClusterSnapshot` describe the brokers, the elected
//! controller and what the caller may do against the cluster.
//!
//! ### Configuration
//! `ConfigResource` addresses a topic (by name) or a broker (by numeric id).
//! `ConfigEntry` is one key/value item plus its source, read-only flag and synonyms.
//! `AlterConfigOp` is a single incremental edit.
//!
//! ### Topics and Partitions
//! `TopicPartition` is the (topic, partition) key used throughout. Offsets are
//! `i64` like on the wire; negative values are sentinels (see `UNKNOWN_OFFSET`).
//!
//! ### Consumer Groups
//! Listings, descriptions and committed offsets (`OffsetAndMetadata`).
//!
//! ## Design Decisions
//!
//! - All types are Serialize/Deserialize so the HTTP layer can render them directly
//! - Broker ids are `i32` (Kafka node ids)
//! - Config values are `Option<String>`: sensitive or unset entries carry no value
//! - Maps keyed by `TopicPartition` render their keys as `topic-partition` strings

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::error::ErrorCode;

/// Kafka node id.
pub type BrokerId = i32;

/// Offset reported by the broker when none could be determined for a partition.
pub const UNKNOWN_OFFSET: i64 = -1;

// ============================================================
// CLUSTER
// ============================================================

/// A broker in the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    pub id: BrokerId,
    pub host: String,
    pub port: u16,
    pub rack: Option<String>,
}

impl Node {
    pub fn new(id: BrokerId, host: impl Into<String>, port: u16) -> Self {
        Self {
            id,
            host: host.into(),
            port,
            rack: None,
        }
    }
}

/// Operations the authorizer may grant on a cluster resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AclOperation {
    Unknown,
    Any,
    All,
    Read,
    Write,
    Create,
    Delete,
    Alter,
    Describe,
    ClusterAction,
    DescribeConfigs,
    AlterConfigs,
    IdempotentWrite,
}

/// Consistent view of the cluster assembled from a single describe-cluster call.
///
/// Either every field comes from the same successful call or the snapshot is not
/// produced at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSnapshot {
    /// Current controller (None if no controller is elected)
    pub controller: Option<Node>,

    pub cluster_id: String,

    /// All live brokers
    pub nodes: Vec<Node>,

    /// Operations the caller is authorized to perform on the cluster
    pub authorized_operations: HashSet<AclOperation>,
}

impl ClusterSnapshot {
    pub fn node_ids(&self) -> Vec<BrokerId> {
        self.nodes.iter().map(|n| n.id).collect()
    }
}

// ============================================================
// CONFIGURATION
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigResourceType {
    Topic,
    Broker,
}

/// Addressable configuration target.
///
/// Brokers are addressed by their id rendered as a string, matching the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigResource {
    pub resource_type: ConfigResourceType,
    pub name: String,
}

impl ConfigResource {
    pub fn topic(name: impl Into<String>) -> Self {
        Self {
            resource_type: ConfigResourceType::Topic,
            name: name.into(),
        }
    }

    pub fn broker(id: BrokerId) -> Self {
        Self {
            resource_type: ConfigResourceType::Broker,
            name: id.to_string(),
        }
    }

    /// Parse the broker id back out of a broker resource name.
    pub fn broker_id(&self) -> Option<BrokerId> {
        match self.resource_type {
            ConfigResourceType::Broker => self.name.parse().ok(),
            ConfigResourceType::Topic => None,
        }
    }
}

impl fmt::Display for ConfigResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resource_type {
            ConfigResourceType::Topic => write!(f, "topic:{}", self.name),
            ConfigResourceType::Broker => write!(f, "broker:{}", self.name),
        }
    }
}

/// Where a config value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigSource {
    DynamicTopicConfig,
    DynamicBrokerLoggerConfig,
    DynamicBrokerConfig,
    DynamicDefaultBrokerConfig,
    StaticBrokerConfig,
    DefaultConfig,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSynonym {
    pub name: String,
    pub value: Option<String>,
    pub source: ConfigSource,
}

/// One configuration item of a topic or broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub name: String,
    pub value: Option<String>,
    pub source: ConfigSource,
    pub is_sensitive: bool,
    pub is_read_only: bool,
    pub synonyms: Vec<ConfigSynonym>,
}

impl ConfigEntry {
    /// Plain name/value entry as sent in alter requests.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            source: ConfigSource::Unknown,
            is_sensitive: false,
            is_read_only: false,
            synonyms: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlterConfigOpType {
    Set,
    Delete,
    Append,
    Subtract,
}

/// One edit in an incremental alter-configs request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlterConfigOp {
    pub entry: ConfigEntry,
    pub op_type: AlterConfigOpType,
}

impl AlterConfigOp {
    pub fn set(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            entry: ConfigEntry::new(name, value),
            op_type: AlterConfigOpType::Set,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescribeConfigsOptions {
    pub include_synonyms: bool,
}

// ============================================================
// TOPICS AND PARTITIONS
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TopicPartition {
    pub topic: String,
    pub partition: i32,
}

impl TopicPartition {
    pub fn new(topic: impl Into<String>, partition: i32) -> Self {
        Self {
            topic: topic.into(),
            partition,
        }
    }
}

impl fmt::Display for TopicPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.topic, self.partition)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid topic partition: {0:?}")]
pub struct ParseTopicPartitionError(String);

impl FromStr for TopicPartition {
    type Err = ParseTopicPartitionError;

    /// Parse the `topic-partition` form. Topic names may contain `-`, so the
    /// partition is taken from the last one.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (topic, partition) = s
            .rsplit_once('-')
            .ok_or_else(|| ParseTopicPartitionError(s.to_string()))?;
        let partition = partition
            .parse()
            .map_err(|_| ParseTopicPartitionError(s.to_string()))?;
        if topic.is_empty() {
            return Err(ParseTopicPartitionError(s.to_string()));
        }
        Ok(TopicPartition::new(topic, partition))
    }
}

/// Serde adapter for maps keyed by `TopicPartition`; JSON object keys must be strings.
mod partition_keyed {
    use super::TopicPartition;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::HashMap;

    pub fn serialize<V, S>(
        map: &HashMap<TopicPartition, V>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        V: Serialize,
        S: Serializer,
    {
        serializer.collect_map(map.iter().map(|(tp, value)| (tp.to_string(), value)))
    }

    pub fn deserialize<'de, V, D>(
        deserializer: D,
    ) -> Result<HashMap<TopicPartition, V>, D::Error>
    where
        V: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        HashMap::<String, V>::deserialize(deserializer)?
            .into_iter()
            .map(|(key, value)| {
                key.parse::<TopicPartition>()
                    .map(|tp| (tp, value))
                    .map_err(de::Error::custom)
            })
            .collect()
    }
}

/// A replica of a partition hosted on a specific broker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopicPartitionReplica {
    pub topic: String,
    pub partition: i32,
    pub broker_id: BrokerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicPartitionInfo {
    pub partition: i32,
    pub leader: Option<Node>,
    pub replicas: Vec<Node>,
    pub isr: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicDescription {
    pub name: String,
    pub internal: bool,
    pub partitions: Vec<TopicPartitionInfo>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTopicsOptions {
    pub list_internal: bool,
}

/// Topic creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTopic {
    pub name: String,
    pub num_partitions: i32,
    pub replication_factor: i16,
    pub configs: HashMap<String, String>,
}

/// Grow a topic to `total_count` partitions, optionally pinning replica placement
/// of the new partitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPartitions {
    pub total_count: i32,
    pub new_assignments: Option<Vec<Vec<BrokerId>>>,
}

impl NewPartitions {
    pub fn increase_to(total_count: i32) -> Self {
        Self {
            total_count,
            new_assignments: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPartitionReassignment {
    pub target_replicas: Vec<BrokerId>,
}

/// Which offset to look up for a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OffsetSpec {
    Earliest,
    Latest,
    /// First offset whose timestamp is >= the given epoch millis
    ForTimestamp(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOffsetsResultInfo {
    pub offset: i64,
    pub timestamp: i64,
    pub leader_epoch: Option<i32>,
}

/// Directive for a delete-records request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordsToDelete {
    before_offset: i64,
}

impl RecordsToDelete {
    /// Delete every record with an offset strictly below `offset`.
    pub fn before_offset(offset: i64) -> Self {
        Self {
            before_offset: offset,
        }
    }

    pub fn offset(&self) -> i64 {
        self.before_offset
    }
}

// ============================================================
// LOG DIRECTORIES
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaInfo {
    pub size: i64,
    pub offset_lag: i64,
    pub is_future: bool,
}

/// State of one log directory on a broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogDirInfo {
    /// Set when the directory is offline or unreadable
    pub error: Option<ErrorCode>,
    #[serde(with = "partition_keyed")]
    pub replica_infos: HashMap<TopicPartition, ReplicaInfo>,
}

// ============================================================
// CONSUMER GROUPS
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsumerGroupState {
    Unknown,
    PreparingRebalance,
    CompletingRebalance,
    Stable,
    Dead,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerGroupListing {
    pub group_id: String,
    pub is_simple_consumer_group: bool,
    pub state: Option<ConsumerGroupState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDescription {
    pub member_id: String,
    pub group_instance_id: Option<String>,
    pub client_id: String,
    pub host: String,
    pub assignment: Vec<TopicPartition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerGroupDescription {
    pub group_id: String,
    pub is_simple_consumer_group: bool,
    pub members: Vec<MemberDescription>,
    pub partition_assignor: String,
    pub state: ConsumerGroupState,
    pub coordinator: Option<Node>,
}

/// Committed offset of a group on one partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetAndMetadata {
    pub offset: i64,
    pub leader_epoch: Option<i32>,
    pub metadata: String,
}

impl OffsetAndMetadata {
    pub fn new(offset: i64) -> Self {
        Self {
            offset,
            leader_epoch: None,
            metadata: String::new(),
        }
    }
}
