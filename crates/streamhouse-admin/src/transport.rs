//! Admin RPC Transport
//!
//! The boundary between the admin facade and the broker network client. The
//! transport owns connections, request encoding and reconnection; the facade
//! only issues calls and composes their results.
//!
//! Every method issues one RPC and returns immediately with a
//! [`CompletionHandle`] that the transport completes exactly once. Methods
//! take owned arguments because the request outlives the call.
//!
//! ## Thread Safety
//!
//! Implementations must be Send + Sync and accept concurrent in-flight
//! requests from multiple callers.
//!
//! ## Implementations
//!
//! Production deployments back this with a Kafka admin client. Tests use an
//! in-memory cluster (see `tests/common`).

use std::collections::{HashMap, HashSet};

use crate::completion::CompletionHandle;
use crate::types::{
    AclOperation, AlterConfigOp, BrokerId, ConfigEntry, ConfigResource, ConsumerGroupDescription,
    ConsumerGroupListing, DescribeConfigsOptions, ListOffsetsResultInfo, ListTopicsOptions,
    LogDirInfo, NewPartitionReassignment, NewPartitions, NewTopic, Node, OffsetAndMetadata,
    OffsetSpec, RecordsToDelete, TopicDescription, TopicPartition, TopicPartitionReplica,
};

/// The four independent results of a describe-cluster call.
pub struct DescribeClusterHandles {
    pub controller: CompletionHandle<Option<Node>>,
    pub cluster_id: CompletionHandle<String>,
    pub nodes: CompletionHandle<Vec<Node>>,
    pub authorized_operations: CompletionHandle<HashSet<AclOperation>>,
}

/// Broker admin RPCs as completion handles.
pub trait AdminTransport: Send + Sync {
    // ============================================================
    // CLUSTER
    // ============================================================

    fn describe_cluster(&self) -> DescribeClusterHandles;

    /// Log directories per broker, keyed by directory path.
    fn describe_log_dirs(
        &self,
        broker_ids: Vec<BrokerId>,
    ) -> CompletionHandle<HashMap<BrokerId, HashMap<String, LogDirInfo>>>;

    fn alter_replica_log_dirs(
        &self,
        assignment: HashMap<TopicPartitionReplica, String>,
    ) -> CompletionHandle<()>;

    // ============================================================
    // TOPICS
    // ============================================================

    fn list_topics(&self, options: ListTopicsOptions) -> CompletionHandle<HashSet<String>>;

    fn create_topics(&self, topics: Vec<NewTopic>) -> CompletionHandle<()>;

    fn delete_topics(&self, names: Vec<String>) -> CompletionHandle<()>;

    fn describe_topics(
        &self,
        names: Vec<String>,
    ) -> CompletionHandle<HashMap<String, TopicDescription>>;

    fn create_partitions(
        &self,
        partitions: HashMap<String, NewPartitions>,
    ) -> CompletionHandle<()>;

    /// `None` cancels an in-progress reassignment for that partition.
    fn alter_partition_reassignments(
        &self,
        reassignments: HashMap<TopicPartition, Option<NewPartitionReassignment>>,
    ) -> CompletionHandle<()>;

    /// Offsets come back with `UNKNOWN_OFFSET` for partitions the broker couldn't resolve.
    fn list_offsets(
        &self,
        queries: HashMap<TopicPartition, OffsetSpec>,
    ) -> CompletionHandle<HashMap<TopicPartition, ListOffsetsResultInfo>>;

    fn delete_records(
        &self,
        records: HashMap<TopicPartition, RecordsToDelete>,
    ) -> CompletionHandle<()>;

    // ============================================================
    // CONFIGURATION
    // ============================================================

    fn describe_configs(
        &self,
        resources: Vec<ConfigResource>,
        options: DescribeConfigsOptions,
    ) -> CompletionHandle<HashMap<ConfigResource, Vec<ConfigEntry>>>;

    /// Full replacement: entries missing from the request are reset to defaults.
    fn alter_configs(
        &self,
        configs: HashMap<ConfigResource, Vec<ConfigEntry>>,
    ) -> CompletionHandle<()>;

    /// Per-entry edits: entries not mentioned are left untouched.
    fn incremental_alter_configs(
        &self,
        configs: HashMap<ConfigResource, Vec<AlterConfigOp>>,
    ) -> CompletionHandle<()>;

    // ============================================================
    // CONSUMER GROUPS
    // ============================================================

    fn list_consumer_groups(&self) -> CompletionHandle<Vec<ConsumerGroupListing>>;

    fn describe_consumer_groups(
        &self,
        group_ids: Vec<String>,
    ) -> CompletionHandle<HashMap<String, ConsumerGroupDescription>>;

    fn delete_consumer_groups(&self, group_ids: Vec<String>) -> CompletionHandle<()>;

    /// Committed offsets; partitions without a commit carry `None`.
    fn list_consumer_group_offsets(
        &self,
        group_id: String,
    ) -> CompletionHandle<HashMap<TopicPartition, Option<OffsetAndMetadata>>>;

    fn alter_consumer_group_offsets(
        &self,
        group_id: String,
        offsets: HashMap<TopicPartition, OffsetAndMetadata>,
    ) -> CompletionHandle<()>;

    // ============================================================
    // LIFECYCLE
    // ============================================================

    /// Release connections. Pending handles complete with `TransportError::Closed`.
    fn close(&self);
}
