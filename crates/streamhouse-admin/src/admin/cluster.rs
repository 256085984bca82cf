//! Cluster metadata, log directories and version lookup.

use std::collections::HashMap;
use tracing::debug;

use super::{fetch_cluster_version, AdminClient};
use crate::completion::bridge;
use crate::error::Result;
use crate::types::{BrokerId, ClusterSnapshot, LogDirInfo, TopicPartitionReplica};

impl AdminClient {
    /// Describe the cluster as one consistent snapshot.
    ///
    /// The controller, cluster id, node list and authorized operations are
    /// requested concurrently. The first failure fails the whole call; a
    /// snapshot is only assembled once all four have succeeded.
    pub async fn describe_cluster(&self) -> Result<ClusterSnapshot> {
        let handles = self.transport()?.describe_cluster();

        let (controller, cluster_id, nodes, authorized_operations) = tokio::try_join!(
            bridge(handles.controller),
            bridge(handles.cluster_id),
            bridge(handles.nodes),
            bridge(handles.authorized_operations),
        )?;

        debug!(
            cluster = %self.config.cluster_name,
            cluster_id = %cluster_id,
            nodes = nodes.len(),
            controller = ?controller.as_ref().map(|c| c.id),
            "Described cluster"
        );

        Ok(ClusterSnapshot {
            controller,
            cluster_id,
            nodes,
            authorized_operations,
        })
    }

    /// Log directories of every broker currently in the cluster.
    ///
    /// Resolves the node list first, then queries those brokers.
    pub async fn describe_log_dirs(
        &self,
    ) -> Result<HashMap<BrokerId, HashMap<String, LogDirInfo>>> {
        let broker_ids = self.describe_cluster().await?.node_ids();
        self.describe_log_dirs_for(broker_ids).await
    }

    /// Log directories of the given brokers, keyed by directory path.
    pub async fn describe_log_dirs_for(
        &self,
        broker_ids: Vec<BrokerId>,
    ) -> Result<HashMap<BrokerId, HashMap<String, LogDirInfo>>> {
        debug!(brokers = ?broker_ids, "Describing log dirs");
        Ok(self.transport()?.describe_log_dirs(broker_ids).await?)
    }

    /// Move replicas to other log directories on their brokers.
    pub async fn alter_replica_log_dirs(
        &self,
        assignment: HashMap<TopicPartitionReplica, String>,
    ) -> Result<()> {
        debug!(replicas = assignment.len(), "Altering replica log dirs");
        Ok(self.transport()?.alter_replica_log_dirs(assignment).await?)
    }

    /// Query the controller's protocol version again.
    ///
    /// The capability negotiated at construction is not changed by this call.
    pub async fn cluster_version(&self) -> Result<String> {
        Ok(fetch_cluster_version(self.transport()?, &self.config).await?)
    }
}
