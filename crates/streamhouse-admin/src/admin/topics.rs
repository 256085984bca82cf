//! Topic and partition operations.

use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::AdminClient;
use crate::error::Result;
use crate::types::{
    ListTopicsOptions, NewPartitionReassignment, NewPartitions, NewTopic, OffsetSpec,
    RecordsToDelete, TopicDescription, TopicPartition,
};

impl AdminClient {
    /// Names of all topics. Internal topics are included only if requested.
    pub async fn list_topics(&self, include_internal: bool) -> Result<HashSet<String>> {
        let options = ListTopicsOptions {
            list_internal: include_internal,
        };
        Ok(self.transport()?.list_topics(options).await?)
    }

    /// Create a topic.
    ///
    /// # Errors
    ///
    /// Broker rejections (e.g. `TopicAlreadyExists`, `InvalidReplicationFactor`)
    /// are returned as forwarded transport errors.
    pub async fn create_topic(
        &self,
        name: impl Into<String>,
        num_partitions: i32,
        replication_factor: i16,
        configs: HashMap<String, String>,
    ) -> Result<()> {
        let topic = NewTopic {
            name: name.into(),
            num_partitions,
            replication_factor,
            configs,
        };
        debug!(
            topic = %topic.name,
            partitions = num_partitions,
            replication_factor = replication_factor,
            "Creating topic"
        );
        Ok(self.transport()?.create_topics(vec![topic]).await?)
    }

    pub async fn delete_topic(&self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        debug!(topic = %name, "Deleting topic");
        Ok(self.transport()?.delete_topics(vec![name]).await?)
    }

    pub async fn describe_topics(
        &self,
        names: Vec<String>,
    ) -> Result<HashMap<String, TopicDescription>> {
        Ok(self.transport()?.describe_topics(names).await?)
    }

    /// Increase partition counts. The batch succeeds or fails as a whole.
    pub async fn create_partitions(
        &self,
        partitions: HashMap<String, NewPartitions>,
    ) -> Result<()> {
        debug!(topics = partitions.len(), "Creating partitions");
        Ok(self.transport()?.create_partitions(partitions).await?)
    }

    /// Start (or, with `None`, cancel) partition reassignments.
    pub async fn alter_partition_reassignments(
        &self,
        reassignments: HashMap<TopicPartition, Option<NewPartitionReassignment>>,
    ) -> Result<()> {
        debug!(partitions = reassignments.len(), "Altering partition reassignments");
        Ok(self
            .transport()?
            .alter_partition_reassignments(reassignments)
            .await?)
    }

    /// Offsets of every partition of `topic`.
    ///
    /// Describes the topic first to learn its partitions, then queries them.
    pub async fn list_topic_offsets(
        &self,
        topic: &str,
        spec: OffsetSpec,
    ) -> Result<HashMap<TopicPartition, i64>> {
        let partitions = self.topic_partitions(topic).await?;
        self.list_offsets(partitions, spec).await
    }

    /// Offsets of the given partitions.
    ///
    /// Partitions whose offset the broker couldn't determine (negative
    /// sentinel) are left out of the result.
    pub async fn list_offsets(
        &self,
        partitions: impl IntoIterator<Item = TopicPartition>,
        spec: OffsetSpec,
    ) -> Result<HashMap<TopicPartition, i64>> {
        let queries: HashMap<_, _> = partitions.into_iter().map(|tp| (tp, spec)).collect();
        let requested = queries.len();

        let offsets: HashMap<_, _> = self
            .transport()?
            .list_offsets(queries)
            .await?
            .into_iter()
            .filter(|(_, info)| info.offset >= 0)
            .map(|(tp, info)| (tp, info.offset))
            .collect();

        debug!(
            requested = requested,
            resolved = offsets.len(),
            spec = ?spec,
            "Listed offsets"
        );

        Ok(offsets)
    }

    /// Delete records below the given offset of each partition.
    pub async fn delete_records(&self, offsets: HashMap<TopicPartition, i64>) -> Result<()> {
        let records = offsets
            .into_iter()
            .map(|(tp, offset)| (tp, RecordsToDelete::before_offset(offset)))
            .collect::<HashMap<_, _>>();

        debug!(partitions = records.len(), "Deleting records");
        Ok(self.transport()?.delete_records(records).await?)
    }

    async fn topic_partitions(&self, topic: &str) -> Result<HashSet<TopicPartition>> {
        let descriptions = self
            .transport()?
            .describe_topics(vec![topic.to_string()])
            .await?;

        Ok(descriptions
            .into_values()
            .next()
            .map(|description| {
                description
                    .partitions
                    .iter()
                    .map(|p| TopicPartition::new(topic, p.partition))
                    .collect()
            })
            .unwrap_or_default())
    }
}
