//! Consumer group operations.

use std::collections::HashMap;
use tracing::debug;

use super::AdminClient;
use crate::error::{AdminError, ErrorCode, Result};
use crate::types::{ConsumerGroupDescription, OffsetAndMetadata, TopicPartition};

impl AdminClient {
    /// Ids of all consumer groups.
    pub async fn list_consumer_groups(&self) -> Result<Vec<String>> {
        let listings = self.transport()?.list_consumer_groups().await?;
        Ok(listings.into_iter().map(|l| l.group_id).collect())
    }

    pub async fn describe_consumer_groups(
        &self,
        group_ids: Vec<String>,
    ) -> Result<HashMap<String, ConsumerGroupDescription>> {
        Ok(self.transport()?.describe_consumer_groups(group_ids).await?)
    }

    /// Delete consumer groups.
    ///
    /// # Errors
    ///
    /// - `NotFound`: a group id does not exist
    /// - `IllegalState`: a group still has active members
    /// - `Transport`: anything else, unchanged
    pub async fn delete_consumer_groups(&self, group_ids: Vec<String>) -> Result<()> {
        debug!(groups = ?group_ids, "Deleting consumer groups");

        self.transport()?
            .delete_consumer_groups(group_ids)
            .await
            .map_err(|e| match e.code() {
                Some(ErrorCode::GroupIdNotFound) => {
                    AdminError::NotFound("The group id does not exist".to_string())
                }
                Some(ErrorCode::NonEmptyGroup) => {
                    AdminError::IllegalState("The group is not empty".to_string())
                }
                _ => AdminError::from(e),
            })
    }

    /// Committed offsets of a group. Partitions without a commit are omitted.
    pub async fn list_consumer_group_offsets(
        &self,
        group_id: &str,
    ) -> Result<HashMap<TopicPartition, OffsetAndMetadata>> {
        let offsets = self
            .transport()?
            .list_consumer_group_offsets(group_id.to_string())
            .await?;

        Ok(offsets
            .into_iter()
            .filter_map(|(tp, committed)| committed.map(|c| (tp, c)))
            .collect())
    }

    /// Overwrite committed offsets of a group.
    pub async fn alter_consumer_group_offsets(
        &self,
        group_id: &str,
        offsets: HashMap<TopicPartition, i64>,
    ) -> Result<()> {
        let offsets = offsets
            .into_iter()
            .map(|(tp, offset)| (tp, OffsetAndMetadata::new(offset)))
            .collect::<HashMap<_, _>>();

        debug!(group = %group_id, partitions = offsets.len(), "Altering group offsets");
        Ok(self
            .transport()?
            .alter_consumer_group_offsets(group_id.to_string(), offsets)
            .await?)
    }
}
