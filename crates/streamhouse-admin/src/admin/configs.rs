//! Topic and broker configuration.
//!
//! Topic updates go through the capability negotiated at construction:
//!
//! | Capability | Request | Entries not in the update |
//! |---|---|---|
//! | `IncrementalAlterConfigs` | one SET op per entry | left untouched |
//! | `AlterConfigs` (brokers <= 2.3) | full replacement | cleared by the broker |
//!
//! The two behave differently on purpose: old brokers have no way to edit a
//! single entry, so a legacy update replaces the whole topic config.
//!
//! Broker updates always use the incremental form.

use std::collections::HashMap;
use tracing::{debug, warn};

use super::AdminClient;
use crate::error::Result;
use crate::types::{
    AlterConfigOp, BrokerId, ConfigEntry, ConfigResource, DescribeConfigsOptions,
};
use crate::version::Capability;

const WITH_SYNONYMS: DescribeConfigsOptions = DescribeConfigsOptions {
    include_synonyms: true,
};

impl AdminClient {
    /// Config entries (with synonyms) of each topic, keyed by topic name.
    pub async fn get_topics_config(
        &self,
        topic_names: Vec<String>,
    ) -> Result<HashMap<String, Vec<ConfigEntry>>> {
        let resources: Vec<_> = topic_names.into_iter().map(ConfigResource::topic).collect();

        let configs = self
            .transport()?
            .describe_configs(resources, WITH_SYNONYMS)
            .await?;

        Ok(configs
            .into_iter()
            .map(|(resource, entries)| (resource.name, entries))
            .collect())
    }

    /// Config entries (with synonyms) of each broker, keyed by broker id.
    pub async fn load_brokers_config(
        &self,
        broker_ids: Vec<BrokerId>,
    ) -> Result<HashMap<BrokerId, Vec<ConfigEntry>>> {
        let resources: Vec<_> = broker_ids.into_iter().map(ConfigResource::broker).collect();

        let configs = self
            .transport()?
            .describe_configs(resources, WITH_SYNONYMS)
            .await?;

        Ok(configs
            .into_iter()
            .filter_map(|(resource, entries)| match resource.broker_id() {
                Some(id) => Some((id, entries)),
                None => {
                    warn!(resource = %resource, "Skipping config of non-broker resource");
                    None
                }
            })
            .collect())
    }

    /// Apply `configs` to a topic using the negotiated capability.
    ///
    /// Under `AlterConfigs` this is a full replace: any existing entry not in
    /// `configs` is reset by the broker.
    pub async fn update_topic_config(
        &self,
        topic: &str,
        configs: HashMap<String, String>,
    ) -> Result<()> {
        debug!(
            topic = %topic,
            entries = configs.len(),
            capability = %self.capability,
            "Updating topic config"
        );

        match self.capability {
            Capability::IncrementalAlterConfigs => {
                self.incremental_alter_config(topic, configs).await
            }
            Capability::AlterConfigs => self.alter_config(topic, configs).await,
        }
    }

    /// Set a single broker config entry.
    pub async fn update_broker_config_by_name(
        &self,
        broker_id: BrokerId,
        name: &str,
        value: &str,
    ) -> Result<()> {
        debug!(broker = broker_id, name = %name, "Updating broker config");

        let ops = HashMap::from([(
            ConfigResource::broker(broker_id),
            vec![AlterConfigOp::set(name, value)],
        )]);
        Ok(self.transport()?.incremental_alter_configs(ops).await?)
    }

    async fn incremental_alter_config(
        &self,
        topic: &str,
        configs: HashMap<String, String>,
    ) -> Result<()> {
        let ops: Vec<AlterConfigOp> = configs
            .into_iter()
            .map(|(name, value)| AlterConfigOp::set(name, value))
            .collect();

        let request = HashMap::from([(ConfigResource::topic(topic), ops)]);
        Ok(self.transport()?.incremental_alter_configs(request).await?)
    }

    async fn alter_config(&self, topic: &str, configs: HashMap<String, String>) -> Result<()> {
        let entries: Vec<ConfigEntry> = configs
            .into_iter()
            .map(|(name, value)| ConfigEntry::new(name, value))
            .collect();

        let request = HashMap::from([(ConfigResource::topic(topic), entries)]);
        Ok(self.transport()?.alter_configs(request).await?)
    }
}
