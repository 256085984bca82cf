//! In-memory cluster implementing `AdminTransport` for integration tests.
//!
//! Applies the broker-side semantics the facade relies on: incremental vs
//! full-replace config updates, sentinel offsets, group deletion rules.
//! RPCs can be made to fail (`fail`) or to stay pending until the transport
//! is closed (`hold`).

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use streamhouse_admin::*;

pub const VERSION_KEY: &str = "inter.broker.protocol.version";
pub const DATA_DIR: &str = "/var/lib/kafka/data";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone)]
pub struct PartitionState {
    pub leader: BrokerId,
    pub replicas: Vec<BrokerId>,
    pub log_start: i64,
    pub high_watermark: i64,
    /// Broker can't resolve offsets for this partition (leader unavailable)
    pub offline: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TopicState {
    pub partitions: Vec<PartitionState>,
    pub configs: BTreeMap<String, String>,
    pub internal: bool,
}

#[derive(Debug, Clone, Default)]
pub struct GroupState {
    pub members: usize,
    pub offsets: HashMap<TopicPartition, Option<OffsetAndMetadata>>,
}

pub struct ClusterState {
    pub cluster_id: String,
    pub controller: Option<BrokerId>,
    pub nodes: Vec<Node>,
    pub authorized_operations: HashSet<AclOperation>,
    pub topics: BTreeMap<String, TopicState>,
    pub broker_configs: HashMap<BrokerId, BTreeMap<String, String>>,
    pub groups: BTreeMap<String, GroupState>,
    pub replica_dirs: HashMap<TopicPartitionReplica, String>,
    pub reassignments: HashMap<TopicPartition, Option<Vec<BrokerId>>>,
    pub last_describe_options: Option<DescribeConfigsOptions>,

    failures: HashMap<&'static str, TransportError>,
    held: HashSet<&'static str>,
    pending: Vec<Box<dyn Send>>,
    calls: Vec<&'static str>,
    close_count: usize,
    closed: bool,
}

/// Cheap to clone; clones share the same cluster.
#[derive(Clone)]
pub struct InMemoryCluster {
    state: Arc<Mutex<ClusterState>>,
}

impl InMemoryCluster {
    /// Three brokers, broker 1 is controller. `version` is written to every
    /// broker's config under `inter.broker.protocol.version` when given.
    pub fn new(version: Option<&str>) -> Self {
        let nodes: Vec<Node> = (1..=3)
            .map(|id| Node::new(id, format!("kafka-{}", id), 9092))
            .collect();

        let broker_configs = nodes
            .iter()
            .map(|n| {
                let mut configs = BTreeMap::from([
                    ("log.retention.hours".to_string(), "168".to_string()),
                    ("num.partitions".to_string(), "1".to_string()),
                ]);
                if let Some(version) = version {
                    configs.insert(VERSION_KEY.to_string(), version.to_string());
                }
                (n.id, configs)
            })
            .collect();

        Self {
            state: Arc::new(Mutex::new(ClusterState {
                cluster_id: "lkc-test".to_string(),
                controller: Some(1),
                nodes,
                authorized_operations: HashSet::from([
                    AclOperation::Describe,
                    AclOperation::Alter,
                    AclOperation::DescribeConfigs,
                ]),
                topics: BTreeMap::new(),
                broker_configs,
                groups: BTreeMap::new(),
                replica_dirs: HashMap::new(),
                reassignments: HashMap::new(),
                last_describe_options: None,
                failures: HashMap::new(),
                held: HashSet::new(),
                pending: Vec::new(),
                calls: Vec::new(),
                close_count: 0,
                closed: false,
            })),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, ClusterState> {
        self.state.lock().unwrap()
    }

    /// Add a topic whose partitions hold offsets `[0, high_watermark)`.
    pub fn with_topic(self, name: &str, partitions: i32, high_watermark: i64) -> Self {
        {
            let mut state = self.state();
            let replicas: Vec<BrokerId> = state.nodes.iter().map(|n| n.id).collect();
            let topic = TopicState {
                partitions: (0..partitions)
                    .map(|p| PartitionState {
                        leader: replicas[p as usize % replicas.len()],
                        replicas: replicas.clone(),
                        log_start: 0,
                        high_watermark,
                        offline: false,
                    })
                    .collect(),
                configs: BTreeMap::new(),
                internal: name.starts_with("__"),
            };
            state.topics.insert(name.to_string(), topic);
        }
        self
    }

    pub fn with_topic_config(self, topic: &str, name: &str, value: &str) -> Self {
        self.state()
            .topics
            .get_mut(topic)
            .expect("topic must exist")
            .configs
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_group(self, group_id: &str, members: usize) -> Self {
        self.state().groups.insert(
            group_id.to_string(),
            GroupState {
                members,
                offsets: HashMap::new(),
            },
        );
        self
    }

    /// Make every call of `op` fail with `error`.
    pub fn fail(&self, op: &'static str, error: TransportError) {
        self.state().failures.insert(op, error);
    }

    /// Leave every call of `op` pending until the transport is closed.
    pub fn hold(&self, op: &'static str) {
        self.state().held.insert(op);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state().calls.clone()
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.state().calls.iter().filter(|c| **c == op).count()
    }

    pub fn close_count(&self) -> usize {
        self.state().close_count
    }

    pub fn topic_configs(&self, topic: &str) -> BTreeMap<String, String> {
        self.state().topics[topic].configs.clone()
    }

    fn respond<T, F>(&self, op: &'static str, apply: F) -> CompletionHandle<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut ClusterState) -> TransportResult<T>,
    {
        let mut state = self.state();
        state.calls.push(op);

        if state.closed {
            return CompletionHandle::ready(Err(TransportError::Closed));
        }
        if let Some(err) = state.failures.get(op) {
            return CompletionHandle::ready(Err(err.clone()));
        }
        if state.held.contains(op) {
            let (completer, handle) = CompletionHandle::pending();
            state.pending.push(Box::new(completer));
            return handle;
        }

        CompletionHandle::ready(apply(&mut *state))
    }
}

fn unknown_topic(name: &str) -> TransportError {
    TransportError::broker(
        ErrorCode::UnknownTopicOrPartition,
        format!("This server does not host this topic-partition: {}", name),
    )
}

fn partition_mut<'a>(
    state: &'a mut ClusterState,
    tp: &TopicPartition,
) -> TransportResult<&'a mut PartitionState> {
    state
        .topics
        .get_mut(&tp.topic)
        .and_then(|t| t.partitions.get_mut(tp.partition as usize))
        .ok_or_else(|| unknown_topic(&tp.to_string()))
}

fn node(state: &ClusterState, id: BrokerId) -> Node {
    state
        .nodes
        .iter()
        .find(|n| n.id == id)
        .cloned()
        .unwrap_or_else(|| Node::new(id, "unknown", 9092))
}

fn describe_entries(
    configs: &BTreeMap<String, String>,
    source: ConfigSource,
    options: DescribeConfigsOptions,
) -> Vec<ConfigEntry> {
    configs
        .iter()
        .map(|(name, value)| ConfigEntry {
            name: name.clone(),
            value: Some(value.clone()),
            source,
            is_sensitive: false,
            is_read_only: false,
            synonyms: if options.include_synonyms {
                vec![ConfigSynonym {
                    name: name.clone(),
                    value: Some(value.clone()),
                    source,
                }]
            } else {
                Vec::new()
            },
        })
        .collect()
}

fn config_target<'a>(
    state: &'a mut ClusterState,
    resource: &ConfigResource,
) -> TransportResult<&'a mut BTreeMap<String, String>> {
    match resource.resource_type {
        ConfigResourceType::Topic => state
            .topics
            .get_mut(&resource.name)
            .map(|t| &mut t.configs)
            .ok_or_else(|| unknown_topic(&resource.name)),
        ConfigResourceType::Broker => {
            let target = match resource.broker_id() {
                Some(id) => state.broker_configs.get_mut(&id),
                None => None,
            };
            target.ok_or_else(|| {
                TransportError::broker(ErrorCode::InvalidRequest, format!("no broker {}", resource))
            })
        }
    }
}

impl AdminTransport for InMemoryCluster {
    fn describe_cluster(&self) -> DescribeClusterHandles {
        DescribeClusterHandles {
            controller: self.respond("describe_cluster.controller", |s| {
                let s = &*s;
                Ok(s.controller.map(|id| node(s, id)))
            }),
            cluster_id: self.respond("describe_cluster.cluster_id", |s| Ok(s.cluster_id.clone())),
            nodes: self.respond("describe_cluster.nodes", |s| Ok(s.nodes.clone())),
            authorized_operations: self.respond("describe_cluster.authorized_operations", |s| {
                Ok(s.authorized_operations.clone())
            }),
        }
    }

    fn describe_log_dirs(
        &self,
        broker_ids: Vec<BrokerId>,
    ) -> CompletionHandle<HashMap<BrokerId, HashMap<String, LogDirInfo>>> {
        self.respond("describe_log_dirs", |s| {
            let s = &*s;
            Ok(broker_ids
                .into_iter()
                .map(|broker| {
                    let replica_infos = s
                        .topics
                        .iter()
                        .flat_map(|(name, topic)| {
                            topic.partitions.iter().enumerate().filter_map(move |(i, p)| {
                                p.replicas.contains(&broker).then(|| {
                                    (
                                        TopicPartition::new(name.clone(), i as i32),
                                        ReplicaInfo {
                                            size: p.high_watermark * 100,
                                            offset_lag: 0,
                                            is_future: false,
                                        },
                                    )
                                })
                            })
                        })
                        .collect();
                    let dirs = HashMap::from([(
                        DATA_DIR.to_string(),
                        LogDirInfo {
                            error: None,
                            replica_infos,
                        },
                    )]);
                    (broker, dirs)
                })
                .collect())
        })
    }

    fn alter_replica_log_dirs(
        &self,
        assignment: HashMap<TopicPartitionReplica, String>,
    ) -> CompletionHandle<()> {
        self.respond("alter_replica_log_dirs", |s| {
            s.replica_dirs.extend(assignment);
            Ok(())
        })
    }

    fn list_topics(&self, options: ListTopicsOptions) -> CompletionHandle<HashSet<String>> {
        self.respond("list_topics", |s| {
            Ok(s.topics
                .iter()
                .filter(|(_, t)| options.list_internal || !t.internal)
                .map(|(name, _)| name.clone())
                .collect())
        })
    }

    fn create_topics(&self, topics: Vec<NewTopic>) -> CompletionHandle<()> {
        self.respond("create_topics", |s| {
            for topic in &topics {
                if s.topics.contains_key(&topic.name) {
                    return Err(TransportError::broker(
                        ErrorCode::TopicAlreadyExists,
                        format!("Topic '{}' already exists.", topic.name),
                    ));
                }
                if topic.replication_factor as usize > s.nodes.len() {
                    return Err(TransportError::broker(
                        ErrorCode::InvalidReplicationFactor,
                        "Replication factor larger than available brokers.",
                    ));
                }
            }
            for topic in topics {
                let ids: Vec<BrokerId> = s.nodes.iter().map(|n| n.id).collect();
                let partitions = (0..topic.num_partitions)
                    .map(|p| {
                        let replicas: Vec<BrokerId> = (0..topic.replication_factor as usize)
                            .map(|r| ids[(p as usize + r) % ids.len()])
                            .collect();
                        PartitionState {
                            leader: replicas[0],
                            replicas,
                            log_start: 0,
                            high_watermark: 0,
                            offline: false,
                        }
                    })
                    .collect();
                s.topics.insert(
                    topic.name,
                    TopicState {
                        partitions,
                        configs: topic.configs.into_iter().collect(),
                        internal: false,
                    },
                );
            }
            Ok(())
        })
    }

    fn delete_topics(&self, names: Vec<String>) -> CompletionHandle<()> {
        self.respond("delete_topics", |s| {
            if let Some(missing) = names.iter().find(|n| !s.topics.contains_key(*n)) {
                return Err(unknown_topic(missing));
            }
            for name in names {
                s.topics.remove(&name);
            }
            Ok(())
        })
    }

    fn describe_topics(
        &self,
        names: Vec<String>,
    ) -> CompletionHandle<HashMap<String, TopicDescription>> {
        self.respond("describe_topics", |s| {
            let s = &*s;
            names
                .into_iter()
                .map(|name| {
                    let topic = s.topics.get(&name).ok_or_else(|| unknown_topic(&name))?;
                    let partitions = topic
                        .partitions
                        .iter()
                        .enumerate()
                        .map(|(i, p)| TopicPartitionInfo {
                            partition: i as i32,
                            leader: (!p.offline).then(|| node(s, p.leader)),
                            replicas: p.replicas.iter().map(|id| node(s, *id)).collect(),
                            isr: p.replicas.iter().map(|id| node(s, *id)).collect(),
                        })
                        .collect();
                    let description = TopicDescription {
                        name: name.clone(),
                        internal: topic.internal,
                        partitions,
                    };
                    Ok((name, description))
                })
                .collect()
        })
    }

    fn create_partitions(
        &self,
        partitions: HashMap<String, NewPartitions>,
    ) -> CompletionHandle<()> {
        self.respond("create_partitions", |s| {
            for (name, request) in &partitions {
                let topic = s.topics.get(name).ok_or_else(|| unknown_topic(name))?;
                if request.total_count as usize <= topic.partitions.len() {
                    return Err(TransportError::broker(
                        ErrorCode::InvalidPartitions,
                        format!(
                            "Topic currently has {} partitions, {} would not be an increase.",
                            topic.partitions.len(),
                            request.total_count
                        ),
                    ));
                }
            }
            for (name, request) in partitions {
                let topic = s.topics.get_mut(&name).ok_or_else(|| unknown_topic(&name))?;
                let template = topic.partitions[0].clone();
                while topic.partitions.len() < request.total_count as usize {
                    topic.partitions.push(PartitionState {
                        log_start: 0,
                        high_watermark: 0,
                        ..template.clone()
                    });
                }
            }
            Ok(())
        })
    }

    fn alter_partition_reassignments(
        &self,
        reassignments: HashMap<TopicPartition, Option<NewPartitionReassignment>>,
    ) -> CompletionHandle<()> {
        self.respond("alter_partition_reassignments", |s| {
            for tp in reassignments.keys() {
                partition_mut(s, tp)?;
            }
            for (tp, reassignment) in reassignments {
                s.reassignments
                    .insert(tp, reassignment.map(|r| r.target_replicas));
            }
            Ok(())
        })
    }

    fn list_offsets(
        &self,
        queries: HashMap<TopicPartition, OffsetSpec>,
    ) -> CompletionHandle<HashMap<TopicPartition, ListOffsetsResultInfo>> {
        self.respond("list_offsets", |s| {
            queries
                .into_iter()
                .map(|(tp, spec)| {
                    let partition = partition_mut(s, &tp)?;
                    let offset = match spec {
                        _ if partition.offline => UNKNOWN_OFFSET,
                        OffsetSpec::Earliest => partition.log_start,
                        OffsetSpec::Latest => partition.high_watermark,
                        // No timestamp index in memory: nothing is found by time.
                        OffsetSpec::ForTimestamp(_) => UNKNOWN_OFFSET,
                    };
                    let info = ListOffsetsResultInfo {
                        offset,
                        timestamp: -1,
                        leader_epoch: Some(0),
                    };
                    Ok((tp, info))
                })
                .collect()
        })
    }

    fn delete_records(
        &self,
        records: HashMap<TopicPartition, RecordsToDelete>,
    ) -> CompletionHandle<()> {
        self.respond("delete_records", |s| {
            for (tp, directive) in &records {
                let partition = partition_mut(s, tp)?;
                if directive.offset() > partition.high_watermark {
                    return Err(TransportError::broker(
                        ErrorCode::OffsetOutOfRange,
                        format!("Offset {} is beyond the high watermark of {}", directive.offset(), tp),
                    ));
                }
            }
            for (tp, directive) in records {
                let partition = partition_mut(s, &tp)?;
                partition.log_start = partition.log_start.max(directive.offset());
            }
            Ok(())
        })
    }

    fn describe_configs(
        &self,
        resources: Vec<ConfigResource>,
        options: DescribeConfigsOptions,
    ) -> CompletionHandle<HashMap<ConfigResource, Vec<ConfigEntry>>> {
        self.respond("describe_configs", |s| {
            s.last_describe_options = Some(options);
            resources
                .into_iter()
                .map(|resource| {
                    let source = match resource.resource_type {
                        ConfigResourceType::Topic => ConfigSource::DynamicTopicConfig,
                        ConfigResourceType::Broker => ConfigSource::StaticBrokerConfig,
                    };
                    let configs = config_target(s, &resource)?;
                    let entries = describe_entries(configs, source, options);
                    Ok((resource, entries))
                })
                .collect()
        })
    }

    fn alter_configs(
        &self,
        configs: HashMap<ConfigResource, Vec<ConfigEntry>>,
    ) -> CompletionHandle<()> {
        self.respond("alter_configs", |s| {
            for (resource, entries) in configs {
                let target = config_target(s, &resource)?;
                *target = entries
                    .into_iter()
                    .filter_map(|e| e.value.map(|v| (e.name, v)))
                    .collect();
            }
            Ok(())
        })
    }

    fn incremental_alter_configs(
        &self,
        configs: HashMap<ConfigResource, Vec<AlterConfigOp>>,
    ) -> CompletionHandle<()> {
        self.respond("incremental_alter_configs", |s| {
            for (resource, ops) in configs {
                let target = config_target(s, &resource)?;
                for op in ops {
                    match (op.op_type, op.entry.value) {
                        (AlterConfigOpType::Set, Some(value)) => {
                            target.insert(op.entry.name, value);
                        }
                        (AlterConfigOpType::Delete, _) => {
                            target.remove(&op.entry.name);
                        }
                        _ => {
                            return Err(TransportError::broker(
                                ErrorCode::InvalidConfig,
                                format!("unsupported op on {}", op.entry.name),
                            ))
                        }
                    }
                }
            }
            Ok(())
        })
    }

    fn list_consumer_groups(&self) -> CompletionHandle<Vec<ConsumerGroupListing>> {
        self.respond("list_consumer_groups", |s| {
            Ok(s.groups
                .iter()
                .map(|(id, g)| ConsumerGroupListing {
                    group_id: id.clone(),
                    is_simple_consumer_group: false,
                    state: Some(if g.members > 0 {
                        ConsumerGroupState::Stable
                    } else {
                        ConsumerGroupState::Empty
                    }),
                })
                .collect())
        })
    }

    fn describe_consumer_groups(
        &self,
        group_ids: Vec<String>,
    ) -> CompletionHandle<HashMap<String, ConsumerGroupDescription>> {
        self.respond("describe_consumer_groups", |s| {
            let s = &*s;
            group_ids
                .into_iter()
                .map(|id| {
                    let group = s.groups.get(&id).ok_or_else(|| {
                        TransportError::broker(ErrorCode::GroupIdNotFound, format!("Group {} not found.", id))
                    })?;
                    let members = (0..group.members)
                        .map(|m| MemberDescription {
                            member_id: format!("consumer-{}-{}", id, m),
                            group_instance_id: None,
                            client_id: format!("client-{}", m),
                            host: "/10.0.0.1".to_string(),
                            assignment: Vec::new(),
                        })
                        .collect();
                    let description = ConsumerGroupDescription {
                        group_id: id.clone(),
                        is_simple_consumer_group: false,
                        members,
                        partition_assignor: "range".to_string(),
                        state: if group.members > 0 {
                            ConsumerGroupState::Stable
                        } else {
                            ConsumerGroupState::Empty
                        },
                        coordinator: s.controller.map(|c| node(s, c)),
                    };
                    Ok((id, description))
                })
                .collect()
        })
    }

    fn delete_consumer_groups(&self, group_ids: Vec<String>) -> CompletionHandle<()> {
        self.respond("delete_consumer_groups", |s| {
            for id in &group_ids {
                match s.groups.get(id) {
                    None => {
                        return Err(TransportError::broker(
                            ErrorCode::GroupIdNotFound,
                            "The group id does not exist.",
                        ))
                    }
                    Some(group) if group.members > 0 => {
                        return Err(TransportError::broker(
                            ErrorCode::NonEmptyGroup,
                            "The group is not empty.",
                        ))
                    }
                    Some(_) => {}
                }
            }
            for id in group_ids {
                s.groups.remove(&id);
            }
            Ok(())
        })
    }

    fn list_consumer_group_offsets(
        &self,
        group_id: String,
    ) -> CompletionHandle<HashMap<TopicPartition, Option<OffsetAndMetadata>>> {
        self.respond("list_consumer_group_offsets", |s| {
            Ok(s.groups
                .get(&group_id)
                .map(|g| g.offsets.clone())
                .unwrap_or_default())
        })
    }

    fn alter_consumer_group_offsets(
        &self,
        group_id: String,
        offsets: HashMap<TopicPartition, OffsetAndMetadata>,
    ) -> CompletionHandle<()> {
        self.respond("alter_consumer_group_offsets", |s| {
            let group = s.groups.entry(group_id).or_default();
            if group.members > 0 {
                return Err(TransportError::broker(
                    ErrorCode::UnknownServerError,
                    "Commits are rejected while the group has active members.",
                ));
            }
            for (tp, committed) in offsets {
                group.offsets.insert(tp, Some(committed));
            }
            Ok(())
        })
    }

    fn close(&self) {
        let pending = {
            let mut state = self.state();
            state.close_count += 1;
            state.closed = true;
            std::mem::take(&mut state.pending)
        };
        // Dropping the completers outside the lock fails the held requests.
        drop(pending);
    }
}
