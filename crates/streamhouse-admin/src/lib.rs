//! StreamHouse Admin - Async Cluster Management for Kafka
//!
//! This crate provides an async admin facade over a Kafka cluster's management
//! API: topics, partitions, consumer groups and configuration. It hides three
//! problems from callers:
//!
//! - **Bridging**: the broker client reports results through completion handles;
//!   the facade turns each one into a future ([`completion`])
//! - **Negotiation**: brokers up to 2.3 only accept full-replace config updates;
//!   the facade detects this once at construction and picks the right protocol
//!   ([`version`])
//! - **Error translation**: transport errors are forwarded unchanged, except for
//!   consumer group deletion which reports `NotFound` / `IllegalState`
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐
//! │  HTTP / CLI  │
//! └──────┬───────┘
//!        │ async calls
//!        ▼
//! ┌──────────────┐     ┌──────────────────┐
//! │ AdminClient  │ ───→│  AdminTransport  │ ──→ brokers
//! │  (facade)    │ ←───│ (completion      │
//! └──────────────┘     │  handles)        │
//!                      └──────────────────┘
//! ```
//!
//! ## Usage Example
//!
//! ```ignore
//! use streamhouse_admin::{AdminClient, OffsetSpec};
//!
//! let admin = AdminClient::create(transport).await?;
//! println!("Cluster version {} ({})", admin.version(), admin.capability());
//!
//! let cluster = admin.describe_cluster().await?;
//! println!("{} brokers", cluster.nodes.len());
//!
//! let latest = admin.list_topic_offsets("orders", OffsetSpec::Latest).await?;
//! ```
//!
//! ## Timeouts and Retries
//!
//! The facade imposes neither. Each RPC is attempted exactly once, and a call
//! waits as long as the transport does. Wrap calls in `tokio::time::timeout`
//! where a bound is needed.

pub mod admin;
pub mod completion;
pub mod config;
pub mod error;
pub mod transport;
pub mod types;
pub mod version;

pub use admin::{AdminClient, AdminClientBuilder};
pub use completion::{bridge, Completer, CompletionFuture, CompletionHandle};
pub use config::AdminConfig;
pub use error::{AdminError, ErrorCode, Result, TransportError, TransportResult};
pub use transport::{AdminTransport, DescribeClusterHandles};
pub use types::*;
pub use version::{Capability, ClusterVersion};
