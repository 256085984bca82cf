//! Admin Error Types
//!
//! Two layers of errors flow through the admin client:
//!
//! - **`TransportError`**: anything the underlying RPC transport reports (timeouts,
//!   lost connections, protocol-level rejections such as `TopicAlreadyExists`).
//!   These are forwarded to the caller unchanged.
//! - **`AdminError`**: what the facade returns. It wraps `TransportError` transparently
//!   and adds the two domain-level kinds raised by consumer group deletion
//!   (`NotFound`, `IllegalState`).
//!
//! ## Usage
//!
//! ```ignore
//! use streamhouse_admin::{AdminError, ErrorCode};
//!
//! match admin.delete_consumer_groups(vec!["analytics".to_string()]).await {
//!     Ok(()) => println!("Deleted"),
//!     Err(AdminError::NotFound(msg)) => eprintln!("404: {}", msg),
//!     Err(AdminError::IllegalState(msg)) => eprintln!("409: {}", msg),
//!     Err(e) if e.code() == Some(ErrorCode::GroupAuthorizationFailed) => eprintln!("403"),
//!     Err(e) => return Err(e),
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Result type for admin operations
pub type Result<T> = std::result::Result<T, AdminError>;

/// Result type for a single transport RPC
pub type TransportResult<T> = std::result::Result<T, TransportError>;

/// Kafka protocol error codes reported by admin RPCs
/// See: https://kafka.apache.org/protocol#protocol_error_codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i16)]
pub enum ErrorCode {
    UnknownServerError = -1,
    OffsetOutOfRange = 1,
    UnknownTopicOrPartition = 3,
    LeaderNotAvailable = 5,
    NotLeaderOrFollower = 6,
    RequestTimedOut = 7,
    BrokerNotAvailable = 8,
    NetworkException = 13,
    CoordinatorLoadInProgress = 14,
    CoordinatorNotAvailable = 15,
    NotCoordinator = 16,
    InvalidTopicException = 17,
    InvalidGroupId = 24,
    TopicAuthorizationFailed = 29,
    GroupAuthorizationFailed = 30,
    ClusterAuthorizationFailed = 31,
    UnsupportedVersion = 35,
    TopicAlreadyExists = 36,
    InvalidPartitions = 37,
    InvalidReplicationFactor = 38,
    InvalidReplicaAssignment = 39,
    InvalidConfig = 40,
    NotController = 41,
    InvalidRequest = 42,
    PolicyViolation = 44,
    KafkaStorageError = 56,
    LogDirNotFound = 57,
    ReassignmentInProgress = 60,
    NonEmptyGroup = 68,
    GroupIdNotFound = 69,
    TopicDeletionDisabled = 73,
    NoReassignmentInProgress = 85,
    GroupSubscribedToTopic = 86,
}

impl ErrorCode {
    pub fn as_i16(self) -> i16 {
        self as i16
    }

    /// Map a wire error code back to the enum. Codes this client doesn't
    /// distinguish collapse into `UnknownServerError`.
    pub fn from_i16(code: i16) -> Self {
        match code {
            1 => ErrorCode::OffsetOutOfRange,
            3 => ErrorCode::UnknownTopicOrPartition,
            5 => ErrorCode::LeaderNotAvailable,
            6 => ErrorCode::NotLeaderOrFollower,
            7 => ErrorCode::RequestTimedOut,
            8 => ErrorCode::BrokerNotAvailable,
            13 => ErrorCode::NetworkException,
            14 => ErrorCode::CoordinatorLoadInProgress,
            15 => ErrorCode::CoordinatorNotAvailable,
            16 => ErrorCode::NotCoordinator,
            17 => ErrorCode::InvalidTopicException,
            24 => ErrorCode::InvalidGroupId,
            29 => ErrorCode::TopicAuthorizationFailed,
            30 => ErrorCode::GroupAuthorizationFailed,
            31 => ErrorCode::ClusterAuthorizationFailed,
            35 => ErrorCode::UnsupportedVersion,
            36 => ErrorCode::TopicAlreadyExists,
            37 => ErrorCode::InvalidPartitions,
            38 => ErrorCode::InvalidReplicationFactor,
            39 => ErrorCode::InvalidReplicaAssignment,
            40 => ErrorCode::InvalidConfig,
            41 => ErrorCode::NotController,
            42 => ErrorCode::InvalidRequest,
            44 => ErrorCode::PolicyViolation,
            56 => ErrorCode::KafkaStorageError,
            57 => ErrorCode::LogDirNotFound,
            60 => ErrorCode::ReassignmentInProgress,
            68 => ErrorCode::NonEmptyGroup,
            69 => ErrorCode::GroupIdNotFound,
            73 => ErrorCode::TopicDeletionDisabled,
            85 => ErrorCode::NoReassignmentInProgress,
            86 => ErrorCode::GroupSubscribedToTopic,
            _ => ErrorCode::UnknownServerError,
        }
    }
}

/// Failure surfaced by the RPC transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The broker rejected the request with a protocol error code.
    #[error("Broker error {code:?}: {message}")]
    Broker { code: ErrorCode, message: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection error: {0}")]
    Connection(String),

    /// The transport was closed (or abandoned the request) before it completed.
    #[error("Transport closed")]
    Closed,
}

impl TransportError {
    /// Shorthand for a broker-side rejection.
    pub fn broker(code: ErrorCode, message: impl Into<String>) -> Self {
        TransportError::Broker {
            code,
            message: message.into(),
        }
    }

    /// The protocol error code, if the broker reported one.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            TransportError::Broker { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Admin client errors
#[derive(Debug, Error)]
pub enum AdminError {
    /// Forwarded unchanged from the transport.
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// The client was built without a required setting.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AdminError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AdminError::NotFound(_))
    }

    pub fn is_illegal_state(&self) -> bool {
        matches!(self, AdminError::IllegalState(_))
    }

    /// The broker error code behind a forwarded transport error.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            AdminError::Transport(e) => e.code(),
            _ => None,
        }
    }
}
