//! Error types for the snapshotter.

use thiserror::Error;

use crate::config::ConfigError;
use crate::descriptor::DescriptorError;
use crate::gateway::{GatewayError, Operation};

/// Errors returned by snapshotter operations.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SnapshotterError {
    /// Credentials, transport, or init options could not be set up.
    #[error("configuration error: {0}")]
    Config(String),
    /// A storage gateway call failed; `source` is the gateway error as
    /// reported.
    #[error("{operation} failed: {source}")]
    Remote {
        /// Remote primitive that failed.
        operation: Operation,
        /// Failure reported by the gateway.
        source: GatewayError,
    },
    /// The persistent volume descriptor lacks the expected structure.
    #[error("invalid persistent volume: {0}")]
    Descriptor(#[from] DescriptorError),
}

impl From<GatewayError> for SnapshotterError {
    fn from(value: GatewayError) -> Self {
        Self::Remote {
            operation: value.operation(),
            source: value,
        }
    }
}

impl From<ConfigError> for SnapshotterError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value.to_string())
    }
}
