//! Remote storage gateway abstraction for block volumes and snapshots.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

/// Remote primitive invoked through a [`StorageGateway`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operation {
    /// Fetch a snapshot by identifier.
    GetSnapshot,
    /// Create a volume, optionally sourced from a snapshot.
    CreateVolume,
    /// Fetch a volume by identifier.
    GetVolume,
    /// Snapshot an existing volume.
    CreateSnapshot,
    /// Delete a snapshot by identifier.
    DeleteSnapshot,
}

impl Operation {
    /// Stable name used in error messages and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetSnapshot => "get-snapshot",
            Self::CreateVolume => "create-volume",
            Self::GetVolume => "get-volume",
            Self::CreateSnapshot => "create-snapshot",
            Self::DeleteSnapshot => "delete-snapshot",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time snapshot of a block volume.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Snapshot {
    /// Provider identifier.
    pub id: String,
    /// Human readable name.
    pub name: String,
    /// Identifier of the volume the snapshot was taken from.
    pub resource_id: String,
    /// Regions in which the snapshot is available.
    pub regions: Vec<String>,
    /// Smallest volume size, in gigabytes, that can be restored from it.
    pub min_disk_size: u64,
}

/// Block storage volume.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Volume {
    /// Provider identifier.
    pub id: String,
    /// Human readable name.
    pub name: String,
    /// Region slug hosting the volume.
    pub region: String,
    /// Provisioned size in gigabytes.
    pub size_gigabytes: u64,
    /// Filesystem the provider formatted the volume with, if any.
    pub filesystem_type: String,
    /// Free-form description.
    pub description: String,
}

/// Parameters for creating a volume from a snapshot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CreateVolumeRequest {
    /// Name of the new volume.
    pub name: String,
    /// Snapshot the volume is restored from.
    pub snapshot_id: String,
    /// Requested size in gigabytes.
    pub size_gigabytes: u64,
}

/// Parameters for snapshotting a volume.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CreateSnapshotRequest {
    /// Volume to snapshot.
    pub volume_id: String,
    /// Name of the new snapshot.
    pub name: String,
    /// Free-form description stored alongside the snapshot.
    pub description: String,
}

/// Errors surfaced by gateway calls. Every variant carries the failed
/// [`Operation`]; callers add it to messages.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum GatewayError {
    /// The provider reported that the addressed resource does not exist.
    #[error("resource {id} not found: {message}")]
    NotFound {
        /// Operation that failed.
        operation: Operation,
        /// Identifier that was looked up.
        id: String,
        /// Message returned by the provider.
        message: String,
    },
    /// The provider rejected the request.
    #[error("provider returned status {status} ({code}): {message}")]
    Api {
        /// Operation that failed.
        operation: Operation,
        /// HTTP status code.
        status: u16,
        /// Provider error identifier, when one was returned.
        code: String,
        /// Message returned by the provider.
        message: String,
    },
    /// The request could not be delivered or the response not received.
    #[error("transport failure: {message}")]
    Transport {
        /// Operation that failed.
        operation: Operation,
        /// Underlying transport error.
        message: String,
    },
    /// A success response could not be decoded.
    #[error("unreadable response: {message}")]
    Decode {
        /// Operation that failed.
        operation: Operation,
        /// Decoder error.
        message: String,
    },
}

impl GatewayError {
    /// Operation whose call failed.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::NotFound { operation, .. }
            | Self::Api { operation, .. }
            | Self::Transport { operation, .. }
            | Self::Decode { operation, .. } => *operation,
        }
    }

    /// Returns `true` when the provider reported a missing resource.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Future returned by gateway operations.
pub type GatewayFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, GatewayError>> + Send + 'a>>;

/// Storage primitives the snapshotter needs from a provider. Each call is a
/// single round trip with no retry.
pub trait StorageGateway: Send + Sync {
    /// Fetches a snapshot.
    fn get_snapshot<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Snapshot>;

    /// Creates a volume restored from a snapshot.
    fn create_volume<'a>(&'a self, request: &'a CreateVolumeRequest)
    -> GatewayFuture<'a, Volume>;

    /// Fetches a volume.
    fn get_volume<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Volume>;

    /// Snapshots a volume.
    fn create_snapshot<'a>(
        &'a self,
        request: &'a CreateSnapshotRequest,
    ) -> GatewayFuture<'a, Snapshot>;

    /// Deletes a snapshot.
    fn delete_snapshot<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, ()>;
}
