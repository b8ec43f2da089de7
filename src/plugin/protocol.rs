//! Line-delimited JSON messages exchanged with the hosting process.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Operation request, tagged by `operation`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(
    tag = "operation",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum PluginRequest {
    /// Initialise the snapshotter with orchestrator options.
    Init {
        /// Arbitrary string options.
        #[serde(default)]
        config: BTreeMap<String, String>,
    },
    /// Restore a volume from a snapshot.
    CreateVolumeFromSnapshot {
        /// Snapshot to restore.
        snapshot_id: String,
        /// Requested volume type.
        #[serde(default)]
        volume_type: String,
        /// Requested availability zone.
        #[serde(default)]
        volume_az: String,
        /// Requested IOPS.
        #[serde(default)]
        iops: Option<i64>,
    },
    /// Inspect a volume.
    GetVolumeInfo {
        /// Volume to inspect.
        volume_id: String,
        /// Availability zone of the volume.
        #[serde(default)]
        volume_az: String,
    },
    /// Check volume readiness.
    IsVolumeReady {
        /// Volume to check.
        volume_id: String,
        /// Availability zone of the volume.
        #[serde(default)]
        volume_az: String,
    },
    /// Snapshot a volume.
    CreateSnapshot {
        /// Volume to snapshot.
        volume_id: String,
        /// Availability zone of the volume.
        #[serde(default)]
        volume_az: String,
        /// Orchestrator tags.
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
    /// Delete a snapshot.
    DeleteSnapshot {
        /// Snapshot to delete.
        snapshot_id: String,
    },
    /// Read the volume ID from a persistent volume.
    GetVolumeId {
        /// Persistent volume document.
        persistent_volume: Value,
    },
    /// Write the volume ID into a persistent volume.
    SetVolumeId {
        /// Persistent volume document.
        persistent_volume: Value,
        /// Volume ID to record.
        volume_id: String,
    },
}

/// Reply to a single request, tagged by `status`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PluginResponse {
    /// The operation succeeded.
    Ok {
        /// Operation result; `null` for operations without one.
        result: Value,
    },
    /// The operation failed.
    Error {
        /// Human readable failure description.
        message: String,
    },
}

impl PluginResponse {
    /// Wraps a failure message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}
