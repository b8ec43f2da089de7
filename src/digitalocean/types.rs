//! Wire payloads for the DigitalOcean block storage endpoints.

use serde::{Deserialize, Serialize};

use crate::gateway::{Snapshot, Volume};

/// Body for `POST /v2/volumes`.
#[derive(Debug, Serialize)]
pub(super) struct VolumeCreateBody<'a> {
    pub(super) name: &'a str,
    pub(super) size_gigabytes: u64,
    pub(super) snapshot_id: &'a str,
}

/// Body for `POST /v2/volumes/{id}/snapshots`.
#[derive(Debug, Serialize)]
pub(super) struct SnapshotCreateBody<'a> {
    pub(super) name: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub(super) description: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct SnapshotEnvelope {
    pub(super) snapshot: ApiSnapshot,
}

#[derive(Debug, Deserialize)]
pub(super) struct VolumeEnvelope {
    pub(super) volume: ApiVolume,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiSnapshot {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    resource_id: String,
    #[serde(default)]
    regions: Vec<String>,
    min_disk_size: u64,
}

#[derive(Debug, Default, Deserialize)]
struct ApiRegion {
    #[serde(default)]
    slug: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiVolume {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    region: ApiRegion,
    #[serde(default)]
    size_gigabytes: u64,
    #[serde(default)]
    filesystem_type: String,
    #[serde(default)]
    description: String,
}

/// Error body returned by the API on non-success responses.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ApiErrorBody {
    #[serde(default)]
    pub(super) id: String,
    #[serde(default)]
    pub(super) message: String,
}

impl From<ApiSnapshot> for Snapshot {
    fn from(value: ApiSnapshot) -> Self {
        Self {
            id: value.id,
            name: value.name,
            resource_id: value.resource_id,
            regions: value.regions,
            min_disk_size: value.min_disk_size,
        }
    }
}

impl From<ApiVolume> for Volume {
    fn from(value: ApiVolume) -> Self {
        Self {
            id: value.id,
            name: value.name,
            region: value.region.slug,
            size_gigabytes: value.size_gigabytes,
            filesystem_type: value.filesystem_type,
            description: value.description,
        }
    }
}
