//! Names and descriptions for resources created by the snapshotter.
//!
//! Every generated name carries a fresh random v4 UUID so concurrent restores
//! or snapshots of the same source never collide.

use uuid::Uuid;

/// Prefix of volumes created by a restore.
pub const RESTORE_VOLUME_PREFIX: &str = "restore-";

/// Prefix of snapshots created from a persistent volume.
pub const SNAPSHOT_NAME_PREFIX: &str = "pvs-";

/// Tool name recorded in snapshot descriptions.
pub const TOOL_NAME: &str = "velero";

/// Name for a volume restored from a snapshot: `restore-<uuid>`.
#[must_use]
pub fn restore_volume_name() -> String {
    format!("{RESTORE_VOLUME_PREFIX}{}", Uuid::new_v4())
}

/// Name for a snapshot of `volume_id`: `pvs-<volume_id>-<uuid>`.
#[must_use]
pub fn snapshot_name(volume_id: &str) -> String {
    format!("{SNAPSHOT_NAME_PREFIX}{volume_id}-{}", Uuid::new_v4())
}

/// Description stored with a snapshot of `volume_id`.
#[must_use]
pub fn snapshot_description(volume_id: &str) -> String {
    format!("{TOOL_NAME} snapshot of pv-{volume_id}")
}
