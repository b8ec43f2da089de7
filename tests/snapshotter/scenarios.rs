//! BDD scenarios for the snapshot lifecycle.

use rstest_bdd_macros::scenario;

use super::test_helpers::{SnapshotterContext, snapshotter_context};

#[scenario(
    path = "tests/features/snapshotter.feature",
    name = "Restore a volume sized to its snapshot"
)]
fn scenario_restore_volume(snapshotter_context: SnapshotterContext) {
    let _ = snapshotter_context;
}

#[scenario(
    path = "tests/features/snapshotter.feature",
    name = "Stop a restore when the snapshot is missing"
)]
fn scenario_restore_missing_snapshot(snapshotter_context: SnapshotterContext) {
    let _ = snapshotter_context;
}

#[scenario(
    path = "tests/features/snapshotter.feature",
    name = "Snapshot a volume with a generated name"
)]
fn scenario_create_snapshot(snapshotter_context: SnapshotterContext) {
    let _ = snapshotter_context;
}

#[scenario(
    path = "tests/features/snapshotter.feature",
    name = "Surface a missing snapshot on delete"
)]
fn scenario_delete_missing_snapshot(snapshotter_context: SnapshotterContext) {
    let _ = snapshotter_context;
}

#[scenario(
    path = "tests/features/snapshotter.feature",
    name = "Record a restored volume in a persistent volume"
)]
fn scenario_set_volume_handle(snapshotter_context: SnapshotterContext) {
    let _ = snapshotter_context;
}

#[scenario(
    path = "tests/features/snapshotter.feature",
    name = "Reject a persistent volume without a CSI source"
)]
fn scenario_missing_csi_source(snapshotter_context: SnapshotterContext) {
    let _ = snapshotter_context;
}
