//! BDD step definitions for the snapshot lifecycle.

use std::collections::BTreeMap;

use dosnap::VolumeSnapshotter;
use dosnap::gateway::Operation;
use dosnap::snapshotter::naming::SNAPSHOT_NAME_PREFIX;
use dosnap::test_support::{GatewayCall, not_found, snapshot_fixture, volume_fixture};
use rstest_bdd_macros::{given, then, when};
use serde_json::json;
use tokio::runtime::Runtime;

use super::test_helpers::{Outcome, SnapshotterContext};
use crate::test_constants::{CSI_DRIVER, REGION};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
    #[error("failed to start runtime: {0}")]
    Runtime(String),
}

fn runtime() -> Result<Runtime, StepError> {
    Runtime::new().map_err(|err| StepError::Runtime(err.to_string()))
}

#[given("a snapshot \"{snapshot_id}\" with minimum disk size {size}")]
fn snapshot_exists(
    snapshotter_context: SnapshotterContext,
    snapshot_id: String,
    size: u64,
) -> SnapshotterContext {
    snapshotter_context
        .gateway
        .push_snapshot(Ok(snapshot_fixture(&snapshot_id, size)));
    snapshotter_context
}

#[given("snapshot \"{snapshot_id}\" does not exist")]
fn snapshot_missing(
    snapshotter_context: SnapshotterContext,
    snapshot_id: String,
) -> SnapshotterContext {
    snapshotter_context
        .gateway
        .push_snapshot(Err(not_found(Operation::GetSnapshot, &snapshot_id)));
    snapshotter_context
}

#[given("volume creation returns \"{volume_id}\"")]
fn volume_creation_returns(
    snapshotter_context: SnapshotterContext,
    volume_id: String,
) -> SnapshotterContext {
    snapshotter_context
        .gateway
        .push_volume(Ok(volume_fixture(&volume_id, "ext4")));
    snapshotter_context
}

#[given("snapshot creation returns \"{snapshot_id}\"")]
fn snapshot_creation_returns(
    snapshotter_context: SnapshotterContext,
    snapshot_id: String,
) -> SnapshotterContext {
    snapshotter_context
        .gateway
        .push_snapshot(Ok(snapshot_fixture(&snapshot_id, 10)));
    snapshotter_context
}

#[given("snapshot \"{snapshot_id}\" cannot be deleted because it does not exist")]
fn snapshot_not_deletable(
    snapshotter_context: SnapshotterContext,
    snapshot_id: String,
) -> SnapshotterContext {
    snapshotter_context
        .gateway
        .push_deletion(Err(not_found(Operation::DeleteSnapshot, &snapshot_id)));
    snapshotter_context
}

#[given("a persistent volume with volume handle \"{volume_id}\"")]
fn persistent_volume_with_handle(
    mut snapshotter_context: SnapshotterContext,
    volume_id: String,
) -> SnapshotterContext {
    snapshotter_context.descriptor = Some(json!({
        "apiVersion": "v1",
        "kind": "PersistentVolume",
        "metadata": {"name": "pvc-data"},
        "spec": {
            "capacity": {"storage": "10Gi"},
            "csi": {"driver": CSI_DRIVER, "volumeHandle": volume_id}
        }
    }));
    snapshotter_context
}

#[given("a persistent volume without a CSI source")]
fn persistent_volume_without_csi(mut snapshotter_context: SnapshotterContext) -> SnapshotterContext {
    snapshotter_context.descriptor = Some(json!({
        "apiVersion": "v1",
        "kind": "PersistentVolume",
        "spec": {"hostPath": {"path": "/mnt/data"}}
    }));
    snapshotter_context
}

#[when("I restore a volume from snapshot \"{snapshot_id}\"")]
fn restore_volume(
    snapshotter_context: SnapshotterContext,
    snapshot_id: String,
) -> Result<SnapshotterContext, StepError> {
    let result = runtime()?.block_on(snapshotter_context.snapshotter.create_volume_from_snapshot(
        &snapshot_id,
        "",
        REGION,
        None,
    ));
    Ok(snapshotter_context.record(result))
}

#[when("I snapshot volume \"{volume_id}\"")]
fn snapshot_volume(
    snapshotter_context: SnapshotterContext,
    volume_id: String,
) -> Result<SnapshotterContext, StepError> {
    let tags = BTreeMap::from([(String::from("backup"), String::from("nightly"))]);
    let result = runtime()?.block_on(snapshotter_context.snapshotter.create_snapshot(
        &volume_id,
        REGION,
        &tags,
    ));
    Ok(snapshotter_context.record(result))
}

#[when("I delete snapshot \"{snapshot_id}\"")]
fn delete_snapshot(
    snapshotter_context: SnapshotterContext,
    snapshot_id: String,
) -> Result<SnapshotterContext, StepError> {
    let result = runtime()?
        .block_on(snapshotter_context.snapshotter.delete_snapshot(&snapshot_id))
        .map(|()| String::new());
    Ok(snapshotter_context.record(result))
}

#[when("I set the volume handle to \"{volume_id}\"")]
fn set_volume_handle(
    mut snapshotter_context: SnapshotterContext,
    volume_id: String,
) -> Result<SnapshotterContext, StepError> {
    let descriptor = snapshotter_context
        .descriptor
        .take()
        .ok_or_else(|| StepError::Assertion(String::from("missing persistent volume")))?;
    let updated = snapshotter_context
        .snapshotter
        .set_volume_id(descriptor, &volume_id)
        .map_err(|err| StepError::Assertion(err.to_string()))?;
    snapshotter_context.descriptor = Some(updated);
    Ok(snapshotter_context)
}

#[when("I read the volume handle")]
fn read_volume_handle(snapshotter_context: SnapshotterContext) -> Result<SnapshotterContext, StepError> {
    let descriptor = snapshotter_context
        .descriptor
        .clone()
        .ok_or_else(|| StepError::Assertion(String::from("missing persistent volume")))?;
    let result = snapshotter_context.snapshotter.get_volume_id(&descriptor);
    Ok(snapshotter_context.record(result))
}

#[then("the operation returns \"{expected}\"")]
fn operation_returns(snapshotter_context: &SnapshotterContext, expected: String) -> Result<(), StepError> {
    match &snapshotter_context.outcome {
        Some(Outcome::Returned(value)) if *value == expected => Ok(()),
        Some(Outcome::Returned(value)) => Err(StepError::Assertion(format!(
            "expected {expected}, got {value}"
        ))),
        Some(Outcome::Failed(message)) => Err(StepError::Assertion(format!(
            "expected success, got failure: {message}"
        ))),
        None => Err(StepError::Assertion(String::from("missing outcome"))),
    }
}

#[then("the operation fails mentioning \"{snippet}\"")]
fn operation_fails(snapshotter_context: &SnapshotterContext, snippet: String) -> Result<(), StepError> {
    match &snapshotter_context.outcome {
        Some(Outcome::Failed(message)) if message.contains(&snippet) => Ok(()),
        Some(Outcome::Failed(message)) => Err(StepError::Assertion(format!(
            "expected failure mentioning {snippet}, got: {message}"
        ))),
        Some(Outcome::Returned(value)) => Err(StepError::Assertion(format!(
            "expected failure, got {value}"
        ))),
        None => Err(StepError::Assertion(String::from("missing outcome"))),
    }
}

#[then("the created volume requests {size} gigabytes")]
fn created_volume_size(snapshotter_context: &SnapshotterContext, size: u64) -> Result<(), StepError> {
    let requested = snapshotter_context
        .gateway
        .calls()
        .into_iter()
        .find_map(|call| match call {
            GatewayCall::CreateVolume(request) => Some(request.size_gigabytes),
            _ => None,
        })
        .ok_or_else(|| StepError::Assertion(String::from("no volume was created")))?;
    if requested == size {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected {size} gigabytes, requested {requested}"
        )))
    }
}

#[then("the gateway received {count} calls")]
fn gateway_call_count(snapshotter_context: &SnapshotterContext, count: usize) -> Result<(), StepError> {
    let calls = snapshotter_context.gateway.calls();
    if calls.len() == count {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected {count} gateway calls, got {calls:?}"
        )))
    }
}

#[then("the snapshot is named after volume \"{volume_id}\"")]
fn snapshot_named_after_volume(
    snapshotter_context: &SnapshotterContext,
    volume_id: String,
) -> Result<(), StepError> {
    let calls = snapshotter_context.gateway.calls();
    let Some(GatewayCall::CreateSnapshot(request)) = calls.first() else {
        return Err(StepError::Assertion(format!(
            "expected a create-snapshot call, got {calls:?}"
        )));
    };
    let prefix = format!("{SNAPSHOT_NAME_PREFIX}{volume_id}-");
    if request.name.starts_with(&prefix) && request.description.contains(&volume_id) {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "snapshot {} / {} does not reference {volume_id}",
            request.name, request.description
        )))
    }
}

#[then("reading the volume handle returns \"{expected}\"")]
fn read_handle_returns(
    snapshotter_context: &SnapshotterContext,
    expected: String,
) -> Result<(), StepError> {
    let descriptor = snapshotter_context
        .descriptor
        .as_ref()
        .ok_or_else(|| StepError::Assertion(String::from("missing persistent volume")))?;
    let handle = snapshotter_context
        .snapshotter
        .get_volume_id(descriptor)
        .map_err(|err| StepError::Assertion(err.to_string()))?;
    if handle == expected {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected handle {expected}, got {handle}"
        )))
    }
}
