//! Request host that exposes a snapshotter over line-delimited JSON.
//!
//! The hosting orchestrator writes one [`PluginRequest`] per line and reads
//! exactly one [`PluginResponse`] line back. Only `init` is accepted until a
//! snapshotter has been initialised.

mod protocol;

use std::collections::BTreeMap;

use serde_json::{Value, json};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::digitalocean::DigitalOceanGateway;
use crate::gateway::StorageGateway;
use crate::snapshotter::{Snapshotter, SnapshotterError, VolumeSnapshotter};

pub use protocol::{PluginRequest, PluginResponse};

/// Name under which the snapshotter is registered with the orchestrator.
pub const PLUGIN_NAME: &str = "digitalocean-blockstore";

/// Builds a snapshotter from the options passed to `init`.
pub type SnapshotterFactory<G> = Box<
    dyn Fn(BTreeMap<String, String>) -> Result<Snapshotter<G>, SnapshotterError> + Send + Sync,
>;

/// Errors raised while hosting the snapshotter.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A request other than `init` arrived first.
    #[error("snapshotter not initialised: send an init request first")]
    NotInitialised,
    /// The request line could not be decoded.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The snapshotter rejected the operation.
    #[error(transparent)]
    Snapshotter(#[from] SnapshotterError),
    /// Reading requests or writing responses failed.
    #[error("plugin transport failure: {0}")]
    Io(#[from] std::io::Error),
    /// A response could not be encoded.
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Dispatches requests to a lazily initialised snapshotter.
pub struct PluginHost<G> {
    factory: SnapshotterFactory<G>,
    snapshotter: Option<Snapshotter<G>>,
}

impl PluginHost<DigitalOceanGateway> {
    /// Host whose `init` loads credentials from the environment.
    #[must_use]
    pub fn digitalocean() -> Self {
        Self::new(Box::new(Snapshotter::init))
    }
}

impl<G: StorageGateway> PluginHost<G> {
    /// Creates a host that builds snapshotters with `factory`.
    #[must_use]
    pub fn new(factory: SnapshotterFactory<G>) -> Self {
        Self {
            factory,
            snapshotter: None,
        }
    }

    /// Returns `true` once `init` has succeeded.
    #[must_use]
    pub const fn is_initialised(&self) -> bool {
        self.snapshotter.is_some()
    }

    fn ready(&self) -> Result<&Snapshotter<G>, PluginError> {
        self.snapshotter.as_ref().ok_or(PluginError::NotInitialised)
    }

    /// Handles one decoded request. A failed `init` keeps any previously
    /// initialised snapshotter.
    pub async fn handle(&mut self, request: PluginRequest) -> PluginResponse {
        match self.run(request).await {
            Ok(result) => PluginResponse::Ok { result },
            Err(err) => {
                warn!(error = %err, "request failed");
                PluginResponse::error(err.to_string())
            }
        }
    }

    /// Decodes and handles one request line.
    pub async fn handle_line(&mut self, line: &str) -> PluginResponse {
        match serde_json::from_str::<PluginRequest>(line) {
            Ok(request) => self.handle(request).await,
            Err(err) => {
                let failure = PluginError::InvalidRequest(err.to_string());
                warn!(error = %failure, "rejected request line");
                PluginResponse::error(failure.to_string())
            }
        }
    }

    /// Serves requests from `reader` until end of input, writing one
    /// response line per non-blank request line.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Io`] when the transport fails and
    /// [`PluginError::Encode`] when a response cannot be serialised.
    pub async fn serve<R, W>(&mut self, reader: R, mut writer: W) -> Result<(), PluginError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(plugin = PLUGIN_NAME, "serving requests");
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let response = self.handle_line(&line).await;
            let mut encoded = serde_json::to_vec(&response)?;
            encoded.push(b'\n');
            writer.write_all(&encoded).await?;
            writer.flush().await?;
        }
        info!(plugin = PLUGIN_NAME, "request stream closed");
        Ok(())
    }

    async fn run(&mut self, request: PluginRequest) -> Result<Value, PluginError> {
        match request {
            PluginRequest::Init { config } => {
                let snapshotter = (self.factory)(config)?;
                self.snapshotter = Some(snapshotter);
                Ok(json!({ "name": PLUGIN_NAME }))
            }
            PluginRequest::CreateVolumeFromSnapshot {
                snapshot_id,
                volume_type,
                volume_az,
                iops,
            } => {
                let volume_id = self
                    .ready()?
                    .create_volume_from_snapshot(&snapshot_id, &volume_type, &volume_az, iops)
                    .await?;
                Ok(json!({ "volumeId": volume_id }))
            }
            PluginRequest::GetVolumeInfo {
                volume_id,
                volume_az,
            } => {
                let info = self.ready()?.get_volume_info(&volume_id, &volume_az).await?;
                Ok(serde_json::to_value(info)?)
            }
            PluginRequest::IsVolumeReady {
                volume_id,
                volume_az,
            } => {
                let ready = self.ready()?.is_volume_ready(&volume_id, &volume_az).await?;
                Ok(json!({ "ready": ready }))
            }
            PluginRequest::CreateSnapshot {
                volume_id,
                volume_az,
                tags,
            } => {
                let snapshot_id = self
                    .ready()?
                    .create_snapshot(&volume_id, &volume_az, &tags)
                    .await?;
                Ok(json!({ "snapshotId": snapshot_id }))
            }
            PluginRequest::DeleteSnapshot { snapshot_id } => {
                self.ready()?.delete_snapshot(&snapshot_id).await?;
                Ok(Value::Null)
            }
            PluginRequest::GetVolumeId { persistent_volume } => {
                let volume_id = self.ready()?.get_volume_id(&persistent_volume)?;
                Ok(json!({ "volumeId": volume_id }))
            }
            PluginRequest::SetVolumeId {
                persistent_volume,
                volume_id,
            } => {
                let updated = self.ready()?.set_volume_id(persistent_volume, &volume_id)?;
                Ok(json!({ "persistentVolume": updated }))
            }
        }
    }
}
