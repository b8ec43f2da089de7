//! Snapshot lifecycle adapter.
//!
//! [`Snapshotter`] implements the orchestrator-facing [`VolumeSnapshotter`]
//! contract on top of any [`StorageGateway`]. Each operation is a short
//! chain of gateway calls that stops at the first failure; nothing is cached
//! and no state changes after construction, so one instance can serve
//! concurrent requests.

mod error;
pub mod naming;

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::config::{GatewayConfig, PluginConfig};
use crate::digitalocean::DigitalOceanGateway;
use crate::gateway::{CreateSnapshotRequest, CreateVolumeRequest, StorageGateway};

pub use error::SnapshotterError;

/// Future returned by asynchronous snapshotter operations.
pub type SnapshotterFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, SnapshotterError>> + Send + 'a>>;

/// Volume details reported to the orchestrator.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    /// Volume type; this provider reports the filesystem type.
    pub volume_type: String,
    /// Provisioned IOPS. Never reported by this provider.
    pub iops: Option<i64>,
}

/// Operations a backup orchestrator performs against a volume snapshotter.
pub trait VolumeSnapshotter {
    /// Creates a volume from `snapshot_id` and returns the new volume ID.
    fn create_volume_from_snapshot<'a>(
        &'a self,
        snapshot_id: &'a str,
        volume_type: &'a str,
        volume_az: &'a str,
        iops: Option<i64>,
    ) -> SnapshotterFuture<'a, String>;

    /// Returns the type and IOPS of `volume_id`.
    fn get_volume_info<'a>(
        &'a self,
        volume_id: &'a str,
        volume_az: &'a str,
    ) -> SnapshotterFuture<'a, VolumeInfo>;

    /// Reports whether `volume_id` is ready for use.
    fn is_volume_ready<'a>(
        &'a self,
        volume_id: &'a str,
        volume_az: &'a str,
    ) -> SnapshotterFuture<'a, bool>;

    /// Snapshots `volume_id` and returns the new snapshot ID.
    fn create_snapshot<'a>(
        &'a self,
        volume_id: &'a str,
        volume_az: &'a str,
        tags: &'a BTreeMap<String, String>,
    ) -> SnapshotterFuture<'a, String>;

    /// Deletes `snapshot_id`.
    fn delete_snapshot<'a>(&'a self, snapshot_id: &'a str) -> SnapshotterFuture<'a, ()>;

    /// Extracts the volume ID from a persistent volume descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotterError::Descriptor`] when the descriptor has no
    /// usable volume identity.
    fn get_volume_id(&self, descriptor: &Value) -> Result<String, SnapshotterError>;

    /// Returns `descriptor` with its volume ID replaced by `volume_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotterError::Descriptor`] when the descriptor has no
    /// volume-source section.
    fn set_volume_id(&self, descriptor: Value, volume_id: &str)
    -> Result<Value, SnapshotterError>;
}

/// Volume snapshotter bound to a storage gateway.
#[derive(Clone, Debug)]
pub struct Snapshotter<G> {
    gateway: G,
    config: PluginConfig,
}

impl Snapshotter<DigitalOceanGateway> {
    /// Initialises a snapshotter from the environment and the orchestrator's
    /// option map.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotterError::Config`] when credentials cannot be loaded,
    /// the transport cannot be built, or an option is invalid.
    pub fn init(config: BTreeMap<String, String>) -> Result<Self, SnapshotterError> {
        info!("initialising DigitalOcean snapshotter");
        let gateway_config = GatewayConfig::load_without_cli_args()?;
        Self::init_with(&gateway_config, config)
    }

    /// Initialises a snapshotter from explicit gateway settings.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotterError::Config`] when the transport cannot be built
    /// or an option is invalid.
    pub fn init_with(
        gateway_config: &GatewayConfig,
        config: BTreeMap<String, String>,
    ) -> Result<Self, SnapshotterError> {
        let plugin_config = PluginConfig::from_map(config)?;
        let gateway = DigitalOceanGateway::new(gateway_config)?;
        Ok(Self::with_gateway(gateway, plugin_config))
    }
}

impl<G: StorageGateway> Snapshotter<G> {
    /// Wraps an already authenticated gateway.
    #[must_use]
    pub const fn with_gateway(gateway: G, config: PluginConfig) -> Self {
        Self { gateway, config }
    }

    /// Gateway used for remote calls.
    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Options retained from initialisation.
    #[must_use]
    pub const fn config(&self) -> &PluginConfig {
        &self.config
    }

    async fn restore_from_snapshot(&self, snapshot_id: &str) -> Result<String, SnapshotterError> {
        let snapshot = self
            .gateway
            .get_snapshot(snapshot_id)
            .await
            .inspect_err(|err| error!(snapshot_id, error = %err, "failed to fetch snapshot"))?;

        let request = CreateVolumeRequest {
            name: naming::restore_volume_name(),
            snapshot_id: snapshot_id.to_owned(),
            size_gigabytes: snapshot.min_disk_size,
        };
        let volume = self
            .gateway
            .create_volume(&request)
            .await
            .inspect_err(|err| error!(snapshot_id, error = %err, "failed to create volume"))?;

        info!(snapshot_id, volume_id = %volume.id, name = %request.name, "restored volume");
        Ok(volume.id)
    }
}

impl<G: StorageGateway> VolumeSnapshotter for Snapshotter<G> {
    fn create_volume_from_snapshot<'a>(
        &'a self,
        snapshot_id: &'a str,
        volume_type: &'a str,
        volume_az: &'a str,
        iops: Option<i64>,
    ) -> SnapshotterFuture<'a, String> {
        Box::pin(async move {
            info!(snapshot_id, volume_type, volume_az, ?iops, "create volume from snapshot");
            self.restore_from_snapshot(snapshot_id).await
        })
    }

    fn get_volume_info<'a>(
        &'a self,
        volume_id: &'a str,
        volume_az: &'a str,
    ) -> SnapshotterFuture<'a, VolumeInfo> {
        Box::pin(async move {
            info!(volume_id, volume_az, "get volume info");
            let volume = self
                .gateway
                .get_volume(volume_id)
                .await
                .inspect_err(|err| error!(volume_id, error = %err, "failed to fetch volume"))?;
            Ok(VolumeInfo {
                volume_type: volume.filesystem_type,
                iops: None,
            })
        })
    }

    fn is_volume_ready<'a>(
        &'a self,
        volume_id: &'a str,
        volume_az: &'a str,
    ) -> SnapshotterFuture<'a, bool> {
        // Volumes are usable as soon as creation returns.
        Box::pin(async move {
            info!(volume_id, volume_az, "is volume ready");
            Ok(true)
        })
    }

    fn create_snapshot<'a>(
        &'a self,
        volume_id: &'a str,
        volume_az: &'a str,
        tags: &'a BTreeMap<String, String>,
    ) -> SnapshotterFuture<'a, String> {
        Box::pin(async move {
            info!(volume_id, volume_az, tags = tags.len(), "create snapshot");
            let request = CreateSnapshotRequest {
                volume_id: volume_id.to_owned(),
                name: naming::snapshot_name(volume_id),
                description: naming::snapshot_description(volume_id),
            };
            let snapshot = self
                .gateway
                .create_snapshot(&request)
                .await
                .inspect_err(|err| error!(volume_id, error = %err, "failed to create snapshot"))?;
            info!(volume_id, snapshot_id = %snapshot.id, name = %request.name, "created snapshot");
            Ok(snapshot.id)
        })
    }

    fn delete_snapshot<'a>(&'a self, snapshot_id: &'a str) -> SnapshotterFuture<'a, ()> {
        Box::pin(async move {
            info!(snapshot_id, "delete snapshot");
            self.gateway
                .delete_snapshot(snapshot_id)
                .await
                .inspect_err(|err| error!(snapshot_id, error = %err, "failed to delete snapshot"))?;
            Ok(())
        })
    }

    fn get_volume_id(&self, descriptor: &Value) -> Result<String, SnapshotterError> {
        let strategy = self.config.descriptor_strategy();
        info!(%strategy, "get volume id");
        strategy
            .volume_handle(descriptor)
            .inspect_err(|err| error!(error = %err, "failed to read volume id"))
            .map_err(SnapshotterError::from)
    }

    fn set_volume_id(
        &self,
        descriptor: Value,
        volume_id: &str,
    ) -> Result<Value, SnapshotterError> {
        let strategy = self.config.descriptor_strategy();
        info!(%strategy, volume_id, "set volume id");
        strategy
            .with_volume_handle(descriptor, volume_id)
            .inspect_err(|err| error!(volume_id, error = %err, "failed to set volume id"))
            .map_err(SnapshotterError::from)
    }
}
