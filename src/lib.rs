//! Core library for the `dosnap` volume snapshotter.
//!
//! The crate adapts DigitalOcean block storage to the volume snapshotter
//! contract used by backup orchestrators: restoring volumes from snapshots,
//! snapshotting volumes, deleting snapshots, and reading or writing the
//! provider volume handle inside persistent volume descriptors. A small
//! request host exposes the snapshotter over line-delimited JSON.

pub mod config;
pub mod descriptor;
pub mod digitalocean;
pub mod gateway;
pub mod plugin;
pub mod snapshotter;
pub mod test_support;

pub use config::{ConfigError, GatewayConfig, PluginConfig};
pub use descriptor::{DescriptorError, DescriptorStrategy};
pub use digitalocean::DigitalOceanGateway;
pub use gateway::{GatewayError, Operation, Snapshot, StorageGateway, Volume};
pub use plugin::{PLUGIN_NAME, PluginError, PluginHost, PluginRequest, PluginResponse};
pub use snapshotter::{Snapshotter, SnapshotterError, VolumeInfo, VolumeSnapshotter};
