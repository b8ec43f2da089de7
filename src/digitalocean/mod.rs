//! DigitalOcean implementation of the storage gateway.
//!
//! Each gateway call is a single HTTPS round trip against the `/v2/volumes`
//! and `/v2/snapshots` endpoints. Failures are classified into
//! [`GatewayError`] and returned as-is; nothing is retried here.

mod error;
mod types;

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Url};
use tracing::debug;

use crate::config::{ConfigError, GatewayConfig};
use crate::gateway::{
    CreateSnapshotRequest, CreateVolumeRequest, GatewayError, GatewayFuture, Operation, Snapshot,
    StorageGateway, Volume,
};
use error::{decode, error_from_response};
use types::{SnapshotCreateBody, SnapshotEnvelope, VolumeCreateBody, VolumeEnvelope};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("dosnap/", env!("CARGO_PKG_VERSION"));

/// Gateway that talks to the DigitalOcean block storage API.
#[derive(Clone, Debug)]
pub struct DigitalOceanGateway {
    client: Client,
    base_url: Url,
}

impl DigitalOceanGateway {
    /// Authenticates a transport from the supplied configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration is incomplete, the API
    /// URL is unusable, or the HTTP client cannot be constructed.
    pub fn new(config: &GatewayConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let base_url = Url::parse(&config.api_url)
            .map_err(|err| ConfigError::Parse(format!("invalid API URL {}: {err}", config.api_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::Parse(format!(
                "invalid API URL {}: cannot be used as a base",
                config.api_url
            )));
        }

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|err| ConfigError::Parse(format!("invalid access token: {err}")))?;
        bearer.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|err| ConfigError::Parse(format!("failed to build HTTP client: {err}")))?;

        Ok(Self { client, base_url })
    }

    /// Builds `<base>/v2/<segments...>`, percent-encoding each segment.
    fn endpoint(&self, operation: Operation, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::Transport {
                operation,
                message: format!("{} cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .push("v2")
            .extend(segments);
        Ok(url)
    }

    async fn execute(
        &self,
        operation: Operation,
        id: &str,
        request: RequestBuilder,
    ) -> Result<String, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|err| GatewayError::Transport {
                operation,
                message: err.to_string(),
            })?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| GatewayError::Transport {
                operation,
                message: err.to_string(),
            })?;
        debug!(%operation, status = status.as_u16(), "provider responded");

        if status.is_success() {
            return Ok(body);
        }
        Err(error_from_response(operation, id, status.as_u16(), &body))
    }
}

impl StorageGateway for DigitalOceanGateway {
    fn get_snapshot<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Snapshot> {
        Box::pin(async move {
            let operation = Operation::GetSnapshot;
            let url = self.endpoint(operation, &["snapshots", id])?;
            let body = self.execute(operation, id, self.client.get(url)).await?;
            let envelope: SnapshotEnvelope = decode(operation, &body)?;
            Ok(envelope.snapshot.into())
        })
    }

    fn create_volume<'a>(
        &'a self,
        request: &'a CreateVolumeRequest,
    ) -> GatewayFuture<'a, Volume> {
        Box::pin(async move {
            let operation = Operation::CreateVolume;
            let url = self.endpoint(operation, &["volumes"])?;
            let payload = VolumeCreateBody {
                name: &request.name,
                size_gigabytes: request.size_gigabytes,
                snapshot_id: &request.snapshot_id,
            };
            let body = self
                .execute(
                    operation,
                    &request.snapshot_id,
                    self.client.post(url).json(&payload),
                )
                .await?;
            let envelope: VolumeEnvelope = decode(operation, &body)?;
            Ok(envelope.volume.into())
        })
    }

    fn get_volume<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, Volume> {
        Box::pin(async move {
            let operation = Operation::GetVolume;
            let url = self.endpoint(operation, &["volumes", id])?;
            let body = self.execute(operation, id, self.client.get(url)).await?;
            let envelope: VolumeEnvelope = decode(operation, &body)?;
            Ok(envelope.volume.into())
        })
    }

    fn create_snapshot<'a>(
        &'a self,
        request: &'a CreateSnapshotRequest,
    ) -> GatewayFuture<'a, Snapshot> {
        Box::pin(async move {
            let operation = Operation::CreateSnapshot;
            let url = self.endpoint(operation, &["volumes", request.volume_id.as_str(), "snapshots"])?;
            let payload = SnapshotCreateBody {
                name: &request.name,
                description: &request.description,
            };
            let body = self
                .execute(
                    operation,
                    &request.volume_id,
                    self.client.post(url).json(&payload),
                )
                .await?;
            let envelope: SnapshotEnvelope = decode(operation, &body)?;
            Ok(envelope.snapshot.into())
        })
    }

    fn delete_snapshot<'a>(&'a self, id: &'a str) -> GatewayFuture<'a, ()> {
        Box::pin(async move {
            let operation = Operation::DeleteSnapshot;
            let url = self.endpoint(operation, &["snapshots", id])?;
            self.execute(operation, id, self.client.delete(url)).await?;
            Ok(())
        })
    }
}
