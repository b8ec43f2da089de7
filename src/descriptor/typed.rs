//! Access through the typed `PersistentVolume` model.

use k8s_openapi::api::core::v1::PersistentVolume;
use serde_json::Value;

use super::{DescriptorError, VOLUME_SOURCE_PATH, handle_path};

fn decode(descriptor: Value) -> Result<PersistentVolume, DescriptorError> {
    serde_json::from_value(descriptor).map_err(|err| DescriptorError::Malformed(err.to_string()))
}

fn missing_source() -> DescriptorError {
    DescriptorError::MissingSection {
        path: VOLUME_SOURCE_PATH.to_owned(),
    }
}

pub(super) fn volume_handle(descriptor: &Value) -> Result<String, DescriptorError> {
    let volume = decode(descriptor.clone())?;
    let csi = volume
        .spec
        .and_then(|spec| spec.csi)
        .ok_or_else(missing_source)?;
    if csi.volume_handle.is_empty() {
        return Err(DescriptorError::MissingField { path: handle_path() });
    }
    Ok(csi.volume_handle)
}

pub(super) fn with_volume_handle(
    descriptor: Value,
    volume_id: &str,
) -> Result<Value, DescriptorError> {
    let mut volume = decode(descriptor)?;
    let csi = volume
        .spec
        .as_mut()
        .and_then(|spec| spec.csi.as_mut())
        .ok_or_else(missing_source)?;
    volume_id.clone_into(&mut csi.volume_handle);
    serde_json::to_value(&volume).map_err(|err| DescriptorError::Malformed(err.to_string()))
}
