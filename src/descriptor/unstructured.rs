//! Path-based access over the generic JSON document.

use serde_json::{Map, Value};

use super::{DescriptorError, VOLUME_HANDLE_FIELD, handle_path};

const VOLUME_SOURCE_SEGMENTS: [&str; 2] = ["spec", "csi"];

fn not_an_object(walked: &[&str]) -> DescriptorError {
    let path = if walked.is_empty() {
        String::from("<document>")
    } else {
        walked.join(".")
    };
    DescriptorError::WrongType {
        path,
        expected: "an object",
    }
}

/// Walks `segments`; an explicit `null` counts as an absent section.
fn lookup<'a>(document: &'a Value, segments: &[&str]) -> Result<&'a Value, DescriptorError> {
    let mut current = document;
    let mut walked = Vec::with_capacity(segments.len());
    for segment in segments {
        let map = current.as_object().ok_or_else(|| not_an_object(&walked))?;
        walked.push(*segment);
        current = map
            .get(*segment)
            .filter(|value| !value.is_null())
            .ok_or_else(|| DescriptorError::MissingSection {
                path: walked.join("."),
            })?;
    }
    Ok(current)
}

fn lookup_map_mut<'a>(
    document: &'a mut Value,
    segments: &[&str],
) -> Result<&'a mut Map<String, Value>, DescriptorError> {
    let mut current = document;
    let mut walked = Vec::with_capacity(segments.len());
    for segment in segments {
        let map = current
            .as_object_mut()
            .ok_or_else(|| not_an_object(&walked))?;
        walked.push(*segment);
        current = map
            .get_mut(*segment)
            .filter(|value| !value.is_null())
            .ok_or_else(|| DescriptorError::MissingSection {
                path: walked.join("."),
            })?;
    }
    current
        .as_object_mut()
        .ok_or_else(|| not_an_object(&walked))
}

pub(super) fn volume_handle(descriptor: &Value) -> Result<String, DescriptorError> {
    let section = lookup(descriptor, &VOLUME_SOURCE_SEGMENTS)?
        .as_object()
        .ok_or_else(|| not_an_object(&VOLUME_SOURCE_SEGMENTS))?;
    match section.get(VOLUME_HANDLE_FIELD) {
        Some(Value::String(handle)) if !handle.is_empty() => Ok(handle.clone()),
        None | Some(Value::Null | Value::String(_)) => {
            Err(DescriptorError::MissingField { path: handle_path() })
        }
        Some(_) => Err(DescriptorError::WrongType {
            path: handle_path(),
            expected: "a string",
        }),
    }
}

pub(super) fn with_volume_handle(
    mut descriptor: Value,
    volume_id: &str,
) -> Result<Value, DescriptorError> {
    let section = lookup_map_mut(&mut descriptor, &VOLUME_SOURCE_SEGMENTS)?;
    section.insert(
        VOLUME_HANDLE_FIELD.to_owned(),
        Value::String(volume_id.to_owned()),
    );
    Ok(descriptor)
}
