//! Volume identity mapping for persistent volume descriptors.
//!
//! The volume handle of a CSI-provisioned persistent volume lives at
//! `spec.csi.volumeHandle`. Two access strategies are supported: walking the
//! generic JSON document by path, or converting to the typed
//! [`k8s_openapi`] `PersistentVolume`. Both fail with [`DescriptorError`]
//! when the `spec.csi` section is absent; neither touches unrelated fields.

mod typed;
mod unstructured;

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;

/// Path of the volume-source section, as reported in errors.
pub const VOLUME_SOURCE_PATH: &str = "spec.csi";

/// Field holding the volume handle inside the volume-source section.
pub const VOLUME_HANDLE_FIELD: &str = "volumeHandle";

/// How descriptors are read and written.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum DescriptorStrategy {
    /// Walk the JSON document by path, preserving every other field.
    #[default]
    Unstructured,
    /// Round-trip through the typed `PersistentVolume` model.
    Typed,
}

impl DescriptorStrategy {
    /// Name accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unstructured => "unstructured",
            Self::Typed => "typed",
        }
    }

    /// Reads the volume handle from `descriptor`.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError`] when the volume-source section or the
    /// handle is missing, empty, or of the wrong shape.
    pub fn volume_handle(self, descriptor: &Value) -> Result<String, DescriptorError> {
        match self {
            Self::Unstructured => unstructured::volume_handle(descriptor),
            Self::Typed => typed::volume_handle(descriptor),
        }
    }

    /// Returns `descriptor` with its volume handle replaced by `volume_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError`] when the volume-source section is missing
    /// or the descriptor cannot be decoded.
    pub fn with_volume_handle(
        self,
        descriptor: Value,
        volume_id: &str,
    ) -> Result<Value, DescriptorError> {
        match self {
            Self::Unstructured => unstructured::with_volume_handle(descriptor, volume_id),
            Self::Typed => typed::with_volume_handle(descriptor, volume_id),
        }
    }
}

impl fmt::Display for DescriptorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DescriptorStrategy {
    type Err = DescriptorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "unstructured" => Ok(Self::Unstructured),
            "typed" => Ok(Self::Typed),
            other => Err(DescriptorError::UnknownStrategy(other.to_owned())),
        }
    }
}

/// Errors raised when a descriptor does not have the expected shape.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum DescriptorError {
    /// A section along the path is absent.
    #[error("persistent volume has no {path} section")]
    MissingSection {
        /// Dotted path of the missing section.
        path: String,
    },
    /// The handle field is absent or empty.
    #[error("persistent volume field {path} is missing or empty")]
    MissingField {
        /// Dotted path of the field.
        path: String,
    },
    /// A value along the path has an unexpected JSON type.
    #[error("persistent volume field {path} is not {expected}")]
    WrongType {
        /// Dotted path of the value.
        path: String,
        /// Expected JSON type.
        expected: &'static str,
    },
    /// The document could not be converted to or from the typed model.
    #[error("persistent volume could not be converted: {0}")]
    Malformed(String),
    /// An unsupported strategy name was requested.
    #[error("unknown descriptor strategy '{0}'")]
    UnknownStrategy(String),
}

fn handle_path() -> String {
    format!("{VOLUME_SOURCE_PATH}.{VOLUME_HANDLE_FIELD}")
}
