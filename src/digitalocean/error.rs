//! Maps DigitalOcean error responses onto [`GatewayError`].

use crate::gateway::{GatewayError, Operation};

use super::types::ApiErrorBody;

const STATUS_NOT_FOUND: u16 = 404;

/// Classifies a non-success response. `id` is the resource the request
/// addressed and is only reported for not-found answers.
pub(super) fn error_from_response(
    operation: Operation,
    id: &str,
    status: u16,
    body: &str,
) -> GatewayError {
    let parsed = serde_json::from_str::<ApiErrorBody>(body).unwrap_or_default();
    let message = if parsed.message.is_empty() {
        body.trim().to_owned()
    } else {
        parsed.message
    };

    if status == STATUS_NOT_FOUND {
        return GatewayError::NotFound {
            operation,
            id: id.to_owned(),
            message,
        };
    }

    GatewayError::Api {
        operation,
        status,
        code: parsed.id,
        message,
    }
}

/// Decodes a success body into `T`.
pub(super) fn decode<T>(operation: Operation, body: &str) -> Result<T, GatewayError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(body).map_err(|err| GatewayError::Decode {
        operation,
        message: err.to_string(),
    })
}
