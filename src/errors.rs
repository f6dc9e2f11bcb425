//! Error types for the data engine.
//!
//! Maps AWS SDK errors onto the engine taxonomy using typed `SdkError`
//! variant matching — no string parsing of debug output. The engine never
//! retries: every error is surfaced synchronously to the caller, and
//! interpreting `ConditionalCheckFailed` ("already exists" vs. "lost a
//! race") is the calling service's job.

use std::collections::HashMap;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::types::AttributeValue;

use crate::value::{Item, attribute_values_to_item};

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The engine error taxonomy.
///
/// `NotFound` on reads is deliberately absent: a missing item decodes to
/// `GetResult { item: None }`, not an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed input caught before any network call: a key missing a sort
    /// value the schema requires, a sort value the schema does not declare,
    /// a `BETWEEN` without its second bound, an empty update spec.
    #[error("validation error: {0}")]
    Validation(String),

    /// A secondary index name that the table descriptor does not declare.
    #[error("unknown index: {0}")]
    UnknownIndex(String),

    /// A conditional write was rejected by the store. When the store
    /// returned the current item image it rides along, decoded.
    #[error("conditional check failed")]
    ConditionalCheckFailed {
        /// Current item state at rejection time, if the store returned it.
        item: Option<Item>,
    },

    /// Throttling, network timeouts, dispatch failures. Surfaced unmodified;
    /// retry and backoff policy belongs to the caller.
    #[error("transient store error: {0}")]
    Transient(String),

    /// Missing, invalid, or expired AWS credentials.
    #[error("credentials error: {0}")]
    Credentials(String),

    /// The target table does not exist.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// A value could not be encoded to or decoded from the wire format.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Any other store-reported failure.
    #[error("store error: {0}")]
    Store(String),
}

/// Map non-service `SdkError` variants (dispatch failures, timeouts, etc.).
///
/// Returns `Some` for non-service errors, `None` for `ServiceError`.
fn map_outer_sdk_error<E, R>(err: &SdkError<E, R>) -> Option<Error>
where
    E: std::fmt::Debug,
    R: std::fmt::Debug,
{
    match err {
        SdkError::DispatchFailure(dispatch) => {
            if dispatch.is_timeout() {
                Some(Error::Transient(
                    "connection timed out; check your network or endpoint".into(),
                ))
            } else if dispatch.is_io() {
                Some(Error::Transient(
                    "connection failed (I/O error); check if the endpoint is reachable".into(),
                ))
            } else {
                Some(Error::Transient(
                    "connection failed; check if the endpoint is reachable".into(),
                ))
            }
        }
        SdkError::TimeoutError(_) => Some(Error::Transient(
            "request timed out; check your network or endpoint".into(),
        )),
        SdkError::ConstructionFailure(err) => {
            let msg = format!("{err:?}");
            if msg.contains("credentials") || msg.contains("Credentials") {
                Some(Error::Credentials(
                    "no AWS credentials found; configure environment variables, a profile, \
                     or an IAM role"
                        .into(),
                ))
            } else {
                Some(Error::Store(format!("failed to build request: {msg}")))
            }
        }
        SdkError::ResponseError(err) => Some(Error::Store(format!("invalid response: {err:?}"))),
        SdkError::ServiceError(_) => None,
        _ => Some(Error::Store(format!("unknown SDK error: {err:?}"))),
    }
}

/// Map service error codes shared by every DynamoDB operation.
///
/// Returns `None` if the code needs operation-specific handling.
fn map_common_service_code(code: Option<&str>, message: Option<&str>) -> Option<Error> {
    let code = code?;

    match code {
        "UnrecognizedClientException" | "InvalidAccessKeyId" => Some(Error::Credentials(
            "invalid AWS credentials; check your access key and secret".into(),
        )),
        "SignatureDoesNotMatch" => Some(Error::Credentials(
            "AWS signature mismatch; check your secret access key".into(),
        )),
        "ExpiredTokenException" | "ExpiredToken" => Some(Error::Credentials(
            "AWS credentials have expired; refresh your session token".into(),
        )),
        "ProvisionedThroughputExceededException"
        | "LimitExceededException"
        | "RequestLimitExceeded"
        | "Throttling"
        | "ThrottlingException"
        | "TooManyRequestsException" => Some(Error::Transient(
            message
                .map(str::to_string)
                .unwrap_or_else(|| "request rate too high".into()),
        )),
        _ => None,
    }
}

/// Map a DynamoDB `SdkError` to an engine error.
///
/// For `ServiceError`, uses `ProvideErrorMetadata` to read the error code
/// and message instead of parsing debug strings.
pub(crate) fn map_sdk_error<E, R>(err: SdkError<E, R>, table: Option<&str>) -> Error
where
    E: aws_sdk_dynamodb::error::ProvideErrorMetadata + std::fmt::Debug + std::fmt::Display,
    R: std::fmt::Debug,
{
    map_sdk_error_with_item(err, table, None)
}

/// Same as [`map_sdk_error`], with the item image the store attached to a
/// rejected conditional write (if any).
pub(crate) fn map_sdk_error_with_item<E, R>(
    err: SdkError<E, R>,
    table: Option<&str>,
    item: Option<HashMap<String, AttributeValue>>,
) -> Error
where
    E: aws_sdk_dynamodb::error::ProvideErrorMetadata + std::fmt::Debug + std::fmt::Display,
    R: std::fmt::Debug,
{
    if let Some(engine_err) = map_outer_sdk_error(&err) {
        return engine_err;
    }

    if let Some(service_err) = err.as_service_error() {
        let meta = aws_sdk_dynamodb::error::ProvideErrorMetadata::meta(service_err);
        let code = meta.code();
        let message = meta.message();

        if let Some(engine_err) = map_common_service_code(code, message) {
            return engine_err;
        }

        return match code {
            Some("ConditionalCheckFailedException") => Error::ConditionalCheckFailed {
                item: item.and_then(|raw| attribute_values_to_item(raw).ok()),
            },
            Some("ResourceNotFoundException") => {
                Error::TableNotFound(table.unwrap_or("<unknown>").to_string())
            }
            Some("ValidationException") | Some("ItemCollectionSizeLimitExceededException") => {
                Error::Validation(
                    message
                        .map(str::to_string)
                        .unwrap_or_else(|| service_err.to_string()),
                )
            }
            Some("SerializationException") => Error::Serialization(
                message
                    .map(str::to_string)
                    .unwrap_or_else(|| service_err.to_string()),
            ),
            _ => Error::Store(
                message
                    .map(str::to_string)
                    .unwrap_or_else(|| service_err.to_string()),
            ),
        };
    }

    Error::Store(format!("unexpected DynamoDB error: {err:?}"))
}
