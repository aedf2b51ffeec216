//! Errors

use std::fmt::Display;

use salvo::http::StatusError;
use storefront::errors::{Classify, ErrorClass};
use tracing::error;

/// Map a service error to its HTTP status.
///
/// Client errors carry the error message; internal errors are logged and
/// answered with a generic 500.
pub(crate) fn into_status_error<E>(error: E) -> StatusError
where
    E: Classify + Display,
{
    match error.class() {
        ErrorClass::Validation => StatusError::bad_request().brief(error.to_string()),
        ErrorClass::Conflict => StatusError::conflict().brief(error.to_string()),
        ErrorClass::NotFound => StatusError::not_found().brief(error.to_string()),
        ErrorClass::State => StatusError::unprocessable_entity().brief(error.to_string()),
        ErrorClass::Internal => {
            error!("request failed: {error}");

            StatusError::internal_server_error()
        }
    }
}
