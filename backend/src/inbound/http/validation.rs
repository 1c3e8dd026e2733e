//! Shared request validation helpers for the HTTP adapter.
//!
//! Extractor failures are turned into the domain error payload so clients see
//! the same JSON shape for a malformed body as for a rejected command.

use actix_web::HttpRequest;
use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use serde::{Deserialize, Deserializer};
use serde_json::json;

use crate::domain::{Email, Error};

/// Deserialize a present field as `Some`, keeping `null` distinct from absent.
///
/// Combine with `#[serde(default)]` on an `Option<Option<T>>` field: a missing
/// key stays `None`, an explicit `null` becomes `Some(None)`.
pub(crate) fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Deserialize optional text where `null` clears the stored value.
///
/// Combine with `#[serde(default)]`: a missing key stays `None` (keep), while
/// `null` becomes `Some("")`, which the domain patch treats as a clear.
pub(crate) fn deserialize_clearable_text<'de, D>(
    deserializer: D,
) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(|text| Some(text.unwrap_or_default()))
}

fn invalid_input(kind: &str, code: &str, detail: impl std::fmt::Display) -> Error {
    Error::invalid_request(format!("invalid {kind}: {detail}")).with_details(json!({
        "code": code,
    }))
}

/// Error handler for [`actix_web::web::JsonConfig`].
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    invalid_input("request body", "invalid_body", err).into()
}

/// Error handler for [`actix_web::web::QueryConfig`].
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    invalid_input("query string", "invalid_query", err).into()
}

/// Error handler for [`actix_web::web::PathConfig`].
pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    invalid_input("path", "invalid_path", err).into()
}

/// Parse an email field, reporting the field name on failure.
pub(crate) fn parse_email(field: &str, raw: &str) -> Result<Email, Error> {
    Email::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": field,
            "code": "invalid_email",
        }))
    })
}
