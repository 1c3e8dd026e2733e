//! Text field normalisation shared by the record constructors and patches.

use super::Error;
use serde_json::json;

/// Trim `value` and reject it when nothing is left.
pub(crate) fn required_text(field: &'static str, value: &str) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_request(format!("{field} is required"))
            .with_details(json!({ "field": field, "code": "required" })));
    }
    Ok(trimmed.to_owned())
}

/// Blank optional text becomes `None`; anything else is kept trimmed.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    })
}

/// Apply a patch to a required field: blank or absent input keeps `current`.
pub(crate) fn keep_unless_blank(current: &str, patch: Option<&str>) -> String {
    match patch.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_owned(),
        _ => current.to_owned(),
    }
}
