//! Request handlers and the helpers they share.

use crate::error::ApiError;
use axum::body::Bytes;
use axum::http::header::HOST;
use axum::http::HeaderMap;
use axum::Json;
use roster_core::serializer::fields_from_value;
use roster_core::Fields;
use serde_json::{json, Value};

pub mod groups;
pub mod people;

/// Path ids that are not integers name no record.
pub(crate) fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

/// Decodes a JSON object body; an empty body is an empty object.
pub(crate) fn parse_body(body: &Bytes) -> Result<Fields, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Fields::new());
    }
    let value: Value =
        serde_json::from_slice(body).map_err(|err| ApiError::MalformedJson(err.to_string()))?;
    Ok(fields_from_value(value)?)
}

/// `GET /`: links to the resource collections.
pub async fn api_root(headers: HeaderMap) -> Json<Value> {
    let base = headers
        .get(HOST)
        .and_then(|host| host.to_str().ok())
        .map(|host| format!("http://{host}"))
        .unwrap_or_default();
    Json(json!({
        "people": format!("{base}/people/"),
        "groups": format!("{base}/groups/"),
    }))
}

/// Unmatched paths get the same 404 body as missing records.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
