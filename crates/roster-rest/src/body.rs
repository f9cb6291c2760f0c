//! Request body decoding.
//!
//! Bodies are flat JSON objects of scalar fields. HAL decorations (`_links`,
//! `_embedded`) are ignored so a fetched document can be sent back as is;
//! relations are managed through the nested relation resources only.

use roster_model::{EntityKind, Record};
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::links::LinkBuilder;

/// Parses a JSON object body.
///
/// ## Errors
///
/// Returns `ApiError::BadRequest` if the body is not a JSON object.
pub fn parse_object(bytes: &[u8]) -> ApiResult<Map<String, Value>> {
    match serde_json::from_slice(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::bad_request("request body must be a JSON object")),
        Err(e) => Err(ApiError::bad_request(format!("malformed JSON body: {e}"))),
    }
}

/// Builds a new entity for `POST /{collection}`.
///
/// The server assigns the identity, so an `id` member is rejected.
///
/// ## Errors
///
/// Returns `ApiError::BadRequest` for an `id` member, an unknown or
/// non-string field, or a missing required field.
pub fn for_create(kind: EntityKind, body: &Map<String, Value>) -> ApiResult<Record> {
    if body.contains_key("id") {
        return Err(ApiError::bad_request("id is assigned by the server"));
    }
    let mut record = Record::new(kind);
    apply(&mut record, body)?;
    record.validate()?;
    Ok(record)
}

/// Builds the replacement entity for `PUT /{collection}/{id}`.
///
/// Optional fields absent from the body become null.
///
/// ## Errors
///
/// Returns `ApiError::BadRequest` if the body carries a different `id`, an
/// unknown or non-string field, or lacks a required field.
pub fn for_replace(kind: EntityKind, id: Uuid, body: &Map<String, Value>) -> ApiResult<Record> {
    check_id(id, body)?;
    let mut record = Record::with_id(kind, id);
    apply(&mut record, body)?;
    record.validate()?;
    Ok(record)
}

/// Merges a `PATCH /{collection}/{id}` body into `existing`.
///
/// Only members present in the body change; `null` clears an optional field.
///
/// ## Errors
///
/// Returns `ApiError::BadRequest` if the body carries a different `id`, an
/// unknown or non-string field, or clears a required field.
pub fn for_merge(existing: &Record, body: &Map<String, Value>) -> ApiResult<Record> {
    check_id(existing.id(), body)?;
    let mut record = existing.clone();
    apply(&mut record, body)?;
    record.validate()?;
    Ok(record)
}

fn check_id(id: Uuid, body: &Map<String, Value>) -> ApiResult<()> {
    match body.get("id") {
        None | Some(Value::Null) => Ok(()),
        Some(Value::String(s)) if Uuid::parse_str(s).is_ok_and(|v| v == id) => Ok(()),
        Some(other) => Err(ApiError::bad_request(format!(
            "body id {other} does not match the addressed resource {id}"
        ))),
    }
}

fn apply(record: &mut Record, body: &Map<String, Value>) -> ApiResult<()> {
    let descriptor = record.descriptor();
    for (name, value) in body {
        if name == "id" || name.starts_with('_') {
            continue;
        }
        if descriptor.relation(name).is_some() {
            return Err(ApiError::bad_request(format!(
                "'{name}' is a relation; use {}/{{id}}/{name}",
                descriptor.collection
            )));
        }
        let value = match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => {
                return Err(ApiError::bad_request(format!(
                    "field '{name}' must be a string or null, got {other}"
                )));
            }
        };
        record.set_field(name, value)?;
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AttachRequest {
    id: Option<Uuid>,
    href: Option<String>,
}

/// Reads the related identity of an attach request: `{"id": ...}` or
/// `{"href": ...}`.
///
/// ## Errors
///
/// Returns `ApiError::BadRequest` if neither member resolves to an identity
/// of the relation's target kind, or an href points outside `links`.
pub fn attach_target(
    links: &LinkBuilder,
    relation: &roster_model::RelationDescriptor,
    bytes: &[u8],
) -> ApiResult<Uuid> {
    let request: AttachRequest = serde_json::from_slice(bytes)
        .map_err(|e| ApiError::bad_request(format!("malformed attach body: {e}")))?;
    match (request.id, request.href) {
        (Some(id), None) => Ok(id),
        (None, Some(href)) => links.parse_target(relation, &href).ok_or_else(|| {
            ApiError::bad_request(format!(
                "href '{href}' does not address a {}",
                relation.target
            ))
        }),
        _ => Err(ApiError::bad_request(
            "attach body needs exactly one of 'id' or 'href'",
        )),
    }
}
