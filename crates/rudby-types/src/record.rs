use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TypeError;
use crate::identity::{PrincipalId, RecordId, SerialNumber};

/// Field names owned by the record store. Callers can never set them
/// through a draft or a patch; they are dropped on the way in.
pub const RESERVED_FIELDS: &[&str] = &[
    "id",
    "_id",
    "serialNumber",
    "ownerId",
    "createdAt",
    "updatedAt",
];

/// A persisted catalog (jewellery) record.
///
/// `id`, `serial_number`, `owner_id` and `created_at` are fixed when the
/// record is created and never change afterwards. Everything else is
/// replaced wholesale by an update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    pub id: RecordId,
    pub serial_number: SerialNumber,
    pub owner_id: PrincipalId,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "collection")]
    pub collection_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Free-form descriptive fields (material, weight, price, ...).
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Stored shape of a record: everything except the id, which the durable
/// store keeps alongside the body.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordBody<'a> {
    serial_number: SerialNumber,
    owner_id: &'a PrincipalId,
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(rename = "collection")]
    collection_name: &'a str,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(flatten)]
    attributes: &'a Map<String, Value>,
}

impl RecordBody<'_> {
    fn into_map(self) -> Result<Map<String, Value>, TypeError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(TypeError::Serialization(format!(
                "record body encoded as {other}, expected an object"
            ))),
            Err(e) => Err(TypeError::Serialization(e.to_string())),
        }
    }
}

impl CatalogRecord {
    /// Encode the body of a record that does not have an id yet.
    pub fn draft_body(
        serial_number: SerialNumber,
        owner_id: &PrincipalId,
        draft: &RecordDraft,
        now: DateTime<Utc>,
    ) -> Result<Map<String, Value>, TypeError> {
        RecordBody {
            serial_number,
            owner_id,
            kind: &draft.kind,
            collection_name: &draft.collection_name,
            created_at: now,
            updated_at: now,
            attributes: &draft.attributes,
        }
        .into_map()
    }

    /// Encode this record's stored body (without the id).
    pub fn document_body(&self) -> Result<Map<String, Value>, TypeError> {
        RecordBody {
            serial_number: self.serial_number,
            owner_id: &self.owner_id,
            kind: &self.kind,
            collection_name: &self.collection_name,
            created_at: self.created_at,
            updated_at: self.updated_at,
            attributes: &self.attributes,
        }
        .into_map()
    }

    /// Decode a record from a stored body and the id the store keeps for it.
    pub fn from_document(id: RecordId, mut body: Map<String, Value>) -> Result<Self, TypeError> {
        body.insert("id".into(), Value::String(id.to_string()));
        serde_json::from_value(Value::Object(body))
            .map_err(|e| TypeError::Serialization(format!("record {id}: {e}")))
    }

    /// Replace every mutable field with the patch contents.
    ///
    /// Identity, serial number, owner and creation time are untouched.
    pub fn apply_patch(&mut self, patch: RecordPatch, now: DateTime<Utc>) {
        let patch = patch.sanitized();
        self.kind = patch.kind;
        self.collection_name = patch.collection_name;
        self.attributes = patch.attributes;
        self.updated_at = now;
    }
}

/// Caller-supplied fields for a new record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordDraft {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(rename = "collection", default)]
    pub collection_name: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Caller-supplied fields for an update.
///
/// An update replaces all mutable fields, so a patch has the same shape as
/// a draft.
pub type RecordPatch = RecordDraft;

impl RecordDraft {
    pub fn new(kind: impl Into<String>, collection_name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            collection_name: collection_name.into(),
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Drop any attribute that collides with a [`RESERVED_FIELDS`] name.
    pub fn sanitized(mut self) -> Self {
        self.attributes
            .retain(|key, _| !RESERVED_FIELDS.contains(&key.as_str()));
        self
    }
}
