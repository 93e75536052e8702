//! Input organization records and their schema.
//!
//! Records arrive as raw JSON values so that one malformed entry can be
//! rejected without failing the whole input file. [`validate_record`]
//! decodes a raw value into an [`OrgRecord`] and applies the field rules.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use crate::error::RecordError;

/// Key under which the origin identifier is stored in private metadata.
pub const EXTERNAL_ID_METADATA_KEY: &str = "externalId";

/// One organization entry from the input file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrgRecord {
    /// Identifier of the owning user in the target system.
    #[validate(custom(function = "not_blank"))]
    pub created_by: String,
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    /// Identifier from the originating system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_metadata: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_metadata: Option<Map<String, Value>>,
}

impl OrgRecord {
    /// Private metadata as it should be sent to the identity platform.
    ///
    /// The record's `externalId`, when present, is folded in under
    /// [`EXTERNAL_ID_METADATA_KEY`] and overrides any value already there.
    pub fn private_metadata_with_origin(&self) -> Map<String, Value> {
        let mut metadata = self.private_metadata.clone().unwrap_or_default();
        if let Some(external_id) = &self.external_id {
            metadata.insert(
                EXTERNAL_ID_METADATA_KEY.to_string(),
                Value::String(external_id.clone()),
            );
        }
        metadata
    }

    /// Public metadata, or an empty map.
    pub fn public_metadata_or_empty(&self) -> Map<String, Value> {
        self.public_metadata.clone().unwrap_or_default()
    }

    pub fn identity(&self) -> RecordIdentity {
        RecordIdentity {
            user_id: Some(self.created_by.clone()),
            external_id: self.external_id.clone(),
        }
    }
}

/// Rejects empty and whitespace-only strings.
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Decode and validate one raw input record.
pub fn validate_record(raw: &Value) -> Result<OrgRecord, RecordError> {
    let record = OrgRecord::deserialize(raw)?;
    record.validate()?;
    Ok(record)
}

/// Identifying fields of a record, used to label failure-log entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordIdentity {
    /// The record's `createdBy`.
    pub user_id: Option<String>,
    pub external_id: Option<String>,
}

impl RecordIdentity {
    /// Best-effort extraction from a record that may not have passed
    /// validation. Non-string values are ignored.
    pub fn from_raw(raw: &Value) -> Self {
        let field = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            user_id: field("createdBy"),
            external_id: field("externalId"),
        }
    }
}
