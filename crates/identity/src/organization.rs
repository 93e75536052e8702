//! Request and response bodies of the organization endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use orgmigrate_core::OrgRecord;

/// Body of `POST /organizations`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrganization {
    pub created_by: String,
    pub name: String,
    pub private_metadata: Map<String, Value>,
    pub public_metadata: Map<String, Value>,
}

impl From<&OrgRecord> for NewOrganization {
    fn from(record: &OrgRecord) -> Self {
        Self {
            created_by: record.created_by.clone(),
            name: record.name.clone(),
            private_metadata: record.private_metadata_with_origin(),
            public_metadata: record.public_metadata_or_empty(),
        }
    }
}

/// The created organization as returned by the platform.
///
/// Only the fields worth logging are decoded, and all of them are
/// optional: a 2xx response means the organization exists whatever the
/// body looks like.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedOrganization {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}
