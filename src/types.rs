// Resource envelope, schema versions and conversion summary shared by the tools.
// Specs stay as serde_json::Value here; the typed per-version shapes live in `model`.

use crate::error::ConversionError;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value};
use std::fmt;
use std::str::FromStr;

pub const API_VERSION_V1: &str = "th2.exactpro.com/v1";
pub const API_VERSION_V2: &str = "th2.exactpro.com/v2";
pub const API_VERSION_V2_2: &str = "th2.exactpro.com/v2-2";

pub const LINK_KIND: &str = "Th2Link";
pub const DICTIONARY_KIND: &str = "Th2Dictionary";
pub const COMPONENT_KINDS: [&str; 4] = ["Th2Box", "Th2CoreBox", "Th2Estore", "Th2Mstore"];

/// Schema generations, ordered oldest first.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SchemaVersion {
    V1,
    V2,
    V2_2,
}

impl SchemaVersion {
    pub const ALL: [SchemaVersion; 3] = [SchemaVersion::V1, SchemaVersion::V2, SchemaVersion::V2_2];

    pub fn api_version(self) -> &'static str {
        match self {
            SchemaVersion::V1 => API_VERSION_V1,
            SchemaVersion::V2 => API_VERSION_V2,
            SchemaVersion::V2_2 => API_VERSION_V2_2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SchemaVersion::V1 => "v1",
            SchemaVersion::V2 => "v2",
            SchemaVersion::V2_2 => "v2-2",
        }
    }

    pub fn from_api_version(api_version: &str) -> Option<SchemaVersion> {
        SchemaVersion::ALL
            .into_iter()
            .find(|v| v.api_version() == api_version)
    }

    /// The immediately following generation, `None` for the latest one.
    pub fn next(self) -> Option<SchemaVersion> {
        match self {
            SchemaVersion::V1 => Some(SchemaVersion::V2),
            SchemaVersion::V2 => Some(SchemaVersion::V2_2),
            SchemaVersion::V2_2 => None,
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchemaVersion {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "v1" => Ok(SchemaVersion::V1),
            "v2" => Ok(SchemaVersion::V2),
            "v2-2" | "v2_2" | "v2.2" => Ok(SchemaVersion::V2_2),
            other => SchemaVersion::from_api_version(other)
                .ok_or_else(|| ConversionError::UnknownVersion(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    /// Labels, annotations and anything else the engine does not interpret.
    #[serde(flatten)]
    pub extra: JsonMap<String, Value>,
}

/// One th2 resource as it is stored in a schema or submitted in a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDocument {
    pub api_version: String,
    pub kind: String,
    pub metadata: Metadata,
    #[serde(default)]
    pub spec: Value,
}

impl ResourceDocument {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn is_component(&self) -> bool {
        COMPONENT_KINDS.contains(&self.kind.as_str())
    }

    pub fn is_relation(&self) -> bool {
        self.kind == LINK_KIND
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    pub resource_name: String,
    pub error: String,
}

impl ErrorMessage {
    pub fn new(resource_name: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            resource_name: resource_name.into(),
            error: error.to_string(),
        }
    }
}

/// Per-batch report: what converted, what failed and what needs a human look.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionSummary {
    pub converted_resource_names: Vec<String>,
    pub error_messages: Vec<ErrorMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl ConversionSummary {
    pub fn has_errors(&self) -> bool {
        !self.error_messages.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    pub summary: ConversionSummary,
    pub documents: Vec<ResourceDocument>,
}
