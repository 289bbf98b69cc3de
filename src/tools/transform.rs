// Step a box spec forward one schema generation at a time (v1 -> v2 -> v2-2).

use crate::error::ConversionError;
use crate::model::{v1, v2, v2_2};
use crate::tools::pins::classify_pins;
use crate::tools::service::{extended_settings_to_v2, extended_settings_to_v2_2};
use crate::types::{Metadata, ResourceDocument, SchemaVersion};
use serde_json::Value;

/// A box spec tagged with the generation it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum VersionedSpec {
    V1(v1::Spec),
    V2(v2::Spec),
    V2_2(v2_2::Spec),
}

impl VersionedSpec {
    pub fn parse(version: SchemaVersion, spec: Value) -> Result<Self, ConversionError> {
        Ok(match version {
            SchemaVersion::V1 => VersionedSpec::V1(serde_json::from_value(spec)?),
            SchemaVersion::V2 => VersionedSpec::V2(serde_json::from_value(spec)?),
            SchemaVersion::V2_2 => VersionedSpec::V2_2(serde_json::from_value(spec)?),
        })
    }

    pub fn version(&self) -> SchemaVersion {
        match self {
            VersionedSpec::V1(_) => SchemaVersion::V1,
            VersionedSpec::V2(_) => SchemaVersion::V2,
            VersionedSpec::V2_2(_) => SchemaVersion::V2_2,
        }
    }

    /// One step forward. The latest generation has nowhere to go.
    pub fn to_next_version(self) -> Result<Self, ConversionError> {
        match self {
            VersionedSpec::V1(spec) => Ok(VersionedSpec::V2(spec_to_v2(spec)?)),
            VersionedSpec::V2(spec) => Ok(VersionedSpec::V2_2(spec_to_v2_2(spec)?)),
            VersionedSpec::V2_2(_) => Err(ConversionError::UnsupportedTargetVersion {
                from: SchemaVersion::V2_2,
                to: SchemaVersion::V2_2,
            }),
        }
    }

    pub fn convert_to(self, target: SchemaVersion) -> Result<Self, ConversionError> {
        check_transition(self.version(), target)?;
        let mut spec = self;
        while spec.version() < target {
            spec = spec.to_next_version()?;
        }
        Ok(spec)
    }

    pub fn to_value(&self) -> Result<Value, ConversionError> {
        let value = match self {
            VersionedSpec::V1(spec) => serde_json::to_value(spec),
            VersionedSpec::V2(spec) => serde_json::to_value(spec),
            VersionedSpec::V2_2(spec) => serde_json::to_value(spec),
        };
        value.map_err(|e| ConversionError::Serialization(e.to_string()))
    }
}

/// Only forward moves (or staying put) are allowed.
pub fn check_transition(from: SchemaVersion, to: SchemaVersion) -> Result<(), ConversionError> {
    if to < from {
        return Err(ConversionError::UnsupportedTargetVersion { from, to });
    }
    Ok(())
}

/// A component document with its spec parsed for its declared generation.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedResource {
    pub kind: String,
    pub metadata: Metadata,
    pub spec: VersionedSpec,
}

impl TypedResource {
    pub fn parse(doc: &ResourceDocument) -> Result<Self, ConversionError> {
        let version = SchemaVersion::from_api_version(&doc.api_version)
            .ok_or_else(|| ConversionError::UnknownVersion(doc.api_version.clone()))?;
        Ok(Self {
            kind: doc.kind.clone(),
            metadata: doc.metadata.clone(),
            spec: VersionedSpec::parse(version, doc.spec.clone())?,
        })
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn convert_to(self, target: SchemaVersion) -> Result<Self, ConversionError> {
        Ok(Self {
            spec: self.spec.convert_to(target)?,
            ..self
        })
    }

    pub fn into_document(self) -> Result<ResourceDocument, ConversionError> {
        Ok(ResourceDocument {
            api_version: self.spec.version().api_version().to_string(),
            spec: self.spec.to_value()?,
            kind: self.kind,
            metadata: self.metadata,
        })
    }
}

/// Converts one component document from `from` to `to`.
pub fn convert(
    doc: &ResourceDocument,
    from: SchemaVersion,
    to: SchemaVersion,
) -> Result<ResourceDocument, ConversionError> {
    if from == to {
        check_declared_version(doc, from)?;
        return Ok(doc.clone());
    }
    convert_typed(doc, from, to)?.into_document()
}

/// Same checks as [`convert`], but keeps the typed spec so links can still be applied.
pub fn convert_typed(
    doc: &ResourceDocument,
    from: SchemaVersion,
    to: SchemaVersion,
) -> Result<TypedResource, ConversionError> {
    check_transition(from, to)?;
    check_declared_version(doc, from)?;
    TypedResource::parse(doc)?.convert_to(to)
}

fn check_declared_version(doc: &ResourceDocument, from: SchemaVersion) -> Result<(), ConversionError> {
    if doc.api_version != from.api_version() {
        return Err(ConversionError::VersionMismatch {
            declared: doc.api_version.clone(),
            requested: from.api_version().to_string(),
        });
    }
    Ok(())
}

fn spec_to_v2(spec: v1::Spec) -> Result<v2::Spec, ConversionError> {
    Ok(v2::Spec {
        image_name: spec.image_name,
        image_version: spec.image_version,
        type_: spec.type_,
        version_range: spec.version_range,
        custom_config: spec.custom_config,
        extended_settings: spec.extended_settings.map(extended_settings_to_v2).transpose()?,
        pins: classify_pins(spec.pins.unwrap_or_default())?,
        prometheus: spec.prometheus,
        logging_config: spec.logging_config,
        mq_router: spec.mq_router,
        grpc_router: spec.grpc_router,
        cradle_manager: spec.cradle_manager,
        disabled: spec.disabled,
        book_name: None,
        image_pull_secrets: spec.image_pull_secrets,
    })
}

fn spec_to_v2_2(spec: v2::Spec) -> Result<v2_2::Spec, ConversionError> {
    Ok(v2_2::Spec {
        image_name: spec.image_name,
        image_version: spec.image_version,
        type_: spec.type_,
        version_range: spec.version_range,
        custom_config: spec.custom_config,
        extended_settings: spec
            .extended_settings
            .map(extended_settings_to_v2_2)
            .transpose()?,
        pins: spec.pins,
        prometheus: spec.prometheus,
        logging_config: spec.logging_config,
        mq_router: spec.mq_router,
        grpc_router: spec.grpc_router,
        cradle_manager: spec.cradle_manager,
        disabled: spec.disabled,
        book_name: spec.book_name,
        image_pull_secrets: spec.image_pull_secrets,
    })
}
