// Batch conversion: validate versions, convert boxes one by one, fold links in, summarize.

use crate::error::ConversionError;
use crate::tools::links::{apply_links, LinkIndex};
use crate::tools::transform::{check_transition, convert, convert_typed, TypedResource, VersionedSpec};
use crate::types::{ConversionResult, ConversionSummary, ErrorMessage, ResourceDocument, SchemaVersion};

/// Converts a set of resources from `current` to `target`.
///
/// Returns `Err` only for batch-level problems with the requested versions.
/// A resource declaring another version than `current` rejects the whole batch
/// through the summary; any other failure only drops the resource concerned.
pub fn convert_batch(
    documents: Vec<ResourceDocument>,
    current: SchemaVersion,
    target: SchemaVersion,
) -> Result<ConversionResult, ConversionError> {
    check_transition(current, target)?;
    tracing::info!(%current, %target, resources = documents.len(), "starting conversion");

    let (components, relations, skipped): (Vec<_>, Vec<_>, Vec<_>) = partition(documents);
    for doc in &skipped {
        tracing::debug!(name = doc.name(), kind = %doc.kind, "resource kind is not converted");
    }

    let mut summary = ConversionSummary::default();
    let mismatched = version_mismatches(components.iter().chain(relations.iter()), current);
    if !mismatched.is_empty() {
        tracing::warn!(count = mismatched.len(), "resources are not at the requested version, nothing converted");
        summary.error_messages = mismatched;
        return Ok(ConversionResult {
            summary,
            documents: Vec::new(),
        });
    }

    if current == target {
        summary
            .notes
            .push(format!("Resources are already at version {}", target));
        let mut documents = components;
        documents.extend(relations);
        return Ok(ConversionResult { summary, documents });
    }

    // Links only exist in v1, so they are folded in right after the v2 step.
    let first_stop = if current == SchemaVersion::V1 {
        SchemaVersion::V2
    } else {
        target
    };
    let mut converted = convert_each(&components, current, first_stop, &mut summary);

    if current == SchemaVersion::V1 {
        converted = resolve_links(converted, &relations, &mut summary);
    }

    let mut documents = Vec::with_capacity(converted.len());
    for resource in converted {
        let name = resource.name().to_string();
        let result = resource
            .into_document()
            .and_then(|doc| convert(&doc, first_stop, target));
        if let Some(doc) = keep_or_report(result, &name, &mut summary) {
            summary.converted_resource_names.push(name);
            documents.push(doc);
        }
    }

    tracing::info!(
        converted = summary.converted_resource_names.len(),
        failed = summary.error_messages.len(),
        "conversion finished"
    );
    Ok(ConversionResult { summary, documents })
}

fn partition(
    documents: Vec<ResourceDocument>,
) -> (Vec<ResourceDocument>, Vec<ResourceDocument>, Vec<ResourceDocument>) {
    let mut components = Vec::new();
    let mut relations = Vec::new();
    let mut skipped = Vec::new();
    for doc in documents {
        if doc.is_component() {
            components.push(doc);
        } else if doc.is_relation() {
            relations.push(doc);
        } else {
            skipped.push(doc);
        }
    }
    (components, relations, skipped)
}

fn version_mismatches<'a>(
    documents: impl Iterator<Item = &'a ResourceDocument>,
    current: SchemaVersion,
) -> Vec<ErrorMessage> {
    documents
        .filter(|doc| doc.api_version != current.api_version())
        .map(|doc| {
            let err = ConversionError::VersionMismatch {
                declared: doc.api_version.clone(),
                requested: current.api_version().to_string(),
            };
            ErrorMessage::new(doc.name(), err)
        })
        .collect()
}

fn convert_each(
    components: &[ResourceDocument],
    current: SchemaVersion,
    target: SchemaVersion,
    summary: &mut ConversionSummary,
) -> Vec<TypedResource> {
    components
        .iter()
        .filter_map(|doc| {
            let result = convert_typed(doc, current, target);
            keep_or_report(result, doc.name(), summary)
        })
        .collect()
}

fn resolve_links(
    converted: Vec<TypedResource>,
    relations: &[ResourceDocument],
    summary: &mut ConversionSummary,
) -> Vec<TypedResource> {
    let index = LinkIndex::build(relations);
    summary.error_messages.extend(index.errors.iter().cloned());
    summary.notes.extend(index.notes.iter().cloned());

    converted
        .into_iter()
        .filter_map(|mut resource| {
            let Some(links) = index.links_for(resource.name()) else {
                return Some(resource);
            };
            let result = match &mut resource.spec {
                VersionedSpec::V2(spec) => apply_links(spec, links),
                other => Err(ConversionError::Document(format!(
                    "links can only be inserted into {} resources, found {}",
                    SchemaVersion::V2,
                    other.version()
                ))),
            };
            let name = resource.name().to_string();
            if result.is_ok() {
                tracing::debug!(name = %name, pins = links.len(), "inserted links");
            }
            keep_or_report(result.map(|_| resource), &name, summary)
        })
        .collect()
}

fn keep_or_report<T>(
    result: Result<T, ConversionError>,
    name: &str,
    summary: &mut ConversionSummary,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(name, error = %e, "resource conversion failed");
            summary.error_messages.push(ErrorMessage::new(name, e));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{API_VERSION_V1, API_VERSION_V2, API_VERSION_V2_2};
    use serde::Deserialize;
    use serde_json::json;

    fn docs(yaml: &str) -> Vec<ResourceDocument> {
        serde_yaml::Deserializer::from_str(yaml)
            .map(|d| ResourceDocument::deserialize(d).unwrap())
            .collect()
    }

    const SCHEMA_V1: &str = r#"
apiVersion: th2.exactpro.com/v1
kind: Th2Box
metadata: {name: act}
spec:
  image-name: act
  image-version: 1.0.0
  pins:
    - {name: in, connection-type: mq, attributes: [subscribe]}
    - {name: to_check1, connection-type: grpc-client, service-class: Check1Service}
---
apiVersion: th2.exactpro.com/v1
kind: Th2CoreBox
metadata: {name: codec}
spec:
  image-name: codec
  image-version: 1.0.0
  custom-config:
    dictionary: main_alias
  pins:
    - {name: out, connection-type: mq, attributes: [publish]}
---
apiVersion: th2.exactpro.com/v1
kind: Th2Link
metadata: {name: links}
spec:
  boxes-relation:
    router-mq:
      - {name: codec-act, from: {box: codec, pin: out}, to: {box: act, pin: in}}
    router-grpc:
      - {name: act-check1, from: {box: act, pin: to_check1}, to: {box: check1, pin: server}}
  multi-dictionaries-relation:
    - name: codec-dictionaries
      box: codec
      dictionaries: [{name: fix50, alias: main_alias}]
---
apiVersion: th2.exactpro.com/v1
kind: Th2Dictionary
metadata: {name: fix50}
spec:
  data: "<dictionary/>"
"#;

    fn find<'a>(result: &'a ConversionResult, name: &str) -> &'a ResourceDocument {
        result.documents.iter().find(|d| d.name() == name).unwrap()
    }

    #[test]
    fn test_v1_to_v2_inserts_links_and_drops_relations() {
        let result = convert_batch(docs(SCHEMA_V1), SchemaVersion::V1, SchemaVersion::V2).unwrap();
        assert!(!result.summary.has_errors(), "{:?}", result.summary);
        assert_eq!(result.summary.converted_resource_names, vec!["act", "codec"]);
        assert_eq!(result.documents.len(), 2);
        assert!(result.documents.iter().all(|d| d.api_version == API_VERSION_V2));

        let act = find(&result, "act");
        assert_eq!(
            act.spec["pins"]["mq"]["subscribers"][0]["linkTo"],
            json!([{"box": "codec", "pin": "out"}])
        );
        assert_eq!(
            act.spec["pins"]["grpc"]["client"][0]["linkTo"],
            json!([{"box": "check1", "pin": "server"}])
        );

        let codec = find(&result, "codec");
        assert!(codec.spec["pins"]["mq"]["publishers"][0].get("linkTo").is_none());
        assert_eq!(
            codec.spec["customConfig"],
            json!({"dictionary": "${dictionary_link:fix50}"})
        );
    }

    #[test]
    fn test_v1_to_v2_2_keeps_links() {
        let result = convert_batch(docs(SCHEMA_V1), SchemaVersion::V1, SchemaVersion::V2_2).unwrap();
        assert!(!result.summary.has_errors());
        assert!(result.documents.iter().all(|d| d.api_version == API_VERSION_V2_2));
        let act = find(&result, "act");
        assert_eq!(
            act.spec["pins"]["mq"]["subscribers"][0]["linkTo"],
            json!([{"box": "codec", "pin": "out"}])
        );
    }

    #[test]
    fn test_one_wrong_version_rejects_batch() {
        let mut input = docs(SCHEMA_V1);
        input[1].api_version = API_VERSION_V2.to_string();
        let result = convert_batch(input, SchemaVersion::V1, SchemaVersion::V2).unwrap();
        assert!(result.documents.is_empty());
        assert!(result.summary.converted_resource_names.is_empty());
        assert_eq!(result.summary.error_messages.len(), 1);
        assert_eq!(result.summary.error_messages[0].resource_name, "codec");
        assert!(result.summary.error_messages[0].error.contains(API_VERSION_V2));
    }

    #[test]
    fn test_backward_target_is_batch_error() {
        let err = convert_batch(docs(SCHEMA_V1), SchemaVersion::V2, SchemaVersion::V1).unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedTargetVersion { .. }));
    }

    #[test]
    fn test_same_version_returns_resources_unchanged() {
        let input = docs(SCHEMA_V1);
        let result = convert_batch(input.clone(), SchemaVersion::V1, SchemaVersion::V1).unwrap();
        assert!(!result.summary.has_errors());
        assert_eq!(result.documents, input[..3].to_vec());
    }

    #[test]
    fn test_broken_resource_does_not_stop_siblings() {
        let mut input = docs(SCHEMA_V1);
        input[0].spec["pins"][0]["connection-type"] = json!("carrier-pigeon");
        let result = convert_batch(input, SchemaVersion::V1, SchemaVersion::V2).unwrap();
        assert_eq!(result.summary.converted_resource_names, vec!["codec"]);
        assert_eq!(result.summary.error_messages.len(), 1);
        assert_eq!(result.summary.error_messages[0].resource_name, "act");
        assert_eq!(result.documents.len(), 1);
    }

    #[test]
    fn test_second_step_failure_is_per_resource() {
        let input = docs(
            r#"
apiVersion: th2.exactpro.com/v1
kind: Th2Box
metadata: {name: web}
spec:
  image-name: web
  image-version: 1.0.0
  extended-settings:
    service:
      type: ClusterIP
      endpoints: [{name: http, targetPort: 80}]
      ingress: {urlPaths: [/a, /b]}
---
apiVersion: th2.exactpro.com/v1
kind: Th2Box
metadata: {name: ok}
spec:
  image-name: ok
  image-version: 1.0.0
"#,
        );
        let result = convert_batch(input, SchemaVersion::V1, SchemaVersion::V2_2).unwrap();
        assert_eq!(result.summary.converted_resource_names, vec!["ok"]);
        assert_eq!(result.summary.error_messages[0].resource_name, "web");
        assert!(result.summary.error_messages[0].error.contains("exactly one urlPath"));
    }

    #[test]
    fn test_v2_batch_keeps_book_name() {
        let input = docs(
            r#"
apiVersion: th2.exactpro.com/v2
kind: Th2Box
metadata: {name: act}
spec:
  imageName: act
  imageVersion: 1.0.0
  bookName: demo_book
"#,
        );
        let result = convert_batch(input, SchemaVersion::V2, SchemaVersion::V2_2).unwrap();
        assert_eq!(result.documents[0].spec["bookName"], json!("demo_book"));
    }

    #[test]
    fn test_dangling_links_are_ignored() {
        let input = docs(
            r#"
apiVersion: th2.exactpro.com/v1
kind: Th2Box
metadata: {name: act}
spec:
  image-name: act
  image-version: 1.0.0
---
apiVersion: th2.exactpro.com/v1
kind: Th2Link
metadata: {name: links}
spec:
  boxes-relation:
    router-mq:
      - {from: {box: ghost, pin: out}, to: {box: phantom, pin: in}}
"#,
        );
        let result = convert_batch(input, SchemaVersion::V1, SchemaVersion::V2).unwrap();
        assert!(!result.summary.has_errors());
        assert_eq!(result.summary.converted_resource_names, vec!["act"]);
    }

    #[test]
    fn test_v2_to_v2_2_ignores_links() {
        let input = docs(
            r#"
apiVersion: th2.exactpro.com/v2
kind: Th2Box
metadata: {name: act}
spec:
  imageName: act
  imageVersion: 1.0.0
"#,
        );
        let result = convert_batch(input, SchemaVersion::V2, SchemaVersion::V2_2).unwrap();
        assert_eq!(result.documents[0].api_version, API_VERSION_V2_2);
        assert_eq!(result.documents[0].spec, json!({"imageName": "act", "imageVersion": "1.0.0"}));
        assert_eq!(API_VERSION_V1, SchemaVersion::V1.api_version());
    }
}
