// Store-free conversion: multi-document YAML in, multi-document YAML with a summary header out.

use crate::tools::convert::convert_batch;
use crate::types::{ConversionResult, ConversionSummary, ResourceDocument, SchemaVersion};
use serde::Deserialize;
use serde_json::Value;

/// Reads every resource of a YAML stream. Empty documents are skipped and a
/// top-level list is flattened, so both `---` separated files and arrays work.
pub fn parse_documents(yaml: &str) -> Result<Vec<ResourceDocument>, String> {
    let mut out = Vec::new();
    for (i, de) in serde_yaml::Deserializer::from_str(yaml).enumerate() {
        let value = Value::deserialize(de).map_err(|e| format!("Invalid YAML in document {}: {}", i + 1, e))?;
        let items = match value {
            Value::Null => continue,
            Value::Array(items) => items,
            other => vec![other],
        };
        for item in items {
            let doc: ResourceDocument = serde_json::from_value(item)
                .map_err(|e| format!("Document {} is not a th2 resource: {}", i + 1, e))?;
            out.push(doc);
        }
    }
    Ok(out)
}

pub fn convert_from_request(yaml: &str, current: &str, target: &str) -> Result<String, String> {
    let current: SchemaVersion = current.parse().map_err(|e| format!("{}", e))?;
    let target: SchemaVersion = target.parse().map_err(|e| format!("{}", e))?;
    let documents = parse_documents(yaml)?;
    let result = convert_batch(documents, current, target).map_err(|e| e.to_string())?;
    render_result(&result, current, target)
}

pub fn render_result(
    result: &ConversionResult,
    current: SchemaVersion,
    target: SchemaVersion,
) -> Result<String, String> {
    let mut out = render_summary(&result.summary, current, target);
    let mut rendered = Vec::with_capacity(result.documents.len());
    for doc in &result.documents {
        rendered.push(
            serde_yaml::to_string(doc)
                .map_err(|e| format!("Failed to render '{}': {}", doc.name(), e))?,
        );
    }
    out.push_str(&rendered.join("---\n"));
    Ok(out)
}

/// Summary as a block of `#` comment lines, so the output stays valid YAML.
pub fn render_summary(summary: &ConversionSummary, current: SchemaVersion, target: SchemaVersion) -> String {
    let mut lines = vec![format!("# Conversion {} -> {}", current, target)];
    if summary.converted_resource_names.is_empty() {
        lines.push("# Converted resources: none".to_string());
    } else {
        lines.push(format!(
            "# Converted resources: {}",
            summary.converted_resource_names.join(", ")
        ));
    }
    if summary.has_errors() {
        lines.push("# Errors:".to_string());
        for e in &summary.error_messages {
            lines.push(format!("#   {}: {}", e.resource_name, one_line(&e.error)));
        }
    }
    if !summary.notes.is_empty() {
        lines.push("# Notes:".to_string());
        for note in &summary.notes {
            lines.push(format!("#   {}", one_line(note)));
        }
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn one_line(s: &str) -> String {
    s.lines().map(str::trim).collect::<Vec<_>>().join(" ")
}
