// Reference data for the schema versions the converter knows (list_schema_versions).

use crate::types::{SchemaVersion, COMPONENT_KINDS, DICTIONARY_KIND, LINK_KIND};
use serde_json::{json, Map as JsonMap, Value};

pub fn list_schema_versions_json() -> String {
    serde_json::to_string_pretty(&schema_versions()).unwrap_or_default()
}

fn schema_versions() -> JsonMap<String, Value> {
    let versions: Vec<Value> = SchemaVersion::ALL
        .iter()
        .map(|v| {
            json!({
                "name": v.name(),
                "apiVersion": v.api_version(),
                "next": v.next().map(|n| n.name()),
                "changes": changes_into(*v),
            })
        })
        .collect();

    let mut out = JsonMap::new();
    out.insert("versions".to_string(), Value::Array(versions));
    out.insert("componentKinds".to_string(), json!(COMPONENT_KINDS));
    out.insert(
        "linkKind".to_string(),
        json!({
            "kind": LINK_KIND,
            "description": "Only read during v1 -> v2; links become linkTo entries on subscriber and gRPC client pins"
        }),
    );
    out.insert(
        "passthroughKinds".to_string(),
        json!({
            "kinds": [DICTIONARY_KIND],
            "description": "Not converted; local schema conversion copies them as they are"
        }),
    );
    out
}

fn changes_into(version: SchemaVersion) -> Vec<&'static str> {
    match version {
        SchemaVersion::V1 => Vec::new(),
        SchemaVersion::V2 => vec![
            "spec keys become camelCase (image-name -> imageName, custom-config -> customConfig, ...)",
            "pins are grouped into mq.subscribers, mq.publishers, grpc.client and grpc.server",
            "service endpoints move under nodePort, clusterIP or loadBalancer as containerPort/exposedPort",
            "Th2Link router-mq/router-grpc entries become linkTo on the consuming pin",
            "multi-dictionaries-relation aliases in customConfig become ${dictionary_link:NAME}",
        ],
        SchemaVersion::V2_2 => vec![
            "service.ingress is removed; its single urlPath moves onto one port entry",
            "only one of nodePort, clusterIP or loadBalancer may be set",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_listed_in_order() {
        let parsed: Value = serde_json::from_str(&list_schema_versions_json()).unwrap();
        let versions = parsed["versions"].as_array().unwrap();
        let names: Vec<_> = versions.iter().map(|v| v["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["v1", "v2", "v2-2"]);
        assert_eq!(versions[0]["next"], json!("v2"));
        assert_eq!(versions[2]["next"], Value::Null);
        assert_eq!(versions[2]["apiVersion"], json!("th2.exactpro.com/v2-2"));
    }
}
