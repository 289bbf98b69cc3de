// th2.exactpro.com/v1 shapes: kebab-case box spec, flat pin list and link resources.

use super::{ExtendedSettings, Ingress, LinkEndpoint};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PIN_TYPE_MQ: &str = "mq";
pub const PIN_TYPE_GRPC_CLIENT: &str = "grpc-client";
pub const PIN_TYPE_GRPC_SERVER: &str = "grpc-server";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spec {
    #[serde(rename = "image-name")]
    pub image_name: String,
    #[serde(rename = "image-version")]
    pub image_version: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(rename = "version-range", skip_serializing_if = "Option::is_none")]
    pub version_range: Option<String>,
    #[serde(rename = "custom-config", skip_serializing_if = "Option::is_none")]
    pub custom_config: Option<Value>,
    #[serde(rename = "extended-settings", skip_serializing_if = "Option::is_none")]
    pub extended_settings: Option<ExtendedSettings<Service>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pins: Option<Vec<Pin>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prometheus: Option<Value>,
    #[serde(rename = "loggingConfig", alias = "logging-config", skip_serializing_if = "Option::is_none")]
    pub logging_config: Option<String>,
    #[serde(rename = "mqRouter", alias = "mq-router", skip_serializing_if = "Option::is_none")]
    pub mq_router: Option<Value>,
    #[serde(rename = "grpcRouter", alias = "grpc-router", skip_serializing_if = "Option::is_none")]
    pub grpc_router: Option<Value>,
    #[serde(rename = "cradleManager", alias = "cradle-manager", skip_serializing_if = "Option::is_none")]
    pub cradle_manager: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(rename = "imagePullSecrets", skip_serializing_if = "Option::is_none")]
    pub image_pull_secrets: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub name: String,
    #[serde(rename = "connection-type")]
    pub connection_type: String,
    #[serde(rename = "service-class", skip_serializing_if = "Option::is_none")]
    pub service_class: Option<String>,
    #[serde(rename = "service-classes", skip_serializing_if = "Option::is_none")]
    pub service_classes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<Filter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
}

impl Pin {
    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes
            .as_ref()
            .is_some_and(|attrs| attrs.iter().any(|a| a == attribute))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<FilterField>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Vec<FilterField>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Vec<FilterField>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterField {
    #[serde(rename = "field-name", alias = "fieldName", skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(rename = "expected-value", alias = "expectedValue", alias = "value", skip_serializing_if = "Option::is_none")]
    pub expected_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceType {
    NodePort,
    ClusterIP,
    LoadBalancer,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Service {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub service_type: Option<ServiceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<Vec<ServiceEndpoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress: Option<Ingress>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpoint {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_port: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_port: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
}

/// Spec of a `Th2Link` resource. Box and pin names do not change between
/// generations, so links are only ever read in this shape.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct LinkSpec {
    #[serde(rename = "boxes-relation")]
    pub boxes_relation: Option<BoxesRelation>,
    #[serde(rename = "dictionaries-relation")]
    pub dictionaries_relation: Option<Vec<DictionaryRelation>>,
    #[serde(rename = "multi-dictionaries-relation")]
    pub multi_dictionaries_relation: Option<Vec<MultiDictionaryRelation>>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct BoxesRelation {
    #[serde(rename = "router-mq")]
    pub router_mq: Option<Vec<Route>>,
    #[serde(rename = "router-grpc")]
    pub router_grpc: Option<Vec<Route>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Route {
    pub name: Option<String>,
    pub from: LinkEndpoint,
    pub to: LinkEndpoint,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DictionaryRelation {
    pub name: Option<String>,
    #[serde(rename = "box")]
    pub box_name: String,
    pub dictionary: DictionaryDescription,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DictionaryDescription {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MultiDictionaryRelation {
    pub name: Option<String>,
    #[serde(rename = "box")]
    pub box_name: String,
    pub dictionaries: Vec<MultiDictionary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MultiDictionary {
    pub name: String,
    pub alias: String,
}
