// th2.exactpro.com/v2 shapes: camelCase box spec with sectioned pins.

use super::{ExtendedSettings, Ingress, LinkEndpoint};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spec {
    pub image_name: String,
    pub image_version: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_config: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_settings: Option<ExtendedSettings<Service>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pins: Option<PinSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prometheus: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging_config: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mq_router: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grpc_router: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cradle_manager: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub book_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_pull_secrets: Option<Value>,
}

/// Pins grouped by transport. Empty sections are `None`, never empty lists.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PinSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mq: Option<MqSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grpc: Option<GrpcSection>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MqSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribers: Option<Vec<MqSubscriber>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publishers: Option<Vec<MqPublisher>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GrpcSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<Vec<GrpcClient>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<Vec<GrpcServer>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MqSubscriber {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<MqFilter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_to: Option<Vec<LinkEndpoint>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MqPublisher {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<MqFilter>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrpcClient {
    pub name: String,
    pub service_class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<GrpcFilter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_to: Option<Vec<LinkEndpoint>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrpcServer {
    pub name: String,
    pub service_classes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MqFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<FilterField>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Vec<FilterField>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Vec<FilterField>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrpcFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<FilterField>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterField {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

/// At most one of the three port lists is expected to be set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Service {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(rename = "nodePort", skip_serializing_if = "Option::is_none")]
    pub node_port: Option<Vec<Port>>,
    #[serde(rename = "clusterIP", skip_serializing_if = "Option::is_none")]
    pub cluster_ip: Option<Vec<Port>>,
    #[serde(rename = "loadBalancer", skip_serializing_if = "Option::is_none")]
    pub load_balancer: Option<Vec<Port>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress: Option<Ingress>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    pub name: String,
    #[serde(alias = "targetPort", skip_serializing_if = "Option::is_none")]
    pub container_port: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposed_port: Option<i32>,
}
