// th2.exactpro.com/v2-2 shapes: same pins as v2, ingress paths moved onto ports, bookName added.

use super::v2::PinSpec;
use super::ExtendedSettings;
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
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_port: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposed_port: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_path: Option<String>,
}
