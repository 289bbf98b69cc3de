//! Typed box specs for each schema generation.
//!
//! Each module only knows its own shape; moving between generations is the job
//! of `tools::transform`. Everything the engine does not interpret is kept as
//! `serde_json::Value` so it passes through untouched.

pub mod v1;
pub mod v2;
pub mod v2_2;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A `box`/`pin` pair naming one end of a link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkEndpoint {
    #[serde(rename = "box")]
    pub box_name: String,
    pub pin: String,
}

#[cfg(test)]
impl LinkEndpoint {
    pub(crate) fn new(box_name: impl Into<String>, pin: impl Into<String>) -> Self {
        Self {
            box_name: box_name.into(),
            pin: pin.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_paths: Option<Vec<String>>,
}

/// Runtime settings of a box. Only `service` changes shape between generations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedSettings<S> {
    #[serde(alias = "chart-cfg", skip_serializing_if = "Option::is_none")]
    pub chart_config: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_variables: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_memory: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k8s_probes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_box: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_aliases: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_network: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mounting: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<S>,
}

impl<S> ExtendedSettings<S> {
    /// Copies every passthrough field and converts the service with `f`.
    pub fn try_map_service<T, E>(
        self,
        f: impl FnOnce(S) -> Result<T, E>,
    ) -> Result<ExtendedSettings<T>, E> {
        Ok(ExtendedSettings {
            chart_config: self.chart_config,
            env_variables: self.env_variables,
            shared_memory: self.shared_memory,
            replicas: self.replicas,
            k8s_probes: self.k8s_probes,
            external_box: self.external_box,
            host_aliases: self.host_aliases,
            host_network: self.host_network,
            node_selector: self.node_selector,
            mounting: self.mounting,
            resources: self.resources,
            service: self.service.map(f).transpose()?,
        })
    }
}
