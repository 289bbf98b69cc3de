// Extended settings migration: passthrough fields plus the service port reshaping.

use crate::error::ConversionError;
use crate::model::v1::{self, ServiceType};
use crate::model::{v2, v2_2, ExtendedSettings, Ingress};

/// `nodePort` entries without an explicit exposed port get this value.
pub const UNASSIGNED_EXPOSED_PORT: i32 = -1;

/// Container ports treated as the "web" port when an ingress path has to pick
/// one of several entries. Checked in order.
const PREFERRED_INGRESS_PORTS: [i32; 2] = [8080, 80];

pub fn extended_settings_to_v2(
    settings: ExtendedSettings<v1::Service>,
) -> Result<ExtendedSettings<v2::Service>, ConversionError> {
    settings.try_map_service(|s| Ok(service_to_v2(s)))
}

pub fn extended_settings_to_v2_2(
    settings: ExtendedSettings<v2::Service>,
) -> Result<ExtendedSettings<v2_2::Service>, ConversionError> {
    settings.try_map_service(unify_service_ports)
}

/// Fans the single typed endpoint list of v1 out into the list matching its type.
pub fn service_to_v2(service: v1::Service) -> v2::Service {
    let endpoints = service.endpoints.unwrap_or_default();
    let ports = |with_exposed: bool| -> Option<Vec<v2::Port>> {
        let ports: Vec<v2::Port> = endpoints
            .iter()
            .map(|e| v2::Port {
                name: e.name.clone(),
                container_port: e.target_port,
                exposed_port: with_exposed
                    .then(|| e.node_port.unwrap_or(UNASSIGNED_EXPOSED_PORT)),
            })
            .collect();
        (!ports.is_empty()).then_some(ports)
    };

    let mut converted = v2::Service {
        enabled: service.enabled,
        ingress: service.ingress,
        ..Default::default()
    };
    match service.service_type {
        Some(ServiceType::NodePort) => converted.node_port = ports(true),
        Some(ServiceType::ClusterIP) => converted.cluster_ip = ports(false),
        Some(ServiceType::LoadBalancer) => converted.load_balancer = ports(false),
        None => {}
    }
    converted
}

/// Moves the ingress path onto a port entry. Only one port kind may be set
/// (an empty list still counts as set) and the ingress may carry at most one path.
pub fn unify_service_ports(service: v2::Service) -> Result<v2_2::Service, ConversionError> {
    let populated = [
        service.node_port.is_some(),
        service.cluster_ip.is_some(),
        service.load_balancer.is_some(),
    ]
    .into_iter()
    .filter(|set| *set)
    .count();
    if populated > 1 {
        return Err(ConversionError::Structural(
            "only one of nodePort, clusterIP or loadBalancer is allowed".to_string(),
        ));
    }

    let url_path = single_url_path(service.ingress)?;

    let mut unified = v2_2::Service {
        enabled: service.enabled,
        node_port: service.node_port.map(to_v2_2_ports),
        cluster_ip: service.cluster_ip.map(to_v2_2_ports),
        load_balancer: service.load_balancer.map(to_v2_2_ports),
    };

    if let Some(path) = url_path {
        let ports = [
            unified.node_port.as_mut(),
            unified.cluster_ip.as_mut(),
            unified.load_balancer.as_mut(),
        ]
        .into_iter()
        .flatten()
        .find(|ports| !ports.is_empty())
        .ok_or_else(|| {
            ConversionError::Structural(format!(
                "ingress urlPath '{}' is set but none of nodePort, clusterIP or loadBalancer has a port",
                path
            ))
        })?;
        let index = ingress_port_index(ports);
        ports[index].url_path = Some(path);
    }

    Ok(unified)
}

fn single_url_path(ingress: Option<Ingress>) -> Result<Option<String>, ConversionError> {
    let mut paths = ingress.and_then(|i| i.url_paths).unwrap_or_default();
    match paths.len() {
        0 => Ok(None),
        1 => Ok(paths.pop()),
        n => Err(ConversionError::Structural(format!(
            "ingress must have exactly one urlPath, found {}: {}",
            n,
            paths.join(", ")
        ))),
    }
}

fn to_v2_2_ports(ports: Vec<v2::Port>) -> Vec<v2_2::Port> {
    ports
        .into_iter()
        .map(|p| v2_2::Port {
            name: p.name,
            container_port: p.container_port,
            exposed_port: p.exposed_port,
            url_path: None,
        })
        .collect()
}

/// Which entry receives the ingress path: the only one, else the first 8080,
/// else the first 80, else the first in list order. `ports` must not be empty.
pub fn ingress_port_index(ports: &[v2_2::Port]) -> usize {
    if ports.len() == 1 {
        return 0;
    }
    PREFERRED_INGRESS_PORTS
        .iter()
        .find_map(|preferred| {
            ports
                .iter()
                .position(|p| p.container_port == Some(*preferred))
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v1_service(yaml: &str) -> v1::Service {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn v2_service(yaml: &str) -> v2::Service {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_node_port_service_to_v2() {
        let service = v1_service(
            r#"
enabled: true
type: NodePort
endpoints:
  - name: grpc
    targetPort: 8080
    nodePort: 30741
"#,
        );
        let yaml = serde_yaml::to_string(&service_to_v2(service)).unwrap();
        assert_eq!(
            yaml,
            "enabled: true\nnodePort:\n- name: grpc\n  containerPort: 8080\n  exposedPort: 30741\n"
        );
    }

    #[test]
    fn test_cluster_ip_service_to_v2() {
        let service = v1_service(
            r#"
enabled: true
type: ClusterIP
endpoints:
  - name: other
    targetPort: 8080
"#,
        );
        let yaml = serde_yaml::to_string(&service_to_v2(service)).unwrap();
        assert_eq!(
            yaml,
            "enabled: true\nclusterIP:\n- name: other\n  containerPort: 8080\n"
        );
    }

    #[test]
    fn test_node_port_without_exposed_port_defaults() {
        let service = v1_service(
            r#"
type: NodePort
endpoints:
  - name: grpc
    targetPort: 8080
"#,
        );
        let converted = service_to_v2(service);
        assert_eq!(
            converted.node_port.unwrap()[0].exposed_port,
            Some(UNASSIGNED_EXPOSED_PORT)
        );
        assert!(converted.cluster_ip.is_none());
        assert!(converted.load_balancer.is_none());
    }

    #[test]
    fn test_load_balancer_and_ingress_pass_through() {
        let service = v1_service(
            r#"
type: LoadBalancer
endpoints:
  - name: http
    targetPort: 80
ingress:
  urlPaths: [/act]
"#,
        );
        let converted = service_to_v2(service);
        assert_eq!(converted.load_balancer.unwrap()[0].container_port, Some(80));
        assert_eq!(
            converted.ingress.unwrap().url_paths,
            Some(vec!["/act".to_string()])
        );
    }

    #[test]
    fn test_unify_without_ingress_keeps_ports() {
        let service = v2_service(
            r#"
enabled: true
nodePort:
  - name: grpc
    containerPort: 8080
    exposedPort: 30741
"#,
        );
        let unified = unify_service_ports(service).unwrap();
        let ports = unified.node_port.unwrap();
        let port = &ports[0];
        assert_eq!(port.container_port, Some(8080));
        assert_eq!(port.exposed_port, Some(30741));
        assert_eq!(port.url_path, None);
    }

    #[test]
    fn test_unify_accepts_legacy_target_port() {
        let service = v2_service("clusterIP: [{name: grpc, targetPort: 8080}]");
        let unified = unify_service_ports(service).unwrap();
        assert_eq!(unified.cluster_ip.unwrap()[0].container_port, Some(8080));
    }

    #[test]
    fn test_url_path_prefers_8080_over_80_and_first() {
        let service = v2_service(
            r#"
nodePort:
  - name: web
    containerPort: 80
    exposedPort: 30080
  - name: grpc
    containerPort: 8080
    exposedPort: 30741
ingress:
  urlPaths: [/path]
"#,
        );
        let ports = unify_service_ports(service).unwrap().node_port.unwrap();
        assert_eq!(ports[0].url_path, None);
        assert_eq!(ports[1].url_path.as_deref(), Some("/path"));
    }

    #[test]
    fn test_url_path_tie_break_order() {
        let port = |name: &str, container: i32| v2_2::Port {
            name: name.to_string(),
            container_port: Some(container),
            exposed_port: None,
            url_path: None,
        };
        assert_eq!(ingress_port_index(&[port("only", 9000)]), 0);
        assert_eq!(ingress_port_index(&[port("a", 9000), port("b", 80)]), 1);
        assert_eq!(
            ingress_port_index(&[port("a", 80), port("b", 9000), port("c", 8080)]),
            2
        );
        assert_eq!(ingress_port_index(&[port("a", 9000), port("b", 9001)]), 0);
    }

    #[test]
    fn test_single_port_gets_path_regardless_of_number() {
        let service = v2_service(
            r#"
loadBalancer:
  - name: api
    containerPort: 9999
ingress:
  urlPaths: [/api]
"#,
        );
        let ports = unify_service_ports(service).unwrap().load_balancer.unwrap();
        assert_eq!(ports[0].url_path.as_deref(), Some("/api"));
    }

    #[test]
    fn test_two_port_kinds_fail() {
        let service = v2_service(
            r#"
nodePort: [{name: a, containerPort: 8080, exposedPort: 30000}]
clusterIP: [{name: b, containerPort: 8080}]
"#,
        );
        let err = unify_service_ports(service).unwrap_err();
        assert!(matches!(err, ConversionError::Structural(_)));
        assert!(err
            .to_string()
            .contains("only one of nodePort, clusterIP or loadBalancer is allowed"));
    }

    #[test]
    fn test_empty_port_list_still_counts_as_a_kind() {
        let service = v2_service(
            r#"
nodePort: []
clusterIP: [{name: b, containerPort: 8080}]
"#,
        );
        let err = unify_service_ports(service).unwrap_err();
        assert!(matches!(err, ConversionError::Structural(_)));

        let lonely = v2_service("clusterIP: []\ningress: {urlPaths: [/x]}");
        let err = unify_service_ports(lonely).unwrap_err();
        assert!(matches!(err, ConversionError::Structural(_)));
        assert!(err.to_string().contains("/x"));

        let empty = unify_service_ports(v2_service("loadBalancer: []")).unwrap();
        assert_eq!(empty.load_balancer, Some(Vec::new()));
    }

    #[test]
    fn test_multiple_url_paths_fail() {
        let service = v2_service(
            r#"
clusterIP: [{name: a, containerPort: 8080}]
ingress:
  urlPaths: [/a, /b]
"#,
        );
        let err = unify_service_ports(service).unwrap_err();
        assert!(matches!(err, ConversionError::Structural(_)));
    }

    #[test]
    fn test_url_path_without_ports_fails() {
        let service = v2_service("ingress: {urlPaths: [/lonely]}");
        let err = unify_service_ports(service).unwrap_err();
        assert!(matches!(err, ConversionError::Structural(_)));
        assert!(err.to_string().contains("/lonely"));
    }

    #[test]
    fn test_passthrough_settings_survive_both_steps() {
        let settings: ExtendedSettings<v1::Service> = serde_yaml::from_str(
            r#"
chart-cfg: {ref: main, path: /chart}
envVariables: {JAVA_TOOL_OPTIONS: "-Xmx1g"}
sharedMemory: {enabled: true}
replicas: 2
k8sProbes: true
externalBox: {enabled: true, address: 10.0.0.5}
hostAliases:
  - ip: 10.0.0.1
    hostnames: [cradle]
hostNetwork: false
nodeSelector: {zone: a}
mounting:
  - path: /data
    pvcName: act-data
resources:
  limits: {memory: 200Mi}
"#,
        )
        .unwrap();
        let v2 = extended_settings_to_v2(settings.clone()).unwrap();
        let v2_2 = extended_settings_to_v2_2(v2).unwrap();

        assert_eq!(v2_2.chart_config, settings.chart_config);
        assert_eq!(v2_2.env_variables, settings.env_variables);
        assert_eq!(v2_2.shared_memory, settings.shared_memory);
        assert_eq!(v2_2.replicas, Some(2));
        assert_eq!(v2_2.k8s_probes, Some(true));
        assert_eq!(v2_2.external_box, settings.external_box);
        assert_eq!(v2_2.host_aliases, settings.host_aliases);
        assert_eq!(v2_2.host_network, Some(false));
        assert_eq!(v2_2.node_selector, settings.node_selector);
        assert_eq!(v2_2.mounting, settings.mounting);
        assert_eq!(v2_2.resources, settings.resources);
        assert!(v2_2.shared_memory.is_some());
        assert!(v2_2.mounting.is_some());
        assert!(v2_2.service.is_none());
    }
}
