// Sort a flat v1 pin list into the sectioned v2 pin layout.

use crate::error::ConversionError;
use crate::model::v1::{self, PIN_TYPE_GRPC_CLIENT, PIN_TYPE_GRPC_SERVER, PIN_TYPE_MQ};
use crate::model::v2::{
    FilterField, GrpcClient, GrpcFilter, GrpcSection, GrpcServer, MqFilter, MqPublisher, MqSection,
    MqSubscriber, PinSpec,
};

pub const SERVICE_CLASS_PLACEHOLDER: &str = "PLEASE SPECIFY SERVICE CLASS";
pub const SERVICE_CLASSES_PLACEHOLDER: &str = "PLEASE SPECIFY SERVICE CLASSES";

/// MQ pins carrying this attribute publish; every other MQ pin subscribes.
const PUBLISH_ATTRIBUTE: &str = "publish";

/// Classifies pins by `connection-type`, keeping input order inside every list.
/// Returns `None` when nothing ends up in any section.
pub fn classify_pins(pins: Vec<v1::Pin>) -> Result<Option<PinSpec>, ConversionError> {
    let mut subscribers = Vec::new();
    let mut publishers = Vec::new();
    let mut clients = Vec::new();
    let mut servers = Vec::new();

    for pin in pins {
        match pin.connection_type.as_str() {
            PIN_TYPE_MQ => {
                if pin.has_attribute(PUBLISH_ATTRIBUTE) {
                    publishers.push(to_publisher(pin));
                } else {
                    subscribers.push(to_subscriber(pin));
                }
            }
            PIN_TYPE_GRPC_CLIENT => clients.push(to_grpc_client(pin)),
            PIN_TYPE_GRPC_SERVER => servers.push(to_grpc_server(pin)),
            other => {
                return Err(ConversionError::Document(format!(
                    "Pin '{}' has unknown connection-type '{}'; expected one of: {}, {}, {}",
                    pin.name, other, PIN_TYPE_MQ, PIN_TYPE_GRPC_CLIENT, PIN_TYPE_GRPC_SERVER
                )))
            }
        }
    }

    let mq = MqSection {
        subscribers: non_empty(subscribers),
        publishers: non_empty(publishers),
    };
    let grpc = GrpcSection {
        client: non_empty(clients),
        server: non_empty(servers),
    };
    let spec = PinSpec {
        mq: (mq.subscribers.is_some() || mq.publishers.is_some()).then_some(mq),
        grpc: (grpc.client.is_some() || grpc.server.is_some()).then_some(grpc),
    };
    Ok((spec.mq.is_some() || spec.grpc.is_some()).then_some(spec))
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

fn to_subscriber(pin: v1::Pin) -> MqSubscriber {
    MqSubscriber {
        name: pin.name,
        attributes: pin.attributes,
        filters: pin.filters.map(|f| f.into_iter().map(to_mq_filter).collect()),
        settings: pin.settings,
        link_to: None,
    }
}

fn to_publisher(pin: v1::Pin) -> MqPublisher {
    MqPublisher {
        name: pin.name,
        attributes: pin.attributes,
        filters: pin.filters.map(|f| f.into_iter().map(to_mq_filter).collect()),
    }
}

fn to_grpc_client(pin: v1::Pin) -> GrpcClient {
    GrpcClient {
        name: pin.name,
        service_class: pin
            .service_class
            .unwrap_or_else(|| SERVICE_CLASS_PLACEHOLDER.to_string()),
        attributes: pin.attributes,
        filters: pin.filters.map(|f| f.into_iter().map(to_grpc_filter).collect()),
        strategy: pin.strategy,
        link_to: None,
    }
}

fn to_grpc_server(pin: v1::Pin) -> GrpcServer {
    GrpcServer {
        name: pin.name,
        service_classes: pin
            .service_classes
            .unwrap_or_else(|| vec![SERVICE_CLASSES_PLACEHOLDER.to_string()]),
    }
}

fn to_mq_filter(filter: v1::Filter) -> MqFilter {
    MqFilter {
        properties: filter.properties.map(to_filter_fields),
        message: filter.message.map(to_filter_fields),
        metadata: filter.metadata.map(to_filter_fields),
    }
}

// gRPC filters only ever had message properties.
fn to_grpc_filter(filter: v1::Filter) -> GrpcFilter {
    GrpcFilter {
        properties: filter.properties.map(to_filter_fields),
    }
}

fn to_filter_fields(fields: Vec<v1::FilterField>) -> Vec<FilterField> {
    fields
        .into_iter()
        .map(|f| FilterField {
            field_name: f.field_name,
            expected_value: f.expected_value,
            operation: f.operation,
        })
        .collect()
}
