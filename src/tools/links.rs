// Fold v1 link resources into `linkTo` entries on v2 pins and patch dictionary aliases.

use crate::error::ConversionError;
use crate::model::v1::{LinkSpec, MultiDictionary};
use crate::model::{v2, LinkEndpoint};
use crate::types::{ErrorMessage, ResourceDocument};
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;

/// Synthetic pin key holding a box's dictionary relations.
pub const DICTIONARIES_PIN: &str = "dictionaries";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PinLinks {
    pub mq: Vec<LinkEndpoint>,
    pub grpc: Vec<LinkEndpoint>,
    pub multi_dictionaries: Vec<MultiDictionary>,
}

/// box name -> pin name -> what is linked to it.
#[derive(Debug, Default)]
pub struct LinkIndex {
    boxes: HashMap<String, HashMap<String, PinLinks>>,
    pub errors: Vec<ErrorMessage>,
    pub notes: Vec<String>,
}

impl LinkIndex {
    /// Scans every relation document once. Unreadable relations are reported and skipped.
    pub fn build(relations: &[ResourceDocument]) -> Self {
        let mut index = LinkIndex::default();
        for relation in relations {
            match serde_json::from_value::<LinkSpec>(relation.spec.clone()) {
                Ok(spec) => index.add(relation.name(), spec),
                Err(e) => {
                    tracing::warn!(link = relation.name(), error = %e, "skipping unreadable link resource");
                    index.errors.push(ErrorMessage::new(relation.name(), e));
                }
            }
        }
        index
    }

    fn pin(&mut self, box_name: &str, pin: &str) -> &mut PinLinks {
        self.boxes
            .entry(box_name.to_string())
            .or_default()
            .entry(pin.to_string())
            .or_default()
    }

    fn add(&mut self, link_name: &str, spec: LinkSpec) {
        if let Some(boxes) = spec.boxes_relation {
            // MQ links are addressed by the consuming side, gRPC links by the calling side.
            for route in boxes.router_mq.unwrap_or_default() {
                self.pin(&route.to.box_name, &route.to.pin).mq.push(route.from);
            }
            for route in boxes.router_grpc.unwrap_or_default() {
                self.pin(&route.from.box_name, &route.from.pin).grpc.push(route.to);
            }
        }
        for relation in spec.multi_dictionaries_relation.unwrap_or_default() {
            self.pin(&relation.box_name, DICTIONARIES_PIN)
                .multi_dictionaries
                .extend(relation.dictionaries);
        }
        // Single dictionaries have no alias in custom config to rewrite.
        for relation in spec.dictionaries_relation.unwrap_or_default() {
            tracing::warn!(
                link = link_name,
                box_name = %relation.box_name,
                dictionary = %relation.dictionary.name,
                "single dictionary relation is not converted"
            );
            self.notes.push(format!(
                "Dictionary '{}' linked to box '{}' in '{}' was not converted; reference it as ${{dictionary_link:{}}} in the box custom config.",
                relation.dictionary.name, relation.box_name, link_name, relation.dictionary.name
            ));
        }
    }

    pub fn links_for(&self, box_name: &str) -> Option<&HashMap<String, PinLinks>> {
        self.boxes.get(box_name)
    }
}

/// Applies the links of one box to its converted spec.
pub fn apply_links(
    spec: &mut v2::Spec,
    links: &HashMap<String, PinLinks>,
) -> Result<(), ConversionError> {
    if let Some(pins) = spec.pins.as_mut() {
        if let Some(subscribers) = pins.mq.as_mut().and_then(|mq| mq.subscribers.as_mut()) {
            for pin in subscribers {
                if let Some(found) = links.get(&pin.name).filter(|l| !l.mq.is_empty()) {
                    pin.link_to = Some(found.mq.clone());
                }
            }
        }
        if let Some(clients) = pins.grpc.as_mut().and_then(|grpc| grpc.client.as_mut()) {
            for pin in clients {
                if let Some(found) = links.get(&pin.name).filter(|l| !l.grpc.is_empty()) {
                    pin.link_to = Some(found.grpc.clone());
                }
            }
        }
    }

    let dictionaries = links
        .get(DICTIONARIES_PIN)
        .map(|l| l.multi_dictionaries.as_slice())
        .unwrap_or_default();
    if !dictionaries.is_empty() {
        if let Some(custom_config) = spec.custom_config.as_ref() {
            spec.custom_config = Some(substitute_dictionary_aliases(custom_config, dictionaries)?);
        }
    }
    Ok(())
}

/// Rewrites every ` <alias>` line ending of the YAML-rendered config into
/// ` ${dictionary_link:<name>}` and parses the result back.
///
/// Works on text because aliases may sit at any depth of the otherwise opaque
/// config. An alias that also appears as a plain value elsewhere gets replaced too.
pub fn substitute_dictionary_aliases(
    custom_config: &Value,
    dictionaries: &[MultiDictionary],
) -> Result<Value, ConversionError> {
    if dictionaries.is_empty() {
        return Ok(custom_config.clone());
    }
    let text = serde_yaml::to_string(custom_config)?;

    let names: HashMap<&str, &str> = dictionaries
        .iter()
        .map(|d| (d.alias.as_str(), d.name.as_str()))
        .collect();
    let alternatives: Vec<String> = dictionaries.iter().map(|d| regex::escape(&d.alias)).collect();
    let pattern = Regex::new(&format!(" ({})\n", alternatives.join("|")))
        .map_err(|e| ConversionError::Document(format!("Invalid dictionary alias pattern: {}", e)))?;

    let patched = pattern.replace_all(&text, |caps: &Captures| {
        let alias = &caps[1];
        match names.get(alias) {
            Some(name) => format!(" ${{dictionary_link:{}}}\n", name),
            None => caps[0].to_string(),
        }
    });
    serde_yaml::from_str(&patched).map_err(|e| {
        ConversionError::Document(format!(
            "Custom config is not valid after dictionary substitution: {}",
            e
        ))
    })
}
