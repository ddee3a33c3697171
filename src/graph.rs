use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Slack,
    Generator,
    Load,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Slack => write!(f, "slack"),
            NodeKind::Generator => write!(f, "generator"),
            NodeKind::Load => write!(f, "load"),
        }
    }
}

/// A bus as the diagram editor sees it. Positive `active_power` /
/// `reactive_power` is net injection; a pure load carries the negative of
/// its demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    pub voltage: f64,
    pub angle: f64,
    #[serde(default)]
    pub active_power: f64,
    #[serde(default)]
    pub reactive_power: f64,
}

/// Diagram editors serialize link endpoints either as a bare node id or as
/// the whole node object; only the id matters here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Endpoint {
    Id(String),
    Object { id: String },
}

impl Endpoint {
    pub fn id(&self) -> &str {
        match self {
            Endpoint::Id(id) => id,
            Endpoint::Object { id } => id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub source: Endpoint,
    pub target: Endpoint,
    pub resistance: f64,
    pub reactance: f64,
    #[serde(default)]
    pub active_power: f64,
    #[serde(default)]
    pub reactive_power: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_active: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_reactive: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_active: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_reactive: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss_active: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss_reactive: Option<f64>,
}

impl Link {
    /// A fresh link with no solved flow attached yet.
    pub fn new(source: &str, target: &str, resistance: f64, reactance: f64) -> Self {
        Self {
            source: Endpoint::Id(source.to_string()),
            target: Endpoint::Id(target.to_string()),
            resistance,
            reactance,
            active_power: 0.0,
            reactive_power: 0.0,
            from_active: None,
            from_reactive: None,
            to_active: None,
            to_reactive: None,
            loss_active: None,
            loss_reactive: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphModel {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

/// Recovers a solver bus number from a node id: `bus7` -> 7, `7` -> 7.
pub fn bus_number(id: &str) -> Option<usize> {
    id.strip_prefix("bus").unwrap_or(id).parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_number_accepts_prefixed_and_raw_ids() {
        assert_eq!(bus_number("bus12"), Some(12));
        assert_eq!(bus_number("12"), Some(12));
        assert_eq!(bus_number("node12"), None);
    }

    #[test]
    fn endpoint_deserializes_from_string_or_object() {
        let link: Link = serde_json::from_str(
            r#"{"source": "bus1",
                "target": {"id": "bus2", "type": "load", "x": 0, "y": 0},
                "resistance": 0.02, "reactance": 0.06}"#,
        )
        .unwrap();
        assert_eq!(link.source.id(), "bus1");
        assert_eq!(link.target.id(), "bus2");
        assert_eq!(link.active_power, 0.0);
        assert!(link.from_active.is_none());
    }

    #[test]
    fn unsolved_flow_fields_are_omitted_from_json() {
        let link = Link::new("bus1", "bus2", 0.02, 0.06);
        let json = serde_json::to_value(&link).unwrap();
        assert!(json.get("from_active").is_none());
        assert_eq!(json["active_power"], 0.0);
    }

    #[test]
    fn node_type_uses_wire_names() {
        let node: Node = serde_json::from_str(
            r#"{"id": "bus1", "type": "slack", "x": 100, "y": 150,
                "voltage": 1.0, "angle": 0.0}"#,
        )
        .unwrap();
        assert_eq!(node.kind, NodeKind::Slack);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "slack");
    }
}
