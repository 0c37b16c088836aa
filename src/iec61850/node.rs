use crate::iec61850::attribute::LogicalNode;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Fc {{{
/// Functional constraint of a data attribute.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Fc {
    #[serde(rename = "ST")]
    Status,
    #[serde(rename = "MX")]
    Measurand,
    #[serde(rename = "CF")]
    Configuration,
}

impl std::fmt::Display for Fc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Status => "ST",
            Self::Measurand => "MX",
            Self::Configuration => "CF",
        };
        write!(f, "{}", s)
    }
} // }}}

// SubValue {{{
/// Typed leaf value as delivered by the protocol client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SubValue {
    Byte(u8),
    Bool(bool),
    Int16(i16),
    Int32(i32),
    Float32(f32),
    Float64(f64),
    Timestamp(DateTime<Utc>),
    VisibleString(String),
}

impl SubValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Byte(_) => "byte",
            Self::Bool(_) => "bool",
            Self::Int16(_) => "int16",
            Self::Int32(_) => "int32",
            Self::Float32(_) => "float32",
            Self::Float64(_) => "float64",
            Self::Timestamp(_) => "timestamp",
            Self::VisibleString(_) => "visible_string",
        }
    }
}

impl std::fmt::Display for SubValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Byte(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int16(v) => write!(f, "{}", v),
            Self::Int32(v) => write!(f, "{}", v),
            Self::Float32(v) => write!(f, "{}", v),
            Self::Float64(v) => write!(f, "{}", v),
            Self::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            Self::VisibleString(v) => write!(f, "{:?}", v),
        }
    }
} // }}}

// Node {{{
/// A dataset member or one of its nested sub values.
///
/// References are hierarchical: `<logical device>/<logical node>.<attribute>[.<leaf>...]`.
/// Nodes are read-only in the reporting pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fc: Option<Fc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<SubValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(reference: &str, fc: Fc) -> Self {
        Self {
            reference: reference.to_string(),
            fc: Some(fc),
            value: None,
            children: Vec::new(),
        }
    }

    pub fn leaf(reference: &str, value: SubValue) -> Self {
        Self {
            reference: reference.to_string(),
            fc: None,
            value: Some(value),
            children: Vec::new(),
        }
    }

    /// Appends a leaf named `name` below this node.
    pub fn with_leaf(mut self, name: &str, value: SubValue) -> Self {
        let reference = format!("{}.{}", self.reference, name);
        self.children.push(Self::leaf(&reference, value));
        self
    }

    /// Appends an intermediate node named `name`, built by `build`.
    pub fn with_node<F>(mut self, name: &str, build: F) -> Self
    where
        F: FnOnce(Node) -> Node,
    {
        let child = Self {
            reference: format!("{}.{}", self.reference, name),
            fc: self.fc,
            value: None,
            children: Vec::new(),
        };
        self.children.push(build(child));
        self
    }

    /// Last segment of the reference.
    pub fn name(&self) -> &str {
        let tail = self
            .reference
            .rsplit_once('/')
            .map(|(_, rest)| rest)
            .unwrap_or(&self.reference);
        tail.rsplit_once('.').map(|(_, name)| name).unwrap_or(tail)
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name() == name)
    }

    pub fn logical_device(&self) -> Option<&str> {
        self.reference.split_once('/').map(|(ld, _)| ld)
    }

    pub fn logical_node(&self) -> Option<&str> {
        let (_, rest) = self.reference.split_once('/')?;
        Some(rest.split('.').next().unwrap_or(rest))
    }

    /// True when this node hangs from `ln`, regardless of the logical device.
    pub fn is_under(&self, ln: LogicalNode) -> bool {
        self.logical_node() == Some(ln.description())
    }

    fn fmt_indented(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        write!(f, "{:width$}{}", "", self.name(), width = depth * 2)?;
        if let Some(fc) = self.fc {
            if depth == 0 {
                write!(f, " [{}]", fc)?;
            }
        }
        if let Some(value) = &self.value {
            write!(f, ": {}", value)?;
        }
        for child in &self.children {
            writeln!(f)?;
            child.fmt_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.fmt_indented(f, 0)
    }
} // }}}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_parts() {
        let node = Node::new("ZOWN_POCBATTERY1/MMXN1.TotW", Fc::Measurand)
            .with_node("mag", |n| n.with_leaf("f", SubValue::Float32(1.5)));

        assert_eq!(node.name(), "TotW");
        assert_eq!(node.logical_device(), Some("ZOWN_POCBATTERY1"));
        assert_eq!(node.logical_node(), Some("MMXN1"));
        assert!(node.is_under(LogicalNode::MeasurementOne));
        assert!(!node.is_under(LogicalNode::MeasurementTwo));

        let mag = node.child("mag").unwrap();
        assert_eq!(mag.reference, "ZOWN_POCBATTERY1/MMXN1.TotW.mag");
        assert_eq!(mag.child("f").unwrap().value, Some(SubValue::Float32(1.5)));
    }

    #[test]
    fn name_without_attribute_path() {
        let node = Node::new("ZOWN_POCPV1/LLN0", Fc::Status);
        assert_eq!(node.name(), "LLN0");
        assert_eq!(node.logical_node(), Some("LLN0"));
    }

    #[test]
    fn deserializes_from_capture_json() {
        let json = r#"{
            "reference": "ZOWN_POCPV1/LLN0.Beh",
            "fc": "ST",
            "children": [
                {"reference": "ZOWN_POCPV1/LLN0.Beh.stVal", "value": {"type": "byte", "value": 1}}
            ]
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.fc, Some(Fc::Status));
        assert_eq!(node.child("stVal").unwrap().value, Some(SubValue::Byte(1)));
    }
}
