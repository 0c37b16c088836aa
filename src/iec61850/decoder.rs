//! Pure readers for the typed leaves below a data attribute.

use crate::error::TranslationError;
use crate::iec61850::{Node, SubDataAttribute, SubValue};

use chrono::{DateTime, Utc};

type Result<T> = std::result::Result<T, TranslationError>;

/// Walks `path` below `node`.
pub fn leaf<'a>(node: &'a Node, path: &[SubDataAttribute]) -> Result<&'a Node> {
    let mut current = node;
    for sub in path {
        current = current
            .child(sub.description())
            .ok_or_else(|| TranslationError::MissingLeaf {
                reference: current.reference.clone(),
                leaf: sub.description(),
            })?;
    }
    Ok(current)
}

fn value<'a>(node: &'a Node, path: &[SubDataAttribute]) -> Result<&'a SubValue> {
    let leaf = leaf(node, path)?;
    leaf.value.as_ref().ok_or_else(|| TranslationError::EmptyLeaf {
        reference: leaf.reference.clone(),
    })
}

fn unexpected(node: &Node, path: &[SubDataAttribute], expected: &'static str, found: &SubValue) -> TranslationError {
    let mut reference = node.reference.clone();
    for sub in path {
        reference.push('.');
        reference.push_str(sub.description());
    }
    TranslationError::UnexpectedType {
        reference,
        expected,
        found: found.type_name(),
    }
}

/// Reads an enumerated status byte.
pub fn read_byte(node: &Node, sub: SubDataAttribute) -> Result<u8> {
    let path = [sub];
    match value(node, &path)? {
        SubValue::Byte(v) => Ok(*v),
        SubValue::Int16(v) => u8::try_from(*v).map_err(|_| out_of_range(node, &path, v, "byte")),
        SubValue::Int32(v) => u8::try_from(*v).map_err(|_| out_of_range(node, &path, v, "byte")),
        other => Err(unexpected(node, &path, "byte", other)),
    }
}

pub fn read_bool(node: &Node, sub: SubDataAttribute) -> Result<bool> {
    let path = [sub];
    match value(node, &path)? {
        SubValue::Bool(v) => Ok(*v),
        other => Err(unexpected(node, &path, "bool", other)),
    }
}

/// Reads a 16 or 32 bit integer (bytes are widened).
pub fn read_integer(node: &Node, sub: SubDataAttribute) -> Result<i64> {
    let path = [sub];
    match value(node, &path)? {
        SubValue::Byte(v) => Ok(i64::from(*v)),
        SubValue::Int16(v) => Ok(i64::from(*v)),
        SubValue::Int32(v) => Ok(i64::from(*v)),
        other => Err(unexpected(node, &path, "integer", other)),
    }
}

/// Reads an IEEE float at `path`, e.g. `mag.f`.
pub fn read_float(node: &Node, path: &[SubDataAttribute]) -> Result<f64> {
    match value(node, path)? {
        SubValue::Float32(v) => Ok(f64::from(*v)),
        SubValue::Float64(v) => Ok(*v),
        other => Err(unexpected(node, path, "float", other)),
    }
}

/// `mag.f` of an analogue value.
pub fn read_magnitude(node: &Node) -> Result<f64> {
    read_float(node, &[SubDataAttribute::Magnitude, SubDataAttribute::Float])
}

/// `cVal.mag.f` of a complex (per phase) value.
pub fn read_complex_magnitude(node: &Node) -> Result<f64> {
    read_float(
        node,
        &[
            SubDataAttribute::ComplexValue,
            SubDataAttribute::Magnitude,
            SubDataAttribute::Float,
        ],
    )
}

pub fn read_timestamp(node: &Node, sub: SubDataAttribute) -> Result<DateTime<Utc>> {
    let path = [sub];
    match value(node, &path)? {
        SubValue::Timestamp(v) => Ok(*v),
        other => Err(unexpected(node, &path, "timestamp", other)),
    }
}

/// The node's own `t` leaf, or now when the node carries none. A `t` leaf of
/// the wrong type is still a fault.
pub fn read_time_or_now(node: &Node) -> Result<DateTime<Utc>> {
    match read_timestamp(node, SubDataAttribute::Time) {
        Err(TranslationError::MissingLeaf { .. }) | Err(TranslationError::EmptyLeaf { .. }) => Ok(Utc::now()),
        other => other,
    }
}

pub fn read_string(node: &Node, sub: SubDataAttribute) -> Result<String> {
    let path = [sub];
    match value(node, &path)? {
        SubValue::VisibleString(v) => Ok(v.clone()),
        other => Err(unexpected(node, &path, "visible string", other)),
    }
}

fn out_of_range<V: std::fmt::Display>(
    node: &Node,
    path: &[SubDataAttribute],
    value: V,
    target: &'static str,
) -> TranslationError {
    let reference = path
        .iter()
        .fold(node.reference.clone(), |acc, sub| format!("{}.{}", acc, sub.description()));
    TranslationError::OutOfRange {
        reference,
        value: value.to_string(),
        target,
    }
}
