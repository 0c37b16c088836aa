//! Node to measurement translation, one module per device family.
//!
//! Translators only see the node they are given: no device identity, no
//! connection state.

pub mod battery;
pub mod lmgc;
pub mod photovoltaic;
pub mod pq;

use crate::error::TranslationError;
use crate::iec61850::{decoder, DataAttribute, Node, SubDataAttribute};
use crate::measurement::{Measurement, MeasurementValue};

pub type Result<T> = std::result::Result<T, TranslationError>;

/// `stVal` as an enumerated state byte.
pub fn state(node: &Node, id: u32, attribute: DataAttribute) -> Result<Measurement> {
    let value = decoder::read_byte(node, SubDataAttribute::State)?;
    Ok(Measurement::new(
        id,
        attribute,
        decoder::read_time_or_now(node)?,
        MeasurementValue::State(value),
    ))
}

/// `stVal` as a plain integer.
pub fn integer(node: &Node, id: u32, attribute: DataAttribute) -> Result<Measurement> {
    let value = decoder::read_integer(node, SubDataAttribute::State)?;
    Ok(Measurement::new(
        id,
        attribute,
        decoder::read_time_or_now(node)?,
        MeasurementValue::Integer(value),
    ))
}

/// `mag.f` of an analogue value.
pub fn magnitude(node: &Node, id: u32, attribute: DataAttribute) -> Result<Measurement> {
    let value = decoder::read_magnitude(node)?;
    Ok(Measurement::new(
        id,
        attribute,
        decoder::read_time_or_now(node)?,
        MeasurementValue::Float(value),
    ))
}

/// `cVal.mag.f` of one phase of a composite value.
pub fn complex_magnitude(node: &Node, id: u32, attribute: DataAttribute) -> Result<Measurement> {
    let value = decoder::read_complex_magnitude(node)?;
    Ok(Measurement::new(
        id,
        attribute,
        decoder::read_time_or_now(node)?,
        MeasurementValue::Float(value),
    ))
}
