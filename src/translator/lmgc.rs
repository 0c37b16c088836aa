use super::Result;
use crate::iec61850::{DataAttribute, Node};
use crate::measurement::Measurement;

const SYSTEM_ID: u32 = 1;

pub fn translate_behavior(node: &Node) -> Result<Measurement> {
    super::state(node, SYSTEM_ID, DataAttribute::Behavior)
}

pub fn translate_health(node: &Node) -> Result<Measurement> {
    super::state(node, SYSTEM_ID, DataAttribute::Health)
}
