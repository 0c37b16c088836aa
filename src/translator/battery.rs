use super::Result;
use crate::iec61850::{DataAttribute, LogicalNode, Node};
use crate::measurement::Measurement;

const SYSTEM_ID: u32 = 1;

pub fn translate_behavior(node: &Node) -> Result<Measurement> {
    super::state(node, SYSTEM_ID, DataAttribute::Behavior)
}

pub fn translate_health(node: &Node) -> Result<Measurement> {
    super::state(node, SYSTEM_ID, DataAttribute::Health)
}

pub fn translate_operational_hours(node: &Node) -> Result<Measurement> {
    super::integer(node, SYSTEM_ID, DataAttribute::OperationalHours)
}

/// Power measured on one of the two MMXN channels: 1 is power in, 2 power out.
pub fn translate_actual_power(node: &Node, channel: LogicalNode) -> Result<Measurement> {
    let id = match channel {
        LogicalNode::MeasurementTwo => 2,
        _ => 1,
    };
    super::magnitude(node, id, DataAttribute::ActualPower)
}

pub fn translate_net_real_energy(node: &Node) -> Result<Measurement> {
    super::magnitude(node, SYSTEM_ID, DataAttribute::NetRealEnergy)
}

pub fn translate_net_apparent_energy(node: &Node) -> Result<Measurement> {
    super::magnitude(node, SYSTEM_ID, DataAttribute::NetApparentEnergy)
}
