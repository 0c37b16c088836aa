use super::{one, MemberResults, ReportHandler};
use crate::iec61850::{DataAttribute, Node};
use crate::measurement::SystemType;
use crate::translator::photovoltaic;

#[derive(Clone, Debug)]
pub struct PhotovoltaicHandler {
    system_id: u32,
}

impl PhotovoltaicHandler {
    pub fn new(system_id: u32) -> Self {
        Self { system_id }
    }
}

impl ReportHandler for PhotovoltaicHandler {
    fn system_id(&self) -> u32 {
        self.system_id
    }

    fn system_type(&self) -> SystemType {
        SystemType::Photovoltaic
    }

    fn handle_member(&self, member: &Node) -> MemberResults {
        match DataAttribute::from_node_name(member.name()) {
            Some(DataAttribute::Behavior) => one(photovoltaic::translate_behavior(member)),
            Some(DataAttribute::Health) => one(photovoltaic::translate_health(member)),
            Some(DataAttribute::GeneratorSpeed) => one(photovoltaic::translate_generator_speed(member)),
            Some(DataAttribute::OperationalHours) => one(photovoltaic::translate_operational_hours(member)),
            _ => Vec::new(),
        }
    }
}
