use super::{one, MemberResults, ReportHandler};
use crate::iec61850::{DataAttribute, Fc, LogicalNode, Node};
use crate::measurement::SystemType;
use crate::translator::battery;

#[derive(Clone, Debug)]
pub struct BatteryHandler {
    system_id: u32,
}

impl BatteryHandler {
    pub fn new(system_id: u32) -> Self {
        Self { system_id }
    }
}

impl ReportHandler for BatteryHandler {
    fn system_id(&self) -> u32 {
        self.system_id
    }

    fn system_type(&self) -> SystemType {
        SystemType::Battery
    }

    fn handle_member(&self, member: &Node) -> MemberResults {
        let status = member.fc == Some(Fc::Status);

        match DataAttribute::from_node_name(member.name()) {
            Some(DataAttribute::Behavior) => one(battery::translate_behavior(member)),
            Some(DataAttribute::Health) => one(battery::translate_health(member)),
            Some(DataAttribute::OperationalHours) => one(battery::translate_operational_hours(member)),
            // TotW is reported on both measurement nodes; the node decides the channel
            Some(DataAttribute::ActualPower) => [LogicalNode::MeasurementOne, LogicalNode::MeasurementTwo]
                .into_iter()
                .find(|ln| member.is_under(*ln))
                .map(|ln| one(battery::translate_actual_power(member, ln)))
                .unwrap_or_default(),
            Some(DataAttribute::NetRealEnergy) if status => one(battery::translate_net_real_energy(member)),
            Some(DataAttribute::NetApparentEnergy) if status => {
                one(battery::translate_net_apparent_energy(member))
            }
            _ => Vec::new(),
        }
    }
}
