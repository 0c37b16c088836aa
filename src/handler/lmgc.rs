use super::{one, MemberResults, ReportHandler};
use crate::iec61850::{DataAttribute, Node};
use crate::measurement::SystemType;
use crate::translator::lmgc;

/// Local microgrid controller. Only reports its own state.
#[derive(Clone, Debug)]
pub struct LmgcHandler {
    system_id: u32,
}

impl LmgcHandler {
    pub fn new(system_id: u32) -> Self {
        Self { system_id }
    }
}

impl ReportHandler for LmgcHandler {
    fn system_id(&self) -> u32 {
        self.system_id
    }

    fn system_type(&self) -> SystemType {
        SystemType::Lmgc
    }

    fn handle_member(&self, member: &Node) -> MemberResults {
        match DataAttribute::from_node_name(member.name()) {
            Some(DataAttribute::Behavior) => one(lmgc::translate_behavior(member)),
            Some(DataAttribute::Health) => one(lmgc::translate_health(member)),
            _ => Vec::new(),
        }
    }
}
