use super::{one, MemberResults, ReportHandler};
use crate::iec61850::Node;
use crate::prelude::*;
use crate::measurement::SystemType;
use crate::translator::pq::PqCommandTable;

use regex::Regex;
use std::sync::Arc;

/// `<prefix>PQ<ld instance>/<ln class><ln instance>.<attribute>`
const INSTANCE_PATTERN: &str = r"^(.*)PQ([1-9]\d*)/(LLN0|DRCC|DGEN|MMXU|GGIO|QVVR)([1-9]\d*)?\.(.*)$";
const INSTANCE_GROUP: usize = 4;

/// Members whose phases arrive as children.
const COMPOSITES: [&str; 3] = ["PNV", "PF", "Z"];

/// Power quality. One handler serves templates with any number of
/// measurement nodes: the measurement id is the instance number of the node
/// the member hangs from.
#[derive(Clone, Debug)]
pub struct PowerQualityHandler {
    system_id: u32,
    commands: Arc<PqCommandTable>,
    instance_pattern: Regex,
}

impl PowerQualityHandler {
    pub fn new(system_id: u32, commands: Arc<PqCommandTable>) -> Result<Self> {
        Ok(Self {
            system_id,
            commands,
            instance_pattern: Regex::new(INSTANCE_PATTERN)?,
        })
    }

    /// Instance number parsed from `reference`, 1 when there is none.
    pub fn instance_id(&self, reference: &str) -> u32 {
        self.instance_pattern
            .captures(reference)
            .and_then(|c| c.get(INSTANCE_GROUP))
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(1)
    }

    fn handle_composite(&self, member: &Node) -> MemberResults {
        let id = self.instance_id(&member.reference);

        member
            .children
            .iter()
            .filter_map(|child| {
                let name = format!("{}.{}", member.name(), child.name());
                let command = self.commands.get(&name);
                if command.is_none() {
                    warn!("no command found for node {} ({})", name, child.reference);
                }
                command.map(|command| command.translate(child, id))
            })
            .collect()
    }
}

impl ReportHandler for PowerQualityHandler {
    fn system_id(&self) -> u32 {
        self.system_id
    }

    fn system_type(&self) -> SystemType {
        SystemType::PowerQuality
    }

    fn handle_member(&self, member: &Node) -> MemberResults {
        if COMPOSITES.contains(&member.name()) {
            return self.handle_composite(member);
        }

        match self.commands.get(member.name()) {
            Some(command) => {
                let id = if PqCommandTable::uses_instance_id(command.attribute()) {
                    self.instance_id(&member.reference)
                } else {
                    1
                };
                one(command.translate(member, id))
            }
            None => Vec::new(),
        }
    }
}
