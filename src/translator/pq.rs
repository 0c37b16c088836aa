use super::Result;
use crate::iec61850::{DataAttribute, Node};
use crate::measurement::Measurement;

use std::collections::HashMap;

/// How a power-quality node is read.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PqCommand {
    State(DataAttribute),
    Magnitude(DataAttribute),
    ComplexMagnitude(DataAttribute),
    Integer(DataAttribute),
}

impl PqCommand {
    pub fn attribute(&self) -> DataAttribute {
        match self {
            Self::State(a) | Self::Magnitude(a) | Self::ComplexMagnitude(a) | Self::Integer(a) => *a,
        }
    }

    /// `id` is the instance the node belongs to, 1 for single-instance nodes.
    pub fn translate(&self, node: &Node, id: u32) -> Result<Measurement> {
        match self {
            Self::State(a) => super::state(node, id, *a),
            Self::Magnitude(a) => super::magnitude(node, id, *a),
            Self::ComplexMagnitude(a) => super::complex_magnitude(node, id, *a),
            Self::Integer(a) => super::integer(node, id, *a),
        }
    }
}

/// Node name (`Hz`, `PNV.phsA`, ...) to command. Built once and handed to
/// the power-quality handler.
#[derive(Clone, Debug)]
pub struct PqCommandTable {
    commands: HashMap<&'static str, PqCommand>,
}

impl Default for PqCommandTable {
    fn default() -> Self {
        use DataAttribute::*;

        let commands = [
            PqCommand::State(Behavior),
            PqCommand::State(Health),
            PqCommand::Magnitude(Frequency),
            PqCommand::ComplexMagnitude(PhaseToNeutralVoltagePhaseA),
            PqCommand::ComplexMagnitude(PhaseToNeutralVoltagePhaseB),
            PqCommand::ComplexMagnitude(PhaseToNeutralVoltagePhaseC),
            PqCommand::ComplexMagnitude(PowerFactorPhaseA),
            PqCommand::ComplexMagnitude(PowerFactorPhaseB),
            PqCommand::ComplexMagnitude(PowerFactorPhaseC),
            PqCommand::ComplexMagnitude(ImpedancePhaseA),
            PqCommand::ComplexMagnitude(ImpedancePhaseB),
            PqCommand::ComplexMagnitude(ImpedancePhaseC),
            PqCommand::Integer(VoltageDips),
        ]
        .into_iter()
        .map(|c| (c.attribute().description(), c))
        .collect();

        Self { commands }
    }
}

impl PqCommandTable {
    pub fn get(&self, node_name: &str) -> Option<PqCommand> {
        self.commands.get(node_name).copied()
    }

    /// Nodes whose measurement id comes from the logical node instance.
    pub fn uses_instance_id(attribute: DataAttribute) -> bool {
        !matches!(attribute, DataAttribute::Behavior | DataAttribute::Health)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_keyed_by_node_name() {
        let table = PqCommandTable::default();

        assert_eq!(table.get("Hz"), Some(PqCommand::Magnitude(DataAttribute::Frequency)));
        assert_eq!(
            table.get("PF.phsC"),
            Some(PqCommand::ComplexMagnitude(DataAttribute::PowerFactorPhaseC))
        );
        assert_eq!(table.get("PF"), None);
        assert_eq!(table.get("TotW"), None);
    }

    #[test]
    fn only_state_nodes_ignore_the_instance() {
        assert!(!PqCommandTable::uses_instance_id(DataAttribute::Behavior));
        assert!(!PqCommandTable::uses_instance_id(DataAttribute::Health));
        assert!(PqCommandTable::uses_instance_id(DataAttribute::Frequency));
        assert!(PqCommandTable::uses_instance_id(DataAttribute::VoltageDips));
    }
}
