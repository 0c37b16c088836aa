use serde::{Serialize, Serializer};

// LogicalNode {{{
/// Logical nodes whose name decides how a member is read.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LogicalNode {
    MeasurementOne, // actual power in
    MeasurementTwo, // actual power out
}

impl LogicalNode {
    pub fn description(&self) -> &'static str {
        match self {
            Self::MeasurementOne => "MMXN1",
            Self::MeasurementTwo => "MMXN2",
        }
    }
} // }}}

// DataAttribute {{{
/// Semantic label of a measurement. Serialises to the attribute name the
/// platform knows it by.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DataAttribute {
    Behavior,
    Health,
    OperationalHours,
    GeneratorSpeed,
    ActualPower,
    NetRealEnergy,
    NetApparentEnergy,
    Frequency,
    PhaseToNeutralVoltagePhaseA,
    PhaseToNeutralVoltagePhaseB,
    PhaseToNeutralVoltagePhaseC,
    PowerFactorPhaseA,
    PowerFactorPhaseB,
    PowerFactorPhaseC,
    ImpedancePhaseA,
    ImpedancePhaseB,
    ImpedancePhaseC,
    VoltageDips,
}

impl DataAttribute {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Behavior => "Beh",
            Self::Health => "Health",
            Self::OperationalHours => "OpTmsRs",
            Self::GeneratorSpeed => "GnSpd",
            Self::ActualPower => "TotW",
            Self::NetRealEnergy => "TotWh",
            Self::NetApparentEnergy => "TotVAh",
            Self::Frequency => "Hz",
            Self::PhaseToNeutralVoltagePhaseA => "PNV.phsA",
            Self::PhaseToNeutralVoltagePhaseB => "PNV.phsB",
            Self::PhaseToNeutralVoltagePhaseC => "PNV.phsC",
            Self::PowerFactorPhaseA => "PF.phsA",
            Self::PowerFactorPhaseB => "PF.phsB",
            Self::PowerFactorPhaseC => "PF.phsC",
            Self::ImpedancePhaseA => "Z.phsA",
            Self::ImpedancePhaseB => "Z.phsB",
            Self::ImpedancePhaseC => "Z.phsC",
            Self::VoltageDips => "VolDips",
        }
    }

    /// Looks an attribute up by node name. Children of composite nodes are
    /// named `<parent>.<child>`.
    pub fn from_node_name(name: &str) -> Option<Self> {
        ALL.iter().copied().find(|a| a.description() == name)
    }
}

const ALL: [DataAttribute; 18] = [
    DataAttribute::Behavior,
    DataAttribute::Health,
    DataAttribute::OperationalHours,
    DataAttribute::GeneratorSpeed,
    DataAttribute::ActualPower,
    DataAttribute::NetRealEnergy,
    DataAttribute::NetApparentEnergy,
    DataAttribute::Frequency,
    DataAttribute::PhaseToNeutralVoltagePhaseA,
    DataAttribute::PhaseToNeutralVoltagePhaseB,
    DataAttribute::PhaseToNeutralVoltagePhaseC,
    DataAttribute::PowerFactorPhaseA,
    DataAttribute::PowerFactorPhaseB,
    DataAttribute::PowerFactorPhaseC,
    DataAttribute::ImpedancePhaseA,
    DataAttribute::ImpedancePhaseB,
    DataAttribute::ImpedancePhaseC,
    DataAttribute::VoltageDips,
];

impl std::fmt::Display for DataAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl Serialize for DataAttribute {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.description())
    }
} // }}}

// SubDataAttribute {{{
/// Leaf names below a data attribute.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SubDataAttribute {
    State,
    Time,
    Magnitude,
    Float,
    ComplexValue,
    EventType,
    SwitchNumber,
    TriggerType,
    TriggerTime,
    Remark,
}

impl SubDataAttribute {
    pub fn description(&self) -> &'static str {
        match self {
            Self::State => "stVal",
            Self::Time => "t",
            Self::Magnitude => "mag",
            Self::Float => "f",
            Self::ComplexValue => "cVal",
            Self::EventType => "evnType",
            Self::SwitchNumber => "swNum",
            Self::TriggerType => "trgType",
            Self::TriggerTime => "trgTime",
            Self::Remark => "remark",
        }
    }
} // }}}
