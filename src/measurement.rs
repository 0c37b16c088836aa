use crate::iec61850::DataAttribute;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MeasurementValue {
    State(u8),
    Integer(i64),
    Float(f64),
}

/// One translated data attribute.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Measurement {
    /// Physical sub-unit / channel the value belongs to.
    pub id: u32,
    pub node: DataAttribute,
    /// Reserved, always 0.
    pub qualifier: i32,
    pub time: DateTime<Utc>,
    pub value: MeasurementValue,
}

impl Measurement {
    pub fn new(id: u32, node: DataAttribute, time: DateTime<Utc>, value: MeasurementValue) -> Self {
        Self {
            id,
            node,
            qualifier: 0,
            time,
            value,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum SystemType {
    #[serde(rename = "PV")]
    Photovoltaic,
    #[serde(rename = "BATTERY")]
    Battery,
    #[serde(rename = "LMGC")]
    Lmgc,
    #[serde(rename = "PQ")]
    PowerQuality,
}

impl SystemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Photovoltaic => "PV",
            Self::Battery => "BATTERY",
            Self::Lmgc => "LMGC",
            Self::PowerQuality => "PQ",
        }
    }
}

impl std::fmt::Display for SystemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementResultSystemIdentifier {
    pub id: u32,
    pub system_type: SystemType,
    pub measurements: Vec<Measurement>,
}

/// Body of a `GET_DATA` message to the platform.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DataResponse {
    pub systems: Vec<MeasurementResultSystemIdentifier>,
}

impl DataResponse {
    pub fn single(system: MeasurementResultSystemIdentifier) -> Self {
        Self {
            systems: vec![system],
        }
    }

    pub fn measurement_count(&self) -> usize {
        self.systems.iter().map(|s| s.measurements.len()).sum()
    }
}
