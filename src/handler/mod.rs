//! Report handlers: one value per dataset template, picked from the registry
//! by the dataset reference a report carries.

pub mod battery;
pub mod lmgc;
pub mod photovoltaic;
pub mod pq;
pub mod switching;

pub use battery::BatteryHandler;
pub use lmgc::LmgcHandler;
pub use photovoltaic::PhotovoltaicHandler;
pub use pq::PowerQualityHandler;
pub use switching::SwitchingEventHandler;

use crate::error::TranslationError;
use crate::iec61850::Node;
use crate::measurement::{Measurement, MeasurementResultSystemIdentifier, SystemType};
use crate::translator::pq::PqCommandTable;

use enum_dispatch::*;
use serde::Deserialize;
use std::sync::Arc;

/// What translating one member produced. Empty means the member is not one
/// this handler knows; composite members yield one entry per child.
pub type MemberResults = Vec<Result<Measurement, TranslationError>>;

#[enum_dispatch]
pub trait ReportHandler {
    fn system_id(&self) -> u32;
    fn system_type(&self) -> SystemType;

    fn handle_member(&self, member: &Node) -> MemberResults;

    fn create_result(&self, measurements: Vec<Measurement>) -> MeasurementResultSystemIdentifier {
        MeasurementResultSystemIdentifier {
            id: self.system_id(),
            system_type: self.system_type(),
            measurements,
        }
    }
}

#[enum_dispatch(ReportHandler)]
#[derive(Clone, Debug)]
pub enum Handler {
    Photovoltaic(PhotovoltaicHandler),
    Battery(BatteryHandler),
    Lmgc(LmgcHandler),
    PowerQuality(PowerQualityHandler),
}

/// Device family a dataset row in the config refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Pv,
    Battery,
    Lmgc,
    Pq,
}

impl Handler {
    pub fn for_family(family: Family, system_id: u32, pq_commands: &Arc<PqCommandTable>) -> anyhow::Result<Self> {
        Ok(match family {
            Family::Pv => PhotovoltaicHandler::new(system_id).into(),
            Family::Battery => BatteryHandler::new(system_id).into(),
            Family::Lmgc => LmgcHandler::new(system_id).into(),
            Family::Pq => PowerQualityHandler::new(system_id, Arc::clone(pq_commands))?.into(),
        })
    }
}

/// Single translation as a result list.
fn one(result: Result<Measurement, TranslationError>) -> MemberResults {
    vec![result]
}
