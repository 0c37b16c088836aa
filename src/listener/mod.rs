//! One event listener per live device association. Listeners filter stale
//! reports, drive the handlers and hand results to the notifier.

pub mod factory;
pub mod freshness;
pub mod rtu;
pub mod switching;

pub use factory::{DeviceInventory, ListenerFactory};
pub use freshness::{Freshness, SequenceBaseline};
pub use rtu::RtuEventListener;
pub use switching::SwitchingEventListener;

use crate::prelude::*;

use crate::iec61850::Report;

use enum_dispatch::*;

/// What became of one report.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReportOutcome {
    /// Measurements handed to the notifier.
    Forwarded(usize),
    /// Events held until the association closes.
    Buffered(usize),
    Stale,
    UnknownDataset,
    /// The dataset carried no members, nothing was sent.
    Empty,
    DeliveryFailed,
    /// Arrived after the association was closed.
    Closed,
}

#[enum_dispatch]
pub trait ClientEventListener {
    fn device_identification(&self) -> &str;

    /// Sets the sequence number floor. Called once before reporting is
    /// enabled on the device.
    fn set_sq_num(&self, sq_num: u32);

    fn new_report(&self, report: &Report) -> ReportOutcome;

    /// Returns the number of events flushed to the platform.
    fn association_closed(&self, cause: Option<&str>) -> usize;
}

#[enum_dispatch(ClientEventListener)]
pub enum Listener {
    Rtu(RtuEventListener),
    Switching(SwitchingEventListener),
}

/// Logs the report envelope and applies the freshness filter. False means
/// the report must not be processed.
fn accept(baseline: &SequenceBaseline, report: &Report) -> bool {
    info!("newReport for {}", report.description());
    debug!("{}", report.details());

    if report.buf_ovfl {
        warn!(
            "device {}: buffer overflow reported, history was lost before sqNum {}",
            report.device_identification,
            report.sq_num.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string())
        );
    }

    match baseline.check(report.sq_num) {
        Freshness::Fresh => true,
        Freshness::Stale { baseline } => {
            warn!(
                "device {}: skipping report {} with sqNum {:?}, already delivered (baseline {})",
                report.device_identification, report.rpt_id, report.sq_num, baseline
            );
            false
        }
    }
}

fn closed_message(device_identification: &str, cause: Option<&str>) {
    match cause {
        Some(cause) => info!("device {}: association closed: {}", device_identification, cause),
        None => info!("device {}: association closed", device_identification),
    }
}
