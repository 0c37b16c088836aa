use super::{accept, closed_message, ClientEventListener, ReportOutcome, SequenceBaseline};
use crate::prelude::*;

use crate::handler::ReportHandler;
use crate::iec61850::Report;
use crate::notifier::DeviceManagementService;
use crate::registry::RtuRegistry;

/// Listener for telemetry devices. Each report resolves to a handler by its
/// dataset reference and produces one measurement result.
pub struct RtuEventListener {
    device_identification: String,
    registry: RtuRegistry,
    baseline: SequenceBaseline,
    service: DeviceManagementService,
}

impl RtuEventListener {
    pub fn new(device_identification: &str, registry: RtuRegistry, service: DeviceManagementService) -> Self {
        Self {
            device_identification: device_identification.to_string(),
            registry,
            baseline: SequenceBaseline::new(),
            service,
        }
    }
}

impl ClientEventListener for RtuEventListener {
    fn device_identification(&self) -> &str {
        &self.device_identification
    }

    fn set_sq_num(&self, sq_num: u32) {
        debug!("device {}: sqNum baseline {}", self.device_identification, sq_num);
        self.baseline.set(sq_num);
    }

    fn new_report(&self, report: &Report) -> ReportOutcome {
        if !accept(&self.baseline, report) {
            return ReportOutcome::Stale;
        }

        let handler = match self.registry.resolve(&report.data_set_ref) {
            Some(handler) => handler,
            None => {
                warn!(
                    "device {}: no report handler for dataset {}, dropping report {}",
                    self.device_identification, report.data_set_ref, report.rpt_id
                );
                return ReportOutcome::UnknownDataset;
            }
        };

        if report.members.is_empty() {
            warn!(
                "device {}: no members in dataset {} of report {}, nothing to send",
                self.device_identification, report.data_set_ref, report.rpt_id
            );
            return ReportOutcome::Empty;
        }

        let mut measurements = Vec::new();
        for member in &report.members {
            let results = handler.handle_member(member);
            if results.is_empty() {
                warn!(
                    "device {}: unsupported member {} in dataset {}, skipping",
                    self.device_identification, member.reference, report.data_set_ref
                );
                continue;
            }

            for result in results {
                match result {
                    Ok(measurement) => measurements.push(measurement),
                    Err(e) => warn!(
                        "device {}: report {} sqNum {:?}: cannot translate member {}: {}",
                        self.device_identification, report.rpt_id, report.sq_num, member.reference, e
                    ),
                }
            }
        }

        let count = measurements.len();
        let result = handler.create_result(measurements);
        if self.service.send_measurements(&self.device_identification, result) {
            ReportOutcome::Forwarded(count)
        } else {
            ReportOutcome::DeliveryFailed
        }
    }

    fn association_closed(&self, cause: Option<&str>) -> usize {
        closed_message(&self.device_identification, cause);
        0
    }
}
