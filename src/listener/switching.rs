use super::{accept, closed_message, ClientEventListener, ReportOutcome, SequenceBaseline};
use crate::prelude::*;

use crate::event::{EventNotification, EventTypeMapping};
use crate::handler::SwitchingEventHandler;
use crate::iec61850::Report;
use crate::notifier::DeviceManagementService;
use crate::output_index::DeviceOutputIndexMap;

use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct EventBuffer {
    events: Vec<EventNotification>,
    closed: bool,
}

/// Listener for relay switching devices.
///
/// Events are held until the association closes, then sorted by trigger
/// time and sent in one batch. Report framing can put events out of order;
/// the platform expects them in the order they happened.
pub struct SwitchingEventListener {
    device_identification: String,
    handler: Arc<SwitchingEventHandler>,
    index_map: DeviceOutputIndexMap,
    baseline: SequenceBaseline,
    service: DeviceManagementService,
    buffer: Mutex<EventBuffer>,
}

impl SwitchingEventListener {
    pub fn new(
        device_identification: &str,
        handler: Arc<SwitchingEventHandler>,
        index_map: DeviceOutputIndexMap,
        service: DeviceManagementService,
    ) -> Self {
        Self {
            device_identification: device_identification.to_string(),
            handler,
            index_map,
            baseline: SequenceBaseline::new(),
            service,
            buffer: Mutex::new(EventBuffer::default()),
        }
    }

    pub fn buffered(&self) -> usize {
        self.lock().events.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EventBuffer> {
        self.buffer.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn decode(&self, report: &Report) -> Vec<EventNotification> {
        let mut notifications = Vec::new();

        for member in &report.members {
            let event = match self.handler.handle_member(member) {
                Ok(Some(event)) => event,
                Ok(None) => {
                    warn!(
                        "device {}: unsupported member {}, skipping",
                        self.device_identification, member.reference
                    );
                    continue;
                }
                Err(e) => {
                    warn!(
                        "device {}: report {} sqNum {:?}: cannot decode event {}: {}",
                        self.device_identification, report.rpt_id, report.sq_num, member.reference, e
                    );
                    continue;
                }
            };

            match event.event_type {
                EventTypeMapping::Mapped(_) => {
                    let index = self.index_map.external_index(event.internal_index);
                    if let Some(notification) = event.into_notification(&self.device_identification, index) {
                        notifications.push(notification);
                    }
                }
                EventTypeMapping::Unmapped(code) => info!(
                    "device {}: event code {} in {} has no platform event type, skipping",
                    self.device_identification, code, member.reference
                ),
                EventTypeMapping::Unknown(code) => warn!(
                    "device {}: unknown event code {} in {}, skipping",
                    self.device_identification, code, member.reference
                ),
            }
        }

        notifications
    }
}

impl ClientEventListener for SwitchingEventListener {
    fn device_identification(&self) -> &str {
        &self.device_identification
    }

    fn set_sq_num(&self, sq_num: u32) {
        debug!("device {}: sqNum baseline {}", self.device_identification, sq_num);
        self.baseline.set(sq_num);
    }

    fn new_report(&self, report: &Report) -> ReportOutcome {
        if self.is_closed() {
            warn!(
                "device {}: association already closed, dropping report {}",
                self.device_identification, report.rpt_id
            );
            return ReportOutcome::Closed;
        }

        if !accept(&self.baseline, report) {
            return ReportOutcome::Stale;
        }

        let notifications = self.decode(report);
        let count = notifications.len();

        let mut buffer = self.lock();
        if buffer.closed {
            warn!(
                "device {}: association closed while decoding report {}, dropping {} events",
                self.device_identification, report.rpt_id, count
            );
            return ReportOutcome::Closed;
        }
        buffer.events.extend(notifications);
        debug!(
            "device {}: {} events buffered ({} in total)",
            self.device_identification,
            count,
            buffer.events.len()
        );

        ReportOutcome::Buffered(count)
    }

    fn association_closed(&self, cause: Option<&str>) -> usize {
        closed_message(&self.device_identification, cause);

        let mut events = {
            let mut buffer = self.lock();
            if buffer.closed {
                return 0;
            }
            buffer.closed = true;
            std::mem::take(&mut buffer.events)
        };

        if events.is_empty() {
            return 0;
        }

        events.sort_by_key(|e| e.date_time);
        let count = events.len();
        info!("device {}: flushing {} buffered events", self.device_identification, count);

        if self.service.send_events(&self.device_identification, events) {
            count
        } else {
            0
        }
    }
}
