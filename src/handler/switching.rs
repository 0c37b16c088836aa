use crate::error::TranslationError;
use crate::event::{EventCodeTable, EventNotification, EventTypeMapping, TriggerType};
use crate::iec61850::{decoder, Node, SubDataAttribute};

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Members of a switching device's event dataset are named `EvnRpn<n>`.
const EVENT_MEMBER_PREFIX: &str = "EvnRpn";

/// One decoded `EvnRpn` member, still in device terms.
#[derive(Clone, Debug, PartialEq)]
pub struct SwitchingEvent {
    pub event_type: EventTypeMapping,
    /// Relay index as the device numbers it.
    pub internal_index: u8,
    pub date_time: DateTime<Utc>,
    pub description: String,
}

impl SwitchingEvent {
    /// Platform notification for a mapped event, with the relay index already
    /// translated to the platform's numbering.
    pub fn into_notification(self, device_identification: &str, external_index: u32) -> Option<EventNotification> {
        match self.event_type {
            EventTypeMapping::Mapped(event_type) => Some(EventNotification {
                device_identification: device_identification.to_string(),
                date_time: self.date_time,
                event_type,
                description: self.description,
                index: external_index,
            }),
            _ => None,
        }
    }
}

/// Decodes relay switching events. Registered under the device type tag
/// rather than a dataset reference.
#[derive(Clone, Debug)]
pub struct SwitchingEventHandler {
    codes: Arc<EventCodeTable>,
}

impl SwitchingEventHandler {
    pub fn new(codes: Arc<EventCodeTable>) -> Self {
        Self { codes }
    }

    /// `Ok(None)` for members that are not event records.
    pub fn handle_member(&self, member: &Node) -> Result<Option<SwitchingEvent>, TranslationError> {
        if !member.name().starts_with(EVENT_MEMBER_PREFIX) {
            return Ok(None);
        }

        let code = decoder::read_byte(member, SubDataAttribute::EventType)?;
        let internal_index = decoder::read_byte(member, SubDataAttribute::SwitchNumber)?;
        let trigger = decoder::read_byte(member, SubDataAttribute::TriggerType)?;
        let trigger_time = decoder::read_timestamp(member, SubDataAttribute::TriggerTime)?;
        let remark = match decoder::read_string(member, SubDataAttribute::Remark) {
            Ok(remark) => Some(remark),
            Err(TranslationError::MissingLeaf { .. }) | Err(TranslationError::EmptyLeaf { .. }) => None,
            Err(e) => return Err(e),
        };

        Ok(Some(SwitchingEvent {
            event_type: self.codes.lookup(code),
            internal_index,
            date_time: trigger_time,
            description: describe(trigger, remark.as_deref(), trigger_time),
        }))
    }
}

/// `<trigger>[, remark: <remark>] at <trigger time>`
pub fn describe(trigger: u8, remark: Option<&str>, trigger_time: DateTime<Utc>) -> String {
    let mut description = TriggerType::describe(trigger);
    if let Some(remark) = remark.filter(|r| !r.trim().is_empty()) {
        description.push_str(", remark: ");
        description.push_str(remark);
    }
    format!("{} at {}", description, trigger_time.to_rfc3339())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventType;
    use crate::iec61850::{Fc, SubValue};
    use chrono::TimeZone;

    fn trigger_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 18, 30, 0).unwrap()
    }

    fn evn_rpn(code: u8, remark: Option<&str>) -> Node {
        let node = Node::new("SWDeviceGenericIO/EVNGGIO1.EvnRpn0", Fc::Status)
            .with_leaf("evnType", SubValue::Byte(code))
            .with_leaf("swNum", SubValue::Byte(2))
            .with_leaf("trgType", SubValue::Byte(3))
            .with_leaf("trgTime", SubValue::Timestamp(trigger_time()));
        match remark {
            Some(r) => node.with_leaf("remark", SubValue::VisibleString(r.to_string())),
            None => node,
        }
    }

    fn handler() -> SwitchingEventHandler {
        SwitchingEventHandler::new(Arc::new(EventCodeTable::default()))
    }

    #[test]
    fn decodes_event_record() {
        let event = handler().handle_member(&evn_rpn(4, Some("manual"))).unwrap().unwrap();

        assert_eq!(event.event_type, EventTypeMapping::Mapped(EventType::LightEventsLightOn));
        assert_eq!(event.internal_index, 2);
        assert_eq!(event.date_time, trigger_time());
        assert_eq!(
            event.description,
            "fixed time trigger, remark: manual at 2024-03-01T18:30:00+00:00"
        );
    }

    #[test]
    fn blank_remark_is_left_out() {
        let event = handler().handle_member(&evn_rpn(5, Some(" "))).unwrap().unwrap();
        assert_eq!(event.description, "fixed time trigger at 2024-03-01T18:30:00+00:00");
    }

    #[test]
    fn other_members_are_skipped() {
        let member = Node::new("SWDeviceGenericIO/LLN0.Beh", Fc::Status).with_leaf("stVal", SubValue::Byte(1));
        assert_eq!(handler().handle_member(&member), Ok(None));
    }

    #[test]
    fn unmapped_event_has_no_notification() {
        let event = handler().handle_member(&evn_rpn(18, None)).unwrap().unwrap();
        assert_eq!(event.event_type, EventTypeMapping::Unmapped(18));
        assert!(event.into_notification("SSLD-1", 0).is_none());
    }
}
