use chrono::{DateTime, Utc};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::Serialize;
use std::collections::HashMap;

// EventType {{{
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    DiagEventsGeneral,
    DiagEventsUnknownMessageType,
    HardwareFailureRelay,
    LightEventsLightOn,
    LightEventsLightOff,
    LightFailureDaliCommunication,
    LightFailureBallast,
    LightFailureTariffSwitchAttempt,
    TariffEventsTariffOn,
    TariffEventsTariffOff,
    MonitorFailureP1Communication,
    MonitorShortDetected,
    MonitorShortResolved,
    MonitorEventsLongBufferFull,
    MonitorEventsLossOfPower,
    MonitorEventsLocalMode,
    MonitorEventsRemoteMode,
    FirmwareEventsActivating,
    FirmwareEventsDownloadNotfound,
    FirmwareEventsDownloadFailed,
    CommEventsAlternativeChannel,
    CommEventsRecoveredChannel,
} // }}}

/// What the device's event code resolves to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventTypeMapping {
    Mapped(EventType),
    /// A code the devices send that deliberately has no platform event.
    Unmapped(u8),
    Unknown(u8),
}

/// Device event code (`evnType`) to platform event type.
#[derive(Clone, Debug)]
pub struct EventCodeTable {
    codes: HashMap<u8, Option<EventType>>,
}

impl Default for EventCodeTable {
    fn default() -> Self {
        use EventType::*;

        let codes = [
            (1, Some(DiagEventsGeneral)),
            (2, Some(DiagEventsUnknownMessageType)),
            (3, Some(HardwareFailureRelay)),
            (4, Some(LightEventsLightOn)),
            (5, Some(LightEventsLightOff)),
            (6, Some(LightFailureDaliCommunication)),
            (7, Some(LightFailureBallast)),
            (8, Some(LightFailureTariffSwitchAttempt)),
            (9, Some(TariffEventsTariffOn)),
            (10, Some(TariffEventsTariffOff)),
            (11, Some(MonitorFailureP1Communication)),
            (12, Some(MonitorShortDetected)),
            (13, Some(MonitorShortResolved)),
            (14, Some(MonitorEventsLongBufferFull)),
            (15, Some(MonitorEventsLossOfPower)),
            (16, Some(MonitorEventsLocalMode)),
            (17, Some(MonitorEventsRemoteMode)),
            (18, None), // schedule received, informational only
            (19, Some(FirmwareEventsActivating)),
            (20, Some(FirmwareEventsDownloadNotfound)),
            (21, Some(FirmwareEventsDownloadFailed)),
            (22, None), // configuration changed
            (23, Some(CommEventsAlternativeChannel)),
            (24, Some(CommEventsRecoveredChannel)),
        ]
        .into_iter()
        .collect();

        Self { codes }
    }
}

impl EventCodeTable {
    pub fn new(codes: HashMap<u8, Option<EventType>>) -> Self {
        Self { codes }
    }

    pub fn lookup(&self, code: u8) -> EventTypeMapping {
        match self.codes.get(&code) {
            Some(Some(event_type)) => EventTypeMapping::Mapped(*event_type),
            Some(None) => EventTypeMapping::Unmapped(code),
            None => EventTypeMapping::Unknown(code),
        }
    }
}

// TriggerType {{{
#[derive(Clone, Copy, Debug, Eq, PartialEq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum TriggerType {
    LightTrigger = 1,
    AdHoc = 2,
    FixedTime = 3,
    Autonomous = 4,
}

impl TriggerType {
    pub fn description(&self) -> &'static str {
        match self {
            Self::LightTrigger => "light trigger (sensor trigger)",
            Self::AdHoc => "ad-hoc trigger",
            Self::FixedTime => "fixed time trigger",
            Self::Autonomous => "autonomous trigger",
        }
    }

    pub fn describe(code: u8) -> String {
        Self::try_from(code)
            .map(|t| t.description().to_string())
            .unwrap_or_else(|_| format!("trigger type {}", code))
    }
} // }}}

/// A switching event as forwarded to the platform.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventNotification {
    pub device_identification: String,
    pub date_time: DateTime<Utc>,
    pub event_type: EventType,
    pub description: String,
    /// External relay index, 0 when none applies or no mapping exists.
    pub index: u32,
}
