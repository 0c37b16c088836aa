use crate::prelude::*;

use crate::event::EventNotification;
use crate::measurement::{DataResponse, MeasurementResultSystemIdentifier};

use serde::Serialize;
use std::sync::Arc;

/// Ids used for messages no platform request asked for.
pub const NO_CORRELATION_UID: &str = "no-correlationUid";
pub const NO_ORGANISATION: &str = "no-organisation";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    GetData,
    AddEventNotification,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetData => "GET_DATA",
            Self::AddEventNotification => "ADD_EVENT_NOTIFICATION",
        }
    }
}

// RequestMessage {{{
/// Envelope for everything sent to the platform.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMessage {
    pub correlation_uid: String,
    pub organisation_identification: String,
    pub device_identification: String,
    pub message_type: MessageType,
    pub payload: serde_json::Value,
}

impl RequestMessage {
    /// A message for a report the device pushed on its own.
    pub fn spontaneous<T: Serialize>(device_identification: &str, message_type: MessageType, payload: &T) -> Result<Self> {
        Ok(Self {
            correlation_uid: NO_CORRELATION_UID.to_string(),
            organisation_identification: NO_ORGANISATION.to_string(),
            device_identification: device_identification.to_string(),
            message_type,
            payload: serde_json::to_value(payload)?,
        })
    }

    /// Topic below the MQTT namespace.
    pub fn topic(&self) -> String {
        format!("{}/{}", self.device_identification, self.message_type.as_str())
    }
} // }}}

/// Upstream delivery. One call per message, no retries at this level.
pub trait Notifier: Send + Sync {
    fn send(&self, message: RequestMessage) -> Result<()>;
}

/// Hands messages to the MQTT publisher.
pub struct ChannelNotifier {
    to_mqtt: mqtt::Sender,
}

impl ChannelNotifier {
    pub fn new(channels: &Channels) -> Self {
        Self {
            to_mqtt: channels.to_mqtt.clone(),
        }
    }
}

impl Notifier for ChannelNotifier {
    fn send(&self, message: RequestMessage) -> Result<()> {
        let message = mqtt::Message {
            topic: message.topic(),
            retain: false,
            payload: serde_json::to_string(&message)?,
        };

        if self.to_mqtt.send(mqtt::ChannelData::Message(message)).is_err() {
            bail!("send(to_mqtt) failed - channel closed?");
        }

        Ok(())
    }
}

/// Used when MQTT is disabled: messages only go to the log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, message: RequestMessage) -> Result<()> {
        info!("{} = {}", message.topic(), serde_json::to_string(&message.payload)?);
        Ok(())
    }
}

// DeviceManagementService {{{
/// Wraps results in request messages and hands them to the notifier.
/// Failures are logged and swallowed; the caller learns only whether the
/// hand-over worked.
#[derive(Clone)]
pub struct DeviceManagementService {
    notifier: Arc<dyn Notifier>,
}

impl DeviceManagementService {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    pub fn send_measurements(&self, device_identification: &str, result: MeasurementResultSystemIdentifier) -> bool {
        let system = format!("{} {}", result.system_type, result.id);
        let response = DataResponse::single(result);

        let sent = RequestMessage::spontaneous(device_identification, MessageType::GetData, &response)
            .and_then(|message| self.notifier.send(message));

        match sent {
            Ok(()) => {
                debug!(
                    "device {}: sent {} measurements for system {}",
                    device_identification,
                    response.measurement_count(),
                    system
                );
                true
            }
            Err(e) => {
                error!(
                    "device {}: failed to send measurements for system {}: {}",
                    device_identification, system, e
                );
                false
            }
        }
    }

    pub fn send_events(&self, device_identification: &str, events: Vec<EventNotification>) -> bool {
        let count = events.len();

        let sent = RequestMessage::spontaneous(device_identification, MessageType::AddEventNotification, &events)
            .and_then(|message| self.notifier.send(message));

        match sent {
            Ok(()) => {
                debug!("device {}: sent {} event notifications", device_identification, count);
                true
            }
            Err(e) => {
                error!(
                    "device {}: failed to send {} event notifications: {}",
                    device_identification, count, e
                );
                false
            }
        }
    }
} // }}}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::SystemType;

    struct Refusing;

    impl Notifier for Refusing {
        fn send(&self, _message: RequestMessage) -> Result<()> {
            bail!("broker unreachable")
        }
    }

    #[test]
    fn spontaneous_message_uses_placeholder_ids() {
        let message = RequestMessage::spontaneous("RTU-1", MessageType::GetData, &Vec::<u8>::new()).unwrap();
        assert_eq!(message.correlation_uid, "no-correlationUid");
        assert_eq!(message.organisation_identification, "no-organisation");
        assert_eq!(message.topic(), "RTU-1/GET_DATA");

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["messageType"], "GET_DATA");
        assert_eq!(json["deviceIdentification"], "RTU-1");
    }

    #[test]
    fn delivery_failure_is_swallowed() {
        let service = DeviceManagementService::new(Arc::new(Refusing));
        let result = MeasurementResultSystemIdentifier {
            id: 1,
            system_type: SystemType::Photovoltaic,
            measurements: Vec::new(),
        };
        assert!(!service.send_measurements("RTU-1", result));
        assert!(!service.send_events("SSLD-1", Vec::new()));
    }

    #[test]
    fn channel_notifier_publishes_below_device() {
        let channels = Channels::new();
        let mut rx = channels.to_mqtt.subscribe();
        let notifier = ChannelNotifier::new(&channels);

        let message = RequestMessage::spontaneous("SSLD-1", MessageType::AddEventNotification, &Vec::<u8>::new()).unwrap();
        notifier.send(message).unwrap();

        match rx.try_recv().unwrap() {
            mqtt::ChannelData::Message(m) => {
                assert_eq!(m.topic, "SSLD-1/ADD_EVENT_NOTIFICATION");
                assert!(!m.retain);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
