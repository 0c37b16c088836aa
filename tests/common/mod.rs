#![allow(dead_code)]

pub use iec61850_bridge::prelude::*;

use iec61850_bridge::iec61850::{Fc, Node, Report, SubValue};
use iec61850_bridge::notifier::{DeviceManagementService, Notifier, RequestMessage};

use chrono::{DateTime, TimeZone, Utc};
use std::sync::{Arc, Mutex};

pub fn common_setup() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Keeps everything it is asked to send.
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<RequestMessage>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<RequestMessage> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, message: RequestMessage) -> Result<()> {
        self.messages.lock().unwrap().push(message);
        Ok(())
    }
}

/// Refuses every message, like an unreachable broker.
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn send(&self, _message: RequestMessage) -> Result<()> {
        bail!("upstream unavailable")
    }
}

pub struct Factory();
impl Factory {
    pub fn recording() -> (Arc<RecordingNotifier>, DeviceManagementService) {
        let notifier = Arc::new(RecordingNotifier::default());
        let service = DeviceManagementService::new(notifier.clone());
        (notifier, service)
    }

    pub fn failing() -> DeviceManagementService {
        DeviceManagementService::new(Arc::new(FailingNotifier))
    }

    pub fn time(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, minute, 0).unwrap()
    }

    pub fn report(device: &str, data_set_ref: &str, sq_num: u32, members: Vec<Node>) -> Report {
        Report {
            device_identification: device.to_string(),
            rpt_id: "AllData".to_string(),
            data_set_ref: data_set_ref.to_string(),
            sq_num: Some(sq_num),
            sub_sq_num: None,
            buf_ovfl: false,
            more_segments_follow: false,
            conf_rev: Some(1),
            entry_id: None,
            time_of_entry: None,
            reason_codes: Vec::new(),
            opt_flds: None,
            members,
        }
    }

    /// `Beh`/`Health` style status member.
    pub fn state(reference: &str, value: u8) -> Node {
        Node::new(reference, Fc::Status)
            .with_leaf("stVal", SubValue::Byte(value))
            .with_leaf("t", SubValue::Timestamp(Self::time(12, 0)))
    }

    pub fn magnitude(reference: &str, fc: Fc, value: f32) -> Node {
        Node::new(reference, fc)
            .with_node("mag", |m| m.with_leaf("f", SubValue::Float32(value)))
            .with_leaf("t", SubValue::Timestamp(Self::time(12, 0)))
    }

    /// Composite member with `phsA`..`phsC` children.
    pub fn phases(reference: &str, values: [f32; 3]) -> Node {
        Node::new(reference, Fc::Measurand)
            .with_node("phsA", |n| Self::phase(n, values[0]))
            .with_node("phsB", |n| Self::phase(n, values[1]))
            .with_node("phsC", |n| Self::phase(n, values[2]))
    }

    fn phase(node: Node, value: f32) -> Node {
        node.with_node("cVal", |c| c.with_node("mag", |m| m.with_leaf("f", SubValue::Float32(value))))
            .with_leaf("q", SubValue::Int16(0))
            .with_leaf("t", SubValue::Timestamp(Self::time(12, 0)))
    }

    pub fn evn_rpn(index: u8, code: u8, sw_num: u8, trigger_time: DateTime<Utc>) -> Node {
        Node::new(&format!("SWDeviceGenericIO/EVNGGIO1.EvnRpn{}", index), Fc::Status)
            .with_leaf("evnType", SubValue::Byte(code))
            .with_leaf("swNum", SubValue::Byte(sw_num))
            .with_leaf("trgType", SubValue::Byte(1))
            .with_leaf("trgTime", SubValue::Timestamp(trigger_time))
            .with_leaf("remark", SubValue::VisibleString(String::new()))
    }

    pub fn config(yaml: &str) -> ConfigWrapper {
        ConfigWrapper::from_config(Config::from_yaml(yaml).unwrap())
    }

    pub fn inventory() -> ConfigWrapper {
        Self::config(
            r#"
devices:
  - device_identification: RTU-1
    ied: zown_rtu
  - device_identification: SSLD-1
    ied: flex_ovl
    output_settings:
      - { internal_id: 1, external_id: 101 }
      - { internal_id: 2, external_id: 102 }
"#,
        )
    }
}
