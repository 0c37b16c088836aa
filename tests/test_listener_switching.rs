mod common;
use common::*;

use iec61850_bridge::iec61850::{Fc, Node, SubValue};
use iec61850_bridge::listener::{ClientEventListener, ReportOutcome, SwitchingEventListener};
use iec61850_bridge::notifier::{DeviceManagementService, MessageType};
use iec61850_bridge::output_index::{DeviceOutputIndexMap, OutputSetting};
use iec61850_bridge::registry::{Registries, FLEX_OVL};

const EVENTS: &str = "SWDeviceGenericIO/LLN0$Events";

fn listener(service: DeviceManagementService) -> SwitchingEventListener {
    let registries = Registries::with_defaults().unwrap();
    let handler = registries.switching.resolve(FLEX_OVL).unwrap();
    let index_map = DeviceOutputIndexMap::new(
        "SSLD-1",
        &[
            OutputSetting { internal_id: 1, external_id: 101 },
            OutputSetting { internal_id: 2, external_id: 102 },
        ],
    );
    SwitchingEventListener::new("SSLD-1", handler, index_map, service)
}

#[test]
fn events_are_held_until_close() {
    common_setup();

    let (notifier, service) = Factory::recording();
    let subject = listener(service);

    let report = Factory::report("SSLD-1", EVENTS, 1, vec![Factory::evn_rpn(0, 4, 1, Factory::time(18, 0))]);
    assert_eq!(subject.new_report(&report), ReportOutcome::Buffered(1));
    assert!(notifier.messages().is_empty());
    assert_eq!(subject.buffered(), 1);

    assert_eq!(subject.association_closed(Some("connection reset")), 1);

    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message_type, MessageType::AddEventNotification);
    let event = &messages[0].payload[0];
    assert_eq!(event["eventType"], "LIGHT_EVENTS_LIGHT_ON");
    assert_eq!(event["index"], 101);
    assert_eq!(event["deviceIdentification"], "SSLD-1");
}

#[test]
fn flush_is_sorted_by_trigger_time() {
    common_setup();

    let (notifier, service) = Factory::recording();
    let subject = listener(service);

    let first = Factory::report(
        "SSLD-1",
        EVENTS,
        1,
        vec![
            Factory::evn_rpn(0, 5, 1, Factory::time(23, 0)),
            Factory::evn_rpn(1, 4, 1, Factory::time(19, 0)),
        ],
    );
    let second = Factory::report("SSLD-1", EVENTS, 2, vec![Factory::evn_rpn(0, 9, 2, Factory::time(6, 0))]);

    assert_eq!(subject.new_report(&first), ReportOutcome::Buffered(2));
    assert_eq!(subject.new_report(&second), ReportOutcome::Buffered(1));
    assert_eq!(subject.association_closed(None), 3);

    let payload = notifier.messages()[0].payload.clone();
    let types: Vec<&str> = payload
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["eventType"].as_str().unwrap())
        .collect();
    assert_eq!(
        types,
        vec!["TARIFF_EVENTS_TARIFF_ON", "LIGHT_EVENTS_LIGHT_ON", "LIGHT_EVENTS_LIGHT_OFF"]
    );
}

#[test]
fn missing_index_mapping_falls_back_to_zero() {
    common_setup();

    let (notifier, service) = Factory::recording();
    let subject = listener(service);

    let report = Factory::report("SSLD-1", EVENTS, 1, vec![Factory::evn_rpn(0, 4, 3, Factory::time(18, 0))]);
    assert_eq!(subject.new_report(&report), ReportOutcome::Buffered(1));
    subject.association_closed(None);

    assert_eq!(notifier.messages()[0].payload[0]["index"], 0);
}

#[test]
fn unmapped_and_unknown_codes_produce_nothing() {
    common_setup();

    let (notifier, service) = Factory::recording();
    let subject = listener(service);

    let report = Factory::report(
        "SSLD-1",
        EVENTS,
        1,
        vec![
            Factory::evn_rpn(0, 18, 1, Factory::time(18, 0)),
            Factory::evn_rpn(1, 250, 1, Factory::time(18, 1)),
        ],
    );
    assert_eq!(subject.new_report(&report), ReportOutcome::Buffered(0));
    assert_eq!(subject.association_closed(None), 0);
    assert!(notifier.messages().is_empty());
}

#[test]
fn malformed_event_is_skipped() {
    common_setup();

    let (notifier, service) = Factory::recording();
    let subject = listener(service);

    let broken = Node::new("SWDeviceGenericIO/EVNGGIO1.EvnRpn1", Fc::Status)
        .with_leaf("evnType", SubValue::VisibleString("on".to_string()));
    let report = Factory::report(
        "SSLD-1",
        EVENTS,
        1,
        vec![broken, Factory::evn_rpn(2, 5, 2, Factory::time(7, 0))],
    );
    assert_eq!(subject.new_report(&report), ReportOutcome::Buffered(1));
    subject.association_closed(None);

    assert_eq!(notifier.messages()[0].payload[0]["index"], 102);
}

#[test]
fn reports_after_close_are_dropped() {
    common_setup();

    let (notifier, service) = Factory::recording();
    let subject = listener(service);
    subject.association_closed(None);

    let report = Factory::report("SSLD-1", EVENTS, 1, vec![Factory::evn_rpn(0, 4, 1, Factory::time(18, 0))]);
    assert_eq!(subject.new_report(&report), ReportOutcome::Closed);

    // a second close flushes nothing
    assert_eq!(subject.association_closed(None), 0);
    assert!(notifier.messages().is_empty());
}

#[test]
fn stale_events_are_not_buffered() {
    common_setup();

    let (_, service) = Factory::recording();
    let subject = listener(service);
    subject.set_sq_num(7);

    let report = Factory::report("SSLD-1", EVENTS, 6, vec![Factory::evn_rpn(0, 4, 1, Factory::time(18, 0))]);
    assert_eq!(subject.new_report(&report), ReportOutcome::Stale);
    assert_eq!(subject.buffered(), 0);
}

#[test]
fn failed_flush_reports_nothing_sent() {
    common_setup();

    let subject = listener(Factory::failing());
    let report = Factory::report("SSLD-1", EVENTS, 1, vec![Factory::evn_rpn(0, 4, 1, Factory::time(18, 0))]);
    subject.new_report(&report);

    assert_eq!(subject.association_closed(None), 0);
}
