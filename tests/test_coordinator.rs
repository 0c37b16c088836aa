mod common;
use common::*;

use iec61850_bridge::coordinator::Coordinator;
use iec61850_bridge::listener::{ListenerFactory, ReportOutcome};
use iec61850_bridge::registry::Registries;

const BATTERY: &str = "ZOWN_POCBATTERY1/LLN0$AllData";

fn coordinator(channels: &Channels) -> (std::sync::Arc<RecordingNotifier>, Coordinator) {
    let (notifier, service) = Factory::recording();
    let factory = ListenerFactory::new(Registries::with_defaults().unwrap(), service);
    (notifier, Coordinator::new(Factory::inventory(), channels.clone(), factory))
}

#[test]
fn reports_need_an_association() {
    common_setup();

    let channels = Channels::new();
    let (notifier, subject) = coordinator(&channels);

    let report = Factory::report("RTU-1", BATTERY, 1, vec![Factory::state("ZOWN_POCBATTERY1/LLN0.Beh", 1)]);
    assert_eq!(subject.report(&report), None);

    subject.associated("RTU-1", 0).unwrap();
    assert_eq!(subject.report(&report), Some(ReportOutcome::Forwarded(1)));
    assert_eq!(notifier.messages().len(), 1);

    let stats = subject.stats.lock().unwrap();
    assert_eq!(stats.reports_unassociated, 1);
    assert_eq!(stats.reports_forwarded, 1);
    assert_eq!(stats.measurements_forwarded, 1);
}

#[test]
fn unknown_devices_are_rejected() {
    common_setup();

    let channels = Channels::new();
    let (_, subject) = coordinator(&channels);

    assert!(subject.associated("NOT-CONFIGURED", 0).is_err());
    assert_eq!(subject.live_associations(), 0);
    assert_eq!(subject.stats.lock().unwrap().associations_rejected, 1);
}

#[test]
fn baseline_is_set_from_the_association() {
    common_setup();

    let channels = Channels::new();
    let (_, subject) = coordinator(&channels);
    subject.associated("RTU-1", 40).unwrap();

    let members = || vec![Factory::state("ZOWN_POCBATTERY1/LLN0.Beh", 1)];
    assert_eq!(
        subject.report(&Factory::report("RTU-1", BATTERY, 39, members())),
        Some(ReportOutcome::Stale)
    );
    assert_eq!(
        subject.report(&Factory::report("RTU-1", BATTERY, 42, members())),
        Some(ReportOutcome::Forwarded(1))
    );
}

#[test]
fn reassociation_starts_a_fresh_listener() {
    common_setup();

    let channels = Channels::new();
    let (notifier, subject) = coordinator(&channels);

    subject.associated("SSLD-1", 0).unwrap();
    let report = Factory::report(
        "SSLD-1",
        "SWDeviceGenericIO/LLN0$Events",
        1,
        vec![Factory::evn_rpn(0, 4, 1, Factory::time(18, 0))],
    );
    assert_eq!(subject.report(&report), Some(ReportOutcome::Buffered(1)));

    // the old association is closed, and its events flushed, first
    subject.associated("SSLD-1", 5).unwrap();
    assert_eq!(notifier.messages().len(), 1);
    assert_eq!(subject.live_associations(), 1);
    assert_eq!(subject.stats.lock().unwrap().events_flushed, 1);
}

#[tokio::test]
async fn routes_transport_messages_until_shutdown() {
    common_setup();

    let channels = Channels::new();
    let (notifier, subject) = coordinator(&channels);

    let receiver = channels.from_transport.subscribe();
    let runner = subject.clone();
    let handle = tokio::spawn(async move { runner.run(receiver).await });

    let send = |message| channels.from_transport.send(message).unwrap();
    send(transport::ChannelData::Associated {
        device: "SSLD-1".to_string(),
        sq_num: 0,
    });
    send(transport::ChannelData::Report(Box::new(Factory::report(
        "SSLD-1",
        "SWDeviceGenericIO/LLN0$Events",
        1,
        vec![
            Factory::evn_rpn(0, 5, 2, Factory::time(22, 0)),
            Factory::evn_rpn(1, 4, 2, Factory::time(17, 0)),
        ],
    ))));
    send(transport::ChannelData::Associated {
        device: "RTU-1".to_string(),
        sq_num: 0,
    });
    send(transport::ChannelData::AssociationClosed {
        device: "SSLD-1".to_string(),
        cause: Some("peer closed".to_string()),
    });
    // RTU-1 is still open at shutdown and gets closed there
    send(transport::ChannelData::Shutdown);

    handle.await.unwrap().unwrap();

    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].payload[0]["eventType"], "LIGHT_EVENTS_LIGHT_ON");
    assert_eq!(messages[0].payload[0]["index"], 102);

    assert_eq!(subject.live_associations(), 0);
    let stats = subject.stats.lock().unwrap();
    assert_eq!(stats.associations_opened, 2);
    assert_eq!(stats.associations_closed.get("SSLD-1"), Some(&1));
    assert_eq!(stats.associations_closed.get("RTU-1"), Some(&1));
}
