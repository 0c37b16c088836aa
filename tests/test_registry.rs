mod common;
use common::*;

use iec61850_bridge::handler::{Handler, LmgcHandler, ReportHandler};
use iec61850_bridge::measurement::SystemType;
use iec61850_bridge::registry::{ReportHandlerRegistry, Registries, DEFAULT_DATASETS};

use std::sync::Arc;

#[test]
fn resolves_the_registered_instance() {
    let mut registry = ReportHandlerRegistry::<Handler>::new();
    let handler: Arc<Handler> = Arc::new(LmgcHandler::new(1).into());

    assert!(registry.register("ZOWN_POCLMGC1/LLN0$AllData", handler.clone()).is_none());

    let resolved = registry.resolve("ZOWN_POCLMGC1/LLN0$AllData").unwrap();
    assert!(Arc::ptr_eq(&resolved, &handler));

    assert!(registry.resolve("ZOWN_POCLMGC2/LLN0$AllData").is_none());
    assert!(registry.resolve("").is_none());
}

#[test]
fn registering_again_replaces() {
    let mut registry = ReportHandlerRegistry::<Handler>::new();
    let first: Arc<Handler> = Arc::new(LmgcHandler::new(1).into());

    registry.register("KEY", first.clone());
    let replaced = registry.register("KEY", Handler::from(LmgcHandler::new(2))).unwrap();

    assert!(Arc::ptr_eq(&replaced, &first));
    assert_eq!(registry.resolve("KEY").unwrap().system_id(), 2);
    assert_eq!(registry.len(), 1);
}

#[test]
fn defaults_cover_every_family() {
    let registries = Registries::with_defaults().unwrap();

    let types: Vec<SystemType> = DEFAULT_DATASETS
        .iter()
        .map(|(key, _)| registries.rtu.resolve(key).unwrap().system_type())
        .collect();

    assert_eq!(
        types,
        vec![
            SystemType::Photovoltaic,
            SystemType::Battery,
            SystemType::Lmgc,
            SystemType::PowerQuality
        ]
    );
}

#[test]
fn config_datasets_extend_the_defaults() {
    let config = Factory::config(
        r#"
datasets:
  - key: BATTERY1/LLN0$AllData
    family: battery
  - key: ZOWN_POCPQ1/LLN0$AllData
    family: pq
    system_id: 4
"#,
    );

    let registries = Registries::new(
        &config.datasets(),
        Default::default(),
        Default::default(),
    )
    .unwrap();

    assert_eq!(registries.rtu.len(), 5);
    assert_eq!(
        registries.rtu.resolve("BATTERY1/LLN0$AllData").unwrap().system_type(),
        SystemType::Battery
    );
    assert_eq!(registries.rtu.resolve("ZOWN_POCPQ1/LLN0$AllData").unwrap().system_id(), 4);
}
