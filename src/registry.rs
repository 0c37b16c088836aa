use crate::prelude::*;

use crate::config::Dataset;
use crate::event::EventCodeTable;
use crate::handler::{Family, Handler, SwitchingEventHandler};
use crate::translator::pq::PqCommandTable;

use std::collections::HashMap;
use std::sync::Arc;

/// Device type tag switching-event handlers are registered under.
pub const FLEX_OVL: &str = "FLEX_OVL";

/// Dataset templates supported out of the box.
pub const DEFAULT_DATASETS: [(&str, Family); 4] = [
    ("ZOWN_POCPV1/LLN0$AllData", Family::Pv),
    ("ZOWN_POCBATTERY1/LLN0$AllData", Family::Battery),
    ("ZOWN_POCLMGC1/LLN0$AllData", Family::Lmgc),
    ("ZOWN_POCPQ1/LLN0$AllData", Family::Pq),
];

/// Keyed lookup of handlers. Filled once at start-up, then only read.
#[derive(Debug)]
pub struct ReportHandlerRegistry<H> {
    handlers: HashMap<String, Arc<H>>,
}

impl<H> Default for ReportHandlerRegistry<H> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<H> Clone for ReportHandlerRegistry<H> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

impl<H> ReportHandlerRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `key`, returning the one it replaces.
    pub fn register<T: Into<Arc<H>>>(&mut self, key: &str, handler: T) -> Option<Arc<H>> {
        self.handlers.insert(key.to_string(), handler.into())
    }

    /// Absence is not an error here; the caller decides what it means.
    pub fn resolve(&self, key: &str) -> Option<Arc<H>> {
        self.handlers.get(key).cloned()
    }

    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

pub type RtuRegistry = ReportHandlerRegistry<Handler>;
pub type SwitchingRegistry = ReportHandlerRegistry<SwitchingEventHandler>;

/// Both registries plus the lookup tables their handlers share.
#[derive(Clone, Debug)]
pub struct Registries {
    pub rtu: RtuRegistry,
    pub switching: SwitchingRegistry,
}

impl Registries {
    pub fn new(datasets: &[Dataset], pq_commands: PqCommandTable, event_codes: EventCodeTable) -> Result<Self> {
        let pq_commands = Arc::new(pq_commands);

        let mut rtu = RtuRegistry::new();
        for (key, family) in DEFAULT_DATASETS {
            rtu.register(key, Handler::for_family(family, 1, &pq_commands)?);
        }
        for dataset in datasets {
            let handler = Handler::for_family(dataset.family, dataset.system_id, &pq_commands)?;
            if rtu.register(&dataset.key, handler).is_some() {
                info!("dataset {} overrides the built-in handler", dataset.key);
            }
        }

        let mut switching = SwitchingRegistry::new();
        switching.register(FLEX_OVL, SwitchingEventHandler::new(Arc::new(event_codes)));

        debug!("registered datasets: {}", rtu.keys().join(", "));

        Ok(Self { rtu, switching })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(&[], PqCommandTable::default(), EventCodeTable::default())
    }
}
