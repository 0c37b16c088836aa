use super::{Listener, RtuEventListener, SwitchingEventListener};
use crate::prelude::*;

use crate::config::Ied;
use crate::notifier::DeviceManagementService;
use crate::output_index::{DeviceOutputIndexMap, OutputSetting};
use crate::registry::{Registries, FLEX_OVL};

/// What the pipeline needs to know about a device before its first report.
pub trait DeviceInventory {
    /// `None` for devices that are unknown or disabled.
    fn ied(&self, device_identification: &str) -> Option<Ied>;
    fn output_settings(&self, device_identification: &str) -> Vec<OutputSetting>;
}

/// Builds the listener matching a device's template.
#[derive(Clone)]
pub struct ListenerFactory {
    registries: Registries,
    service: DeviceManagementService,
}

impl ListenerFactory {
    pub fn new(registries: Registries, service: DeviceManagementService) -> Self {
        Self { registries, service }
    }

    pub fn create(&self, device_identification: &str, inventory: &dyn DeviceInventory) -> Result<Listener> {
        let ied = inventory
            .ied(device_identification)
            .ok_or_else(|| anyhow!("device {} is not configured or disabled", device_identification))?;

        let listener = match ied {
            Ied::ZownRtu => {
                RtuEventListener::new(device_identification, self.registries.rtu.clone(), self.service.clone()).into()
            }
            Ied::FlexOvl => {
                let handler = self
                    .registries
                    .switching
                    .resolve(FLEX_OVL)
                    .ok_or_else(|| anyhow!("no switching event handler registered for {}", FLEX_OVL))?;
                let index_map =
                    DeviceOutputIndexMap::new(device_identification, &inventory.output_settings(device_identification));
                debug!(
                    "device {}: {} output settings mapped",
                    device_identification,
                    index_map.len()
                );
                SwitchingEventListener::new(device_identification, handler, index_map, self.service.clone()).into()
            }
        };

        info!("device {}: created {} listener", device_identification, ied);
        Ok(listener)
    }
}
