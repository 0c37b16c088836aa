use crate::prelude::*;

use serde::Deserialize;
use std::collections::HashMap;

/// One configured relay output: the device's index and the one the
/// platform knows it by.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
pub struct OutputSetting {
    pub internal_id: u8,
    pub external_id: u32,
}

/// Internal to external relay index for one device association. Built once
/// when the association comes up and read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeviceOutputIndexMap {
    device_identification: String,
    indexes: HashMap<u8, u32>,
}

impl DeviceOutputIndexMap {
    pub fn new(device_identification: &str, settings: &[OutputSetting]) -> Self {
        let indexes = settings
            .iter()
            .filter(|s| s.internal_id != 0)
            .map(|s| (s.internal_id, s.external_id))
            .collect();

        Self {
            device_identification: device_identification.to_string(),
            indexes,
        }
    }

    /// External index for `internal`. 0 stays 0; an index without a mapping
    /// also becomes 0.
    pub fn external_index(&self, internal: u8) -> u32 {
        if internal == 0 {
            return 0;
        }

        match self.indexes.get(&internal) {
            Some(external) => *external,
            None => {
                warn!(
                    "device {}: no output setting for internal index {}, using 0",
                    self.device_identification, internal
                );
                0
            }
        }
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}
