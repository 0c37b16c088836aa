use std::sync::Mutex;

/// Sequence number floor for one association.
///
/// Set from the device's buffered high-water mark before reporting is
/// enabled; reports numbered below it were delivered on an earlier
/// association and are replays.
#[derive(Debug, Default)]
pub struct SequenceBaseline {
    floor: Mutex<Option<u32>>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Freshness {
    Fresh,
    Stale { baseline: u32 },
}

impl SequenceBaseline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never lowers an existing floor.
    pub fn set(&self, sq_num: u32) {
        let mut floor = self.floor.lock().unwrap_or_else(|e| e.into_inner());
        *floor = Some(floor.map_or(sq_num, |current| current.max(sq_num)));
    }

    pub fn get(&self) -> Option<u32> {
        *self.floor.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Reports without a sequence number, or arriving before any floor is
    /// set, are always fresh.
    pub fn check(&self, sq_num: Option<u32>) -> Freshness {
        match (self.get(), sq_num) {
            (Some(baseline), Some(sq_num)) if sq_num < baseline => Freshness::Stale { baseline },
            _ => Freshness::Fresh,
        }
    }
}
