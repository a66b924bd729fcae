use std::sync::Arc;

use log::debug;

use crate::host::engine::EffectHostHandle;
use crate::host::slot::SlotInfo;

/// Polls the host's generation counter from a UI/control loop and hands
/// back fresh slot metadata only when a swap has completed since the last
/// poll. The first poll always reports.
#[derive(Debug, Default)]
pub struct DisplayWatcher {
    seen: Option<u64>,
}

impl DisplayWatcher {
    pub const fn new() -> Self {
        Self { seen: None }
    }

    pub fn poll(&mut self, handle: &EffectHostHandle) -> Option<Arc<SlotInfo>> {
        let generation = handle.generation();
        if self.seen == Some(generation) {
            return None;
        }

        self.seen = Some(generation);
        let info = handle.slot_info();
        debug!(
            "Refreshing display for '{}' (generation {generation})",
            info.name
        );
        Some(info)
    }
}
