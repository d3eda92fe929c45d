//! In-memory calibration store
//!
//! Backs the two calibration slots with plain fields. Used by the demos and
//! as the simulated-persistence double in tests; production integrations
//! implement [`CalibrationStore`] over their own preference/NVS layer.

use crate::ports::persistence::CalibrationStore;

/// RAM-backed calibration store (empty until first save)
#[derive(Clone, Copy, Debug, Default, defmt::Format)]
pub struct MemorySlotStore {
    slope: Option<f32>,
    indicator: Option<bool>,
}

impl MemorySlotStore {
    /// Store with both slots empty
    pub const fn new() -> Self {
        Self {
            slope: None,
            indicator: None,
        }
    }

    /// Store pre-seeded with persisted values, as after a power cycle
    pub const fn with_values(slope: f32, indicator: bool) -> Self {
        Self {
            slope: Some(slope),
            indicator: Some(indicator),
        }
    }
}

impl CalibrationStore for MemorySlotStore {
    fn load_slope(&mut self) -> Option<f32> {
        self.slope
    }

    fn save_slope(&mut self, slope: f32) -> bool {
        self.slope = Some(slope);
        true
    }

    fn load_indicator(&mut self) -> Option<bool> {
        self.indicator
    }

    fn save_indicator(&mut self, indicator: bool) -> bool {
        self.indicator = Some(indicator);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_independent() {
        let mut store = MemorySlotStore::new();
        assert!(store.save_indicator(true));
        assert_eq!(store.load_slope(), None);
        assert_eq!(store.load_indicator(), Some(true));
    }
}
