//! EC calibration state and slope derivation
//!
//! Two-point calibration against standard solutions: the probe is immersed
//! in a 1413 µS/cm and a 12.88 mS/cm reference, the measured voltages are
//! recorded, and a linear slope ("K-value") is derived from the pair.

/// EC of the low reference solution, in µS/cm
pub const LOW_REFERENCE_US: f32 = 1413.0;

/// EC of the high reference solution, in µS/cm
pub const HIGH_REFERENCE_US: f32 = 12880.0;

/// Slope used until both calibration points are known
pub const DEFAULT_SLOPE: f32 = 1.0;

/// Sentinel voltage meaning "this point has not been recorded"
const UNSET_POINT_V: f32 = 0.0;

/// Outcome of a slope recomputation attempt
#[derive(Clone, Copy, Debug, PartialEq, defmt::Format)]
pub enum SlopeUpdate {
    /// Both points known and distinct; slope was recomputed
    Recomputed(f32),
    /// One or both points still unset; previous slope retained
    PointMissing,
    /// Points are numerically equal (would divide by zero); previous
    /// slope retained and the indicator is not set
    DegeneratePoints,
}

/// Calibration state of the EC probe
///
/// The slope and indicator are the persisted fields; the two point voltages
/// are retained for the session only and come back as unset after a restart.
#[derive(Clone, Copy, Debug, defmt::Format)]
pub struct EcCalibration {
    /// Linear coefficient relating voltage delta to EC delta (µS/cm per V)
    slope: f32,
    /// Voltage measured in the 1413 µS/cm solution (0.0 = unset)
    low_point_v: f32,
    /// Voltage measured in the 12.88 mS/cm solution (0.0 = unset)
    high_point_v: f32,
    /// True once both points are set and the slope has been recomputed;
    /// cleared by an operator reset without erasing points or slope
    indicator: bool,
}

impl EcCalibration {
    /// Fresh, uncalibrated state
    pub const fn new() -> Self {
        Self {
            slope: DEFAULT_SLOPE,
            low_point_v: UNSET_POINT_V,
            high_point_v: UNSET_POINT_V,
            indicator: false,
        }
    }

    /// State reconstructed from the persisted slope and indicator
    ///
    /// Point voltages are not persisted, so they start unset: the pipeline
    /// stays on the default conversion until the probe is recalibrated.
    pub const fn restored(slope: f32, indicator: bool) -> Self {
        Self {
            slope,
            low_point_v: UNSET_POINT_V,
            high_point_v: UNSET_POINT_V,
            indicator,
        }
    }

    /// Record the voltage measured in the low (1413 µS/cm) reference
    ///
    /// Overwrites any previous low point; no plausibility check is applied.
    pub fn set_low_point(&mut self, voltage: f32) {
        self.low_point_v = voltage;
    }

    /// Record the voltage measured in the high (12.88 mS/cm) reference
    pub fn set_high_point(&mut self, voltage: f32) {
        self.high_point_v = voltage;
    }

    /// Re-derive the slope from the two recorded points
    ///
    /// Guarded: leaves the slope and indicator untouched when a point is
    /// missing or the two points coincide.
    pub fn recompute_slope(&mut self) -> SlopeUpdate {
        if !self.low_point_set() || !self.high_point_set() {
            return SlopeUpdate::PointMissing;
        }
        if self.high_point_v == self.low_point_v {
            return SlopeUpdate::DegeneratePoints;
        }

        self.slope = (HIGH_REFERENCE_US - LOW_REFERENCE_US) / (self.high_point_v - self.low_point_v);
        self.indicator = true;
        SlopeUpdate::Recomputed(self.slope)
    }

    /// Clear the calibrated indicator, keeping points and slope
    pub fn clear_indicator(&mut self) {
        self.indicator = false;
    }

    /// True iff both points are set, distinct, and the indicator is set
    pub fn is_calibrated(&self) -> bool {
        self.low_point_set()
            && self.high_point_set()
            && self.low_point_v != self.high_point_v
            && self.indicator
    }

    /// Current slope (µS/cm per volt)
    pub fn slope(&self) -> f32 {
        self.slope
    }

    /// Voltage anchor of the low reference point
    pub fn low_point_v(&self) -> f32 {
        self.low_point_v
    }

    /// Voltage of the high reference point
    pub fn high_point_v(&self) -> f32 {
        self.high_point_v
    }

    /// Raw indicator flag (may be true while points are unset, e.g. right
    /// after a restore)
    pub fn indicator(&self) -> bool {
        self.indicator
    }

    /// Whether the low point has been recorded this session
    pub fn low_point_set(&self) -> bool {
        self.low_point_v != UNSET_POINT_V
    }

    /// Whether the high point has been recorded this session
    pub fn high_point_set(&self) -> bool {
        self.high_point_v != UNSET_POINT_V
    }
}

impl Default for EcCalibration {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slope_from_two_points() {
        let mut cal = EcCalibration::new();
        cal.set_low_point(0.5);
        cal.set_high_point(2.0);

        match cal.recompute_slope() {
            SlopeUpdate::Recomputed(slope) => {
                // (12880 - 1413) / 1.5
                assert!((slope - 7644.6667).abs() < 0.01);
            }
            other => panic!("expected recompute, got {:?}", other),
        }
        assert!(cal.is_calibrated());
    }

    #[test]
    fn order_of_points_does_not_matter() {
        let mut ab = EcCalibration::new();
        ab.set_low_point(0.5);
        assert_eq!(ab.recompute_slope(), SlopeUpdate::PointMissing);
        ab.set_high_point(2.0);
        ab.recompute_slope();

        let mut ba = EcCalibration::new();
        ba.set_high_point(2.0);
        assert_eq!(ba.recompute_slope(), SlopeUpdate::PointMissing);
        ba.set_low_point(0.5);
        ba.recompute_slope();

        assert_eq!(ab.slope(), ba.slope());
        assert!(ab.is_calibrated() && ba.is_calibrated());
    }

    #[test]
    fn equal_points_leave_slope_unchanged() {
        let mut cal = EcCalibration::new();
        cal.set_low_point(1.2);
        cal.set_high_point(1.2);

        assert_eq!(cal.recompute_slope(), SlopeUpdate::DegeneratePoints);
        assert_eq!(cal.slope(), DEFAULT_SLOPE);
        assert!(!cal.is_calibrated());
    }

    #[test]
    fn recalibrating_same_point_is_idempotent() {
        let mut cal = EcCalibration::new();
        cal.set_low_point(0.5);
        cal.set_high_point(2.0);
        cal.recompute_slope();
        let first = cal.slope();

        cal.set_low_point(0.5);
        cal.recompute_slope();
        assert_eq!(cal.slope(), first);
    }

    #[test]
    fn missing_point_keeps_default_slope() {
        let mut cal = EcCalibration::new();
        cal.set_high_point(2.0);
        assert_eq!(cal.recompute_slope(), SlopeUpdate::PointMissing);
        assert_eq!(cal.slope(), DEFAULT_SLOPE);
        assert!(!cal.is_calibrated());
    }

    #[test]
    fn cleared_indicator_suppresses_calibrated_state() {
        let mut cal = EcCalibration::new();
        cal.set_low_point(0.5);
        cal.set_high_point(2.0);
        cal.recompute_slope();
        assert!(cal.is_calibrated());

        cal.clear_indicator();
        assert!(!cal.is_calibrated());
        // Points and slope survive the reset
        assert!(cal.low_point_set() && cal.high_point_set());
        assert!((cal.slope() - 7644.6667).abs() < 0.01);
    }

    #[test]
    fn restored_state_keeps_slope_but_not_points() {
        let cal = EcCalibration::restored(7644.67, true);
        assert_eq!(cal.slope(), 7644.67);
        assert!(cal.indicator());
        // Session points are gone, so calibrated output stays suppressed
        // until the probe is recalibrated.
        assert!(!cal.low_point_set());
        assert!(!cal.is_calibrated());
    }
}
