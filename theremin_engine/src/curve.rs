//! Distance-to-control response curves and perceptual post-mappings.
//!
//! A response curve takes a raw antenna distance and a (near, far) range,
//! clamps the distance into the range, and returns a control value in [0,1]
//! — 1 at the antenna, 0 at arm's length. Two families are supported:
//!
//! * **Inverse-square** — field-like falloff, sharp near the antenna.
//! * **Log-compressed** — linearizes the far region so broad gestures map to
//!   small changes and fine gestures near the antenna map to large ones.
//!
//! The curve output then goes through a perceptual mapping: exponential for
//! frequency (equal musical spacing per unit of control), a power curve on
//! openness for loudness.

/// Lowest oscillator frequency (A2), reached at control 0.
pub const MIN_FREQ: f32 = 110.0;
/// Highest oscillator frequency (E6), reached at control 1.
pub const MAX_FREQ: f32 = 1318.51;

/// Default curve constant for [`ResponseCurve::LogCompressed`].
pub const LOG_CURVE_K: f32 = 14.0;

// ════════════════════════════════════════════════════════════════════════════
// DistanceRange
// ════════════════════════════════════════════════════════════════════════════

/// The active distance window for a curve. Distances at or inside `near`
/// saturate the control at 1; at or beyond `far` it reaches 0. `near` must
/// be positive so the inverse-square form stays finite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceRange {
    pub near: f32,
    pub far:  f32,
}

impl DistanceRange {
    pub fn new(near: f32, far: f32) -> Self {
        debug_assert!(near > 0.0 && far > near);
        DistanceRange { near, far }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ResponseCurve
// ════════════════════════════════════════════════════════════════════════════

/// The closed set of curve families. New shapes slot in here without the
/// assignment engine knowing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResponseCurve {
    /// `(1/d² − 1/far²) / (1/near² − 1/far²)`, clamped to [0,1].
    InverseSquare,
    /// `1 − ln(1 + k·x) / ln(1 + k)` over the linearized distance `x`.
    LogCompressed { k: f32 },
}

impl ResponseCurve {
    /// Map a raw distance to a control value in [0,1]. Monotonically
    /// non-increasing in `distance`; exact 1 at `near`, exact 0 at `far`.
    pub fn control_for(&self, distance: f32, range: DistanceRange) -> f32 {
        let d = distance.clamp(range.near, range.far);
        match *self {
            ResponseCurve::InverseSquare => {
                let strength      = 1.0 / (d * d);
                let near_strength = 1.0 / (range.near * range.near);
                let far_strength  = 1.0 / (range.far * range.far);
                ((strength - far_strength) / (near_strength - far_strength)).clamp(0.0, 1.0)
            }
            ResponseCurve::LogCompressed { k } => {
                let x = (d - range.near) / (range.far - range.near);
                (1.0 - (1.0 + k * x).ln() / (1.0 + k).ln()).clamp(0.0, 1.0)
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResponseCurve::InverseSquare     => "inverse-square",
            ResponseCurve::LogCompressed { .. } => "log-compressed",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Perceptual post-mappings
// ════════════════════════════════════════════════════════════════════════════

/// Control value → oscillator frequency, exponentially spaced so equal
/// control steps are equal musical intervals.
pub fn control_to_frequency(control: f32) -> f32 {
    let c = control.clamp(0.0, 1.0);
    MIN_FREQ * (MAX_FREQ / MIN_FREQ).powf(c)
}

/// Volume proximity → loudness level in [0,1]. Closer to the volume
/// antenna reduces loudness; the 1.35 exponent makes near-silence easier to
/// reach than a linear taper would.
pub fn proximity_to_volume(proximity: f32) -> f32 {
    let openness = (1.0 - proximity).clamp(0.0, 1.0);
    openness.powf(1.35)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const RANGE: DistanceRange = DistanceRange { near: 0.02, far: 0.55 };

    const CURVES: [ResponseCurve; 2] = [
        ResponseCurve::InverseSquare,
        ResponseCurve::LogCompressed { k: LOG_CURVE_K },
    ];

    #[test]
    fn saturates_at_near_boundary() {
        for curve in CURVES {
            // Exactly at `near` — upper clamp boundary, not >1 nor NaN.
            let at_near = curve.control_for(RANGE.near, RANGE);
            assert_eq!(at_near, 1.0, "{}", curve.name());
            // Inside `near`.
            assert_eq!(curve.control_for(0.001, RANGE), 1.0, "{}", curve.name());
            assert_eq!(curve.control_for(0.0, RANGE), 1.0, "{}", curve.name());
        }
    }

    #[test]
    fn zero_at_and_beyond_far() {
        for curve in CURVES {
            assert_eq!(curve.control_for(RANGE.far, RANGE), 0.0, "{}", curve.name());
            assert_eq!(curve.control_for(2.0, RANGE), 0.0, "{}", curve.name());
        }
    }

    #[test]
    fn monotonically_non_increasing() {
        for curve in CURVES {
            let mut prev = f32::INFINITY;
            let mut d = 0.0;
            while d <= 0.7 {
                let c = curve.control_for(d, RANGE);
                assert!(c <= prev + 1e-6, "{} rose at d={}", curve.name(), d);
                assert!(c.is_finite());
                prev = c;
                d += 0.005;
            }
        }
    }

    #[test]
    fn log_curve_compresses_far_region() {
        // The log curve should spend less of its output range on the far
        // half of the distance window than the linear midpoint would.
        let curve = ResponseCurve::LogCompressed { k: LOG_CURVE_K };
        let mid = (RANGE.near + RANGE.far) / 2.0;
        assert!(curve.control_for(mid, RANGE) < 0.5);
    }

    #[test]
    fn frequency_mapping_hits_endpoints_exactly() {
        assert_eq!(control_to_frequency(0.0), MIN_FREQ);
        assert_eq!(control_to_frequency(1.0), MAX_FREQ);
    }

    #[test]
    fn frequency_mapping_is_monotonic() {
        let mut prev = 0.0;
        for i in 0..=100 {
            let f = control_to_frequency(i as f32 / 100.0);
            assert!(f > prev);
            prev = f;
        }
    }

    #[test]
    fn frequency_midpoint_is_geometric_mean() {
        let mid = control_to_frequency(0.5);
        let geo = (MIN_FREQ * MAX_FREQ).sqrt();
        assert!((mid - geo).abs() < 0.01);
    }

    #[test]
    fn volume_curve_endpoints() {
        // Hand on the antenna (proximity 1) is silent; hand at the far edge
        // (proximity 0) is full level.
        assert_eq!(proximity_to_volume(1.0), 0.0);
        assert_eq!(proximity_to_volume(0.0), 1.0);
    }

    #[test]
    fn volume_curve_is_sublinear_in_openness() {
        // openness^1.35 < openness for openness in (0,1).
        assert!(proximity_to_volume(0.5) < 0.5);
    }
}
