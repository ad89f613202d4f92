//! # theremin_engine
//!
//! Turns per-frame hand detections from an external tracker into theremin
//! control parameters: one hand's distance from a virtual pitch antenna
//! sets oscillator frequency, the other hand's distance from a volume
//! antenna sets gain.
//!
//! ## Pipeline
//!
//! | Stage | Module | State |
//! |---|---|---|
//! | Role assignment (which hand is which) | [`assign`] | none |
//! | Anchor + distance | [`geometry`] | none |
//! | Distance → control value | [`curve`] | none |
//! | Control smoothing → synth targets | [`smooth`] | two EMA accumulators |
//! | Layout / handedness binding | [`mode`] | active config |
//!
//! Everything is recomputed from scratch each frame; the only memory is the
//! two smoothing accumulators and the mode selector, bundled into the
//! [`Theremin`] context so a host can run the engine without globals, a
//! camera, or an audio backend.

pub mod assign;
pub mod curve;
pub mod geometry;
pub mod hand;
pub mod mode;
pub mod smooth;

pub use assign::{assign_roles, RoleAssignment};
pub use curve::{control_to_frequency, proximity_to_volume, DistanceRange, ResponseCurve,
                LOG_CURVE_K, MAX_FREQ, MIN_FREQ};
pub use geometry::{PitchAntenna, Point, VolumeAntenna};
pub use hand::{ControlPointKind, HandDetection, TrackedHand, INDEX_TIP, LANDMARKS_PER_HAND};
pub use mode::{ModeConfig, TrackingMode};
pub use smooth::{SmoothingState, SynthTargets, MAX_GAIN, SMOOTHING_FACTOR};

// ════════════════════════════════════════════════════════════════════════════
// FrameControls
// ════════════════════════════════════════════════════════════════════════════

/// The pure per-frame computation result, before smoothing.
#[derive(Clone, Debug)]
pub struct FrameControls {
    /// Raw pitch control in [0,1]; echoes the smoothed value while the
    /// pitch hand is missing so displays stay continuous.
    pub pitch_control:    f32,
    /// Raw volume proximity in [0,1]; echoes the smoothed value while the
    /// volume hand is missing.
    pub volume_proximity: f32,
    pub has_pitch:        bool,
    pub has_volume:       bool,
    /// Which detection indices won each role.
    pub assignment:       RoleAssignment,
    /// Control point → antenna anchor, for the overlay.
    pub pitch_guide:      Option<(Point, Point)>,
    pub volume_guide:     Option<(Point, Point)>,
}

// ════════════════════════════════════════════════════════════════════════════
// Theremin — the owned engine context
// ════════════════════════════════════════════════════════════════════════════

/// All engine state in one place: active mode config, curve and
/// control-point selection, the runtime pitch-reach override, and the two
/// smoothing accumulators.
pub struct Theremin {
    mode:           TrackingMode,
    config:         ModeConfig,
    pitch_curve:    ResponseCurve,
    volume_curve:   ResponseCurve,
    control_point:  ControlPointKind,
    /// Runtime replacement for the pitch range's `far`; survives mode
    /// switches.
    pitch_far:      Option<f32>,
    smoothing:      SmoothingState,
}

impl Theremin {
    pub fn new(mode: TrackingMode, pitch_curve: ResponseCurve, control_point: ControlPointKind) -> Self {
        Theremin {
            mode,
            config: ModeConfig::for_mode(mode),
            pitch_curve,
            volume_curve: ResponseCurve::InverseSquare,
            control_point,
            pitch_far: None,
            smoothing: SmoothingState::new(),
        }
    }

    pub fn mode(&self) -> TrackingMode {
        self.mode
    }

    pub fn config(&self) -> &ModeConfig {
        &self.config
    }

    pub fn pitch_curve(&self) -> ResponseCurve {
        self.pitch_curve
    }

    pub fn smoothing(&self) -> &SmoothingState {
        &self.smoothing
    }

    /// Swap the active layout. Smoothing state and the pitch-reach override
    /// carry over untouched.
    pub fn set_mode(&mut self, mode: TrackingMode) {
        self.mode = mode;
        self.config = ModeConfig::for_mode(mode);
        if let Some(far) = self.pitch_far {
            self.config.pitch_range.far = far;
        }
    }

    pub fn set_pitch_curve(&mut self, curve: ResponseCurve) {
        self.pitch_curve = curve;
    }

    /// Override how far from the pitch antenna the playable range reaches.
    /// Values are normalized frame units and must exceed the near bound.
    pub fn set_pitch_far(&mut self, far: f32) {
        let far = far.clamp(self.config.pitch_range.near * 2.0, 1.0);
        self.pitch_far = Some(far);
        self.config.pitch_range.far = far;
    }

    pub fn pitch_far(&self) -> f32 {
        self.config.pitch_range.far
    }

    /// Pure per-frame computation: build detections, assign roles, map each
    /// role hand's antenna distance through its response curve.
    pub fn process(&self, hands: &[TrackedHand]) -> FrameControls {
        let detections: Vec<HandDetection> = hands
            .iter()
            .map(|h| HandDetection::from_tracked(h, self.control_point, &self.config))
            .collect();

        let assignment = assign_roles(&detections, &self.config);

        let mut controls = FrameControls {
            pitch_control:    self.smoothing.smoothed_pitch_control(),
            volume_proximity: self.smoothing.smoothed_volume_proximity(),
            has_pitch:        false,
            has_volume:       false,
            assignment,
            pitch_guide:      None,
            volume_guide:     None,
        };

        if let Some(i) = assignment.pitch {
            let det = &detections[i];
            if let Some(point) = det.control_point {
                controls.has_pitch = true;
                controls.pitch_control =
                    self.pitch_curve.control_for(det.pitch_distance, self.config.pitch_range);
                controls.pitch_guide = Some((point, self.config.pitch_antenna.anchor_for(point)));
            }
        }

        if let Some(i) = assignment.volume {
            let det = &detections[i];
            if let Some(point) = det.control_point {
                controls.has_volume = true;
                controls.volume_proximity =
                    self.volume_curve.control_for(det.volume_distance, self.config.volume_range);
                controls.volume_guide = Some((point, self.config.volume_antenna.anchor_for(point)));
            }
        }

        controls
    }

    /// Stateful smoothing step: fold this frame's controls into the EMA
    /// accumulators and emit the synthesis targets.
    pub fn advance(&mut self, controls: &FrameControls) -> SynthTargets {
        self.smoothing.advance(
            controls.pitch_control,
            controls.volume_proximity,
            controls.has_pitch,
            controls.has_volume,
        )
    }
}

impl Default for Theremin {
    /// Left-hand pitch, log-compressed pitch response, index fingertip as
    /// the control point.
    fn default() -> Self {
        Theremin::new(
            TrackingMode::LeftHandPitch,
            ResponseCurve::LogCompressed { k: LOG_CURVE_K },
            ControlPointKind::IndexTip,
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(label: &str, x: f32, y: f32) -> TrackedHand {
        let mut landmarks = vec![Point::new(x, y); LANDMARKS_PER_HAND];
        landmarks[INDEX_TIP] = Point::new(x, y);
        TrackedHand { landmarks, label: label.to_string() }
    }

    #[test]
    fn zero_detections_silence() {
        let mut t = Theremin::default();
        let controls = t.process(&[]);
        assert!(!controls.has_pitch);
        assert!(!controls.has_volume);
        let targets = t.advance(&controls);
        assert_eq!(targets.gain, 0.0);
        assert_eq!(targets.frequency, None);
    }

    #[test]
    fn lone_pitch_hand_is_silent_but_tracked() {
        // Mode with pitch = right, one "right"-labeled hand far from
        // everything. Pitch present, volume absent, gain gated.
        let mut t = Theremin::new(
            TrackingMode::RightHandPitch,
            ResponseCurve::LogCompressed { k: LOG_CURVE_K },
            ControlPointKind::IndexTip,
        );
        let controls = t.process(&[hand("Right", 0.1, 0.5)]);
        assert!(controls.has_pitch);
        assert!(!controls.has_volume);

        // Even with a stale loud volume accumulator the gate holds.
        let targets = t.advance(&controls);
        assert_eq!(targets.gain, 0.0);
        assert!(targets.frequency.is_some());
    }

    #[test]
    fn two_unlabeled_hands_play() {
        let mut t = Theremin::default();
        let controls = t.process(&[hand("", 0.15, 0.5), hand("", 0.8, 0.82)]);
        assert!(controls.has_pitch);
        assert!(controls.has_volume);
        assert_eq!(controls.assignment.pitch, Some(0));
        assert_eq!(controls.assignment.volume, Some(1));
        // Volume hand is nearly touching its antenna: proximity saturates.
        assert!(controls.volume_proximity > 0.99);

        // Pull the volume proximity down over a few frames and sound appears.
        let mut targets = t.advance(&controls);
        let far_hands = [hand("", 0.15, 0.5), hand("", 0.8, 0.3)];
        for _ in 0..30 {
            let c = t.process(&far_hands);
            targets = t.advance(&c);
        }
        assert!(targets.gain > 0.0);
    }

    #[test]
    fn process_is_pure() {
        let t = Theremin::default();
        let hands = [hand("left", 0.3, 0.4), hand("", 0.7, 0.6)];
        let a = t.process(&hands);
        let b = t.process(&hands);
        assert_eq!(a.assignment, b.assignment);
        assert_eq!(a.pitch_control, b.pitch_control);
        assert_eq!(a.volume_proximity, b.volume_proximity);
    }

    #[test]
    fn mode_switch_preserves_smoothing() {
        let mut t = Theremin::default();
        for _ in 0..10 {
            let c = t.process(&[hand("left", 0.15, 0.5), hand("right", 0.9, 0.4)]);
            t.advance(&c);
        }
        let pitch_before = t.smoothing().smoothed_pitch_control();

        t.set_mode(TrackingMode::RightHandPitch);
        assert_eq!(t.smoothing().smoothed_pitch_control(), pitch_before);
        assert_eq!(t.config().pitch_label, "right");
    }

    #[test]
    fn pitch_far_override_applies_and_survives_mode_switch() {
        let mut t = Theremin::default();
        t.set_pitch_far(0.3);
        assert_eq!(t.pitch_far(), 0.3);

        // A hand 0.35 out is now past the playable range: control 0.
        let c = t.process(&[hand("left", 0.49, 0.5)]);
        assert_eq!(c.pitch_control, 0.0);

        t.set_mode(TrackingMode::RightHandPitch);
        assert_eq!(t.pitch_far(), 0.3);
    }

    #[test]
    fn guides_run_from_control_point_to_anchor() {
        let t = Theremin::default();
        let c = t.process(&[hand("left", 0.3, 0.5)]);
        let (point, anchor) = c.pitch_guide.unwrap();
        assert_eq!(point, Point::new(0.3, 0.5));
        assert_eq!(anchor, Point::new(0.14, 0.5));
    }
}
