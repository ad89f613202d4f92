//! Mode configuration: which physical hand plays which role, and where the
//! antennas sit.
//!
//! Exactly one [`ModeConfig`] is active at a time. Switching modes swaps the
//! whole table — labels, antennas, ranges — without touching the smoothing
//! state, so a player can flip handedness mid-performance without a pitch
//! jump.

use crate::curve::DistanceRange;
use crate::geometry::{PitchAntenna, VolumeAntenna};

// ════════════════════════════════════════════════════════════════════════════
// Default layout (left-hand-pitch)
// ════════════════════════════════════════════════════════════════════════════

const PITCH_ANTENNA: PitchAntenna = PitchAntenna { x: 0.14, y1: 0.12, y2: 0.88 };
const VOLUME_ANTENNA: VolumeAntenna = VolumeAntenna { x1: 0.58, x2: 0.94, y: 0.82 };

const PITCH_RANGE: DistanceRange = DistanceRange { near: 0.02, far: 0.55 };
const VOLUME_RANGE: DistanceRange = DistanceRange { near: 0.02, far: 0.62 };

// ════════════════════════════════════════════════════════════════════════════
// TrackingMode
// ════════════════════════════════════════════════════════════════════════════

/// The two predefined physical layouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackingMode {
    /// Left hand plays pitch at the left-side antenna (default layout).
    LeftHandPitch,
    /// Mirrored: right hand plays pitch at the right-side antenna.
    RightHandPitch,
}

impl TrackingMode {
    pub fn name(&self) -> &'static str {
        match self {
            TrackingMode::LeftHandPitch  => "left-hand pitch",
            TrackingMode::RightHandPitch => "right-hand pitch",
        }
    }

    pub fn toggled(&self) -> TrackingMode {
        match self {
            TrackingMode::LeftHandPitch  => TrackingMode::RightHandPitch,
            TrackingMode::RightHandPitch => TrackingMode::LeftHandPitch,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ModeConfig
// ════════════════════════════════════════════════════════════════════════════

/// Binding of handedness labels to roles plus the antenna geometry for one
/// physical layout. Immutable once built; swapped wholesale on mode change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeConfig {
    /// Label whose hand plays the pitch role ("left" or "right").
    pub pitch_label:    &'static str,
    /// Label whose hand plays the volume role.
    pub volume_label:   &'static str,
    pub pitch_antenna:  PitchAntenna,
    pub volume_antenna: VolumeAntenna,
    pub pitch_range:    DistanceRange,
    pub volume_range:   DistanceRange,
}

impl ModeConfig {
    pub fn for_mode(mode: TrackingMode) -> ModeConfig {
        match mode {
            TrackingMode::LeftHandPitch => ModeConfig {
                pitch_label:    "left",
                volume_label:   "right",
                pitch_antenna:  PITCH_ANTENNA,
                volume_antenna: VOLUME_ANTENNA,
                pitch_range:    PITCH_RANGE,
                volume_range:   VOLUME_RANGE,
            },
            TrackingMode::RightHandPitch => ModeConfig {
                pitch_label:    "right",
                volume_label:   "left",
                pitch_antenna:  mirror_pitch(PITCH_ANTENNA),
                volume_antenna: mirror_volume(VOLUME_ANTENNA),
                pitch_range:    PITCH_RANGE,
                volume_range:   VOLUME_RANGE,
            },
        }
    }
}

fn mirror_pitch(a: PitchAntenna) -> PitchAntenna {
    PitchAntenna { x: 1.0 - a.x, y1: a.y1, y2: a.y2 }
}

fn mirror_volume(a: VolumeAntenna) -> VolumeAntenna {
    // Mirroring swaps the segment ends; keep x1 < x2.
    VolumeAntenna { x1: 1.0 - a.x2, x2: 1.0 - a.x1, y: a.y }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
