//! Frame-rate smoothing of the two control values and derivation of the
//! synthesis targets.
//!
//! Smoothing is two-stage: the EMA here runs at tracker frame rate with a
//! roughly 5-frame time constant, and the targets it emits carry the much
//! shorter audio-rate ramp constants the synth applies per sample. The EMA
//! accumulators persist across frames and across mode switches.

use crate::curve::{control_to_frequency, proximity_to_volume};

/// EMA coefficient. At 0.2 a constant input settles to within 1% in about
/// 21 frames.
pub const SMOOTHING_FACTOR: f32 = 0.2;

/// Master gain cap applied to the loudness level.
pub const MAX_GAIN: f32 = 0.38;

/// Audio-rate ramp constant for frequency, seconds.
pub const FREQ_RAMP: f32 = 0.045;
/// Audio-rate ramp constant for gain while audible, seconds.
pub const GAIN_RAMP: f32 = 0.05;
/// Slightly longer ramp into silence to avoid a click on hand loss.
pub const SILENCE_RAMP: f32 = 0.06;

// ════════════════════════════════════════════════════════════════════════════
// SynthTargets
// ════════════════════════════════════════════════════════════════════════════

/// What the audio sink should ramp toward this frame. Ephemeral: recomputed
/// every frame, never stored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SynthTargets {
    /// Target oscillator frequency in Hz, bounded [MIN_FREQ, MAX_FREQ].
    /// `None` while the pitch hand is missing: the oscillator is not
    /// retargeted and observers report the frequency as unavailable.
    pub frequency: Option<f32>,
    /// Target gain in [0, MAX_GAIN]. Forced to 0 unless both role hands are
    /// present this frame.
    pub gain: f32,
    /// Smoothed loudness level in [0,1] for display, `None` while the
    /// volume hand is missing. Unlike `gain` it ignores the silence gate.
    pub volume_level: Option<f32>,
    /// Ramp time constant for the frequency target, seconds.
    pub frequency_ramp: f32,
    /// Ramp time constant for the gain target, seconds.
    pub gain_ramp: f32,
}

// ════════════════════════════════════════════════════════════════════════════
// SmoothingState
// ════════════════════════════════════════════════════════════════════════════

/// The only cross-frame state in the engine: one EMA accumulator per role.
#[derive(Clone, Copy, Debug)]
pub struct SmoothingState {
    smoothed_pitch_control:    f32,
    smoothed_volume_proximity: f32,
}

impl Default for SmoothingState {
    fn default() -> Self {
        SmoothingState {
            smoothed_pitch_control:    0.5,
            smoothed_volume_proximity: 0.5,
        }
    }
}

impl SmoothingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn smoothed_pitch_control(&self) -> f32 {
        self.smoothed_pitch_control
    }

    pub fn smoothed_volume_proximity(&self) -> f32 {
        self.smoothed_volume_proximity
    }

    /// Fold one frame's raw controls into the accumulators and derive the
    /// synthesis targets.
    ///
    /// An absent role leaves its accumulator untouched (hold, not decay).
    /// Audible gain additionally requires *both* hands: a lone pitch hand
    /// retunes the oscillator silently, a lone volume hand shapes a level
    /// nobody hears.
    pub fn advance(
        &mut self,
        raw_pitch: f32,
        raw_volume: f32,
        has_pitch: bool,
        has_volume: bool,
    ) -> SynthTargets {
        let frequency = if has_pitch {
            self.smoothed_pitch_control +=
                (raw_pitch - self.smoothed_pitch_control) * SMOOTHING_FACTOR;
            Some(control_to_frequency(self.smoothed_pitch_control))
        } else {
            None
        };

        let volume_level = if has_volume {
            self.smoothed_volume_proximity +=
                (raw_volume - self.smoothed_volume_proximity) * SMOOTHING_FACTOR;
            Some(proximity_to_volume(self.smoothed_volume_proximity))
        } else {
            None
        };

        let audible = has_pitch && has_volume;
        let (gain, gain_ramp) = if audible {
            (volume_level.unwrap_or(0.0) * MAX_GAIN, GAIN_RAMP)
        } else {
            (0.0, SILENCE_RAMP)
        };

        SynthTargets {
            frequency,
            gain,
            volume_level,
            frequency_ramp: FREQ_RAMP,
            gain_ramp,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
