//! Top-level application state.
//!
//! `AppState` owns the `Theremin` engine context and the audio backend,
//! processes tracking frames and UI commands, and keeps the status line.
//! `run()` drives the whole thing: tracker channel in, synth targets and
//! overlay out, one frame at a time.

use std::sync::mpsc::{self, TryRecvError};

use theremin_engine::{
    ControlPointKind, FrameControls, ResponseCurve, Theremin, TrackedHand, TrackingMode,
    LOG_CURVE_K,
};

use crate::synth::{open_synth, Synth};
use crate::tracker::{spawn_tracker_source, SimTrackerSource, TrackingFrame};
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// UiCommand
// ════════════════════════════════════════════════════════════════════════════

/// App-level command from the window (as opposed to simulated tracking
/// input, which flows through the tracker channel).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UiCommand {
    /// Flip between left-hand-pitch and right-hand-pitch layouts.
    SwitchMode,
    /// Toggle the pitch response curve family.
    ToggleCurve,
    /// Nudge the pitch antenna's far (reach) distance.
    NudgeReach(f32),
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
pub struct AppConfig {
    pub mode:          TrackingMode,
    pub pitch_curve:   ResponseCurve,
    pub control_point: ControlPointKind,
    /// Optional startup override for the pitch reach, normalized [0,1].
    pub pitch_far:     Option<f32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            mode:          TrackingMode::LeftHandPitch,
            pitch_curve:   ResponseCurve::LogCompressed { k: LOG_CURVE_K },
            control_point: ControlPointKind::IndexTip,
            pitch_far:     None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    theremin: Theremin,
    synth:    Box<dyn Synth>,

    // ── last processed frame, for the overlay ────────────────────────────
    hands:    Vec<TrackedHand>,
    controls: Option<FrameControls>,

    // ── readouts ──────────────────────────────────────────────────────────
    frequency:    Option<f32>,
    volume_level: Option<f32>,
    gain:         f32,

    // ── status line ───────────────────────────────────────────────────────
    pub status: String,
    /// Last announced (has_pitch, has_volume) pair; cleared on mode switch
    /// so the next frame re-announces under the new hand bindings.
    tracking_cache: Option<(bool, bool)>,
}

impl AppState {
    pub fn new(cfg: AppConfig, synth: Box<dyn Synth>) -> Self {
        let mut theremin = Theremin::new(cfg.mode, cfg.pitch_curve, cfg.control_point);
        if let Some(far) = cfg.pitch_far {
            theremin.set_pitch_far(far);
        }

        AppState {
            theremin,
            synth,
            hands: Vec::new(),
            controls: None,
            frequency: None,
            volume_level: None,
            gain: 0.0,
            status: "Show both hands in frame to play.".to_string(),
            tracking_cache: None,
        }
    }

    // ── process one tracking frame ────────────────────────────────────────

    pub fn handle_frame(&mut self, frame: TrackingFrame) {
        let controls = self.theremin.process(&frame.hands);
        let targets = self.theremin.advance(&controls);
        self.synth.apply(&targets);

        self.frequency = targets.frequency;
        self.volume_level = targets.volume_level;
        self.gain = targets.gain;

        self.update_tracking_status(controls.has_pitch, controls.has_volume);

        self.hands = frame.hands;
        self.controls = Some(controls);
    }

    // ── process one UI command ────────────────────────────────────────────

    /// Returns false when the app should quit.
    pub fn handle_command(&mut self, command: UiCommand) -> bool {
        match command {
            UiCommand::SwitchMode => {
                self.theremin.set_mode(self.theremin.mode().toggled());
                self.tracking_cache = None;
                self.status = format!(
                    "Mode: {} — the {} hand now plays pitch.",
                    self.theremin.mode().name(),
                    self.theremin.config().pitch_label,
                );
            }
            UiCommand::ToggleCurve => {
                let next = match self.theremin.pitch_curve() {
                    ResponseCurve::InverseSquare => ResponseCurve::LogCompressed { k: LOG_CURVE_K },
                    ResponseCurve::LogCompressed { .. } => ResponseCurve::InverseSquare,
                };
                self.theremin.set_pitch_curve(next);
                self.status = format!("Pitch curve: {}.", next.name());
            }
            UiCommand::NudgeReach(delta) => {
                let far = self.theremin.pitch_far() + delta;
                self.theremin.set_pitch_far(far);
                self.status = format!("Pitch reach: {:.2}.", self.theremin.pitch_far());
            }
            UiCommand::Quit => return false,
        }
        true
    }

    // ── tracking status messages ──────────────────────────────────────────

    fn update_tracking_status(&mut self, has_pitch: bool, has_volume: bool) {
        if self.tracking_cache == Some((has_pitch, has_volume)) {
            return;
        }
        self.tracking_cache = Some((has_pitch, has_volume));

        let cfg = self.theremin.config();
        self.status = match (has_pitch, has_volume) {
            (true, true) => format!(
                "Both hands tracked. {} controls pitch, {} controls volume.",
                capitalize(cfg.pitch_label),
                capitalize(cfg.volume_label),
            ),
            (false, false) => "Show both hands in frame to play.".to_string(),
            (false, true) => format!(
                "{} hand missing. {} hand controls pitch.",
                capitalize(cfg.pitch_label),
                capitalize(cfg.pitch_label),
            ),
            (true, false) => format!(
                "{} hand missing. {} hand controls volume.",
                capitalize(cfg.volume_label),
                capitalize(cfg.volume_label),
            ),
        };
    }

    // ── accessors for the render loop ─────────────────────────────────────

    pub fn hands(&self)        -> &[TrackedHand]          { &self.hands }
    pub fn controls(&self)     -> Option<&FrameControls>  { self.controls.as_ref() }
    pub fn frequency(&self)    -> Option<f32>             { self.frequency }
    pub fn volume_level(&self) -> Option<f32>             { self.volume_level }
    pub fn gain(&self)         -> f32                     { self.gain }
    pub fn theremin(&self)     -> &Theremin               { &self.theremin }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Creates the visualizer, the tracker source (simulation by default,
/// hardware with `--features leap`), the synth backend, and drives the
/// event/render loop at ~60 fps. Only the most recent tracking frame is
/// processed each iteration; anything older is dropped to bound latency.
pub fn run(cfg: AppConfig) -> Result<(), String> {
    // ── Sim input channel (ignored by the hardware tracker) ──────────────
    let (sim_tx, sim_rx) = mpsc::channel();

    #[cfg(feature = "leap")]
    let tracker_rx = {
        drop(sim_rx);
        spawn_tracker_source(crate::tracker::LeapTrackerSource)
    };
    #[cfg(not(feature = "leap"))]
    let tracker_rx = spawn_tracker_source(SimTrackerSource { rx: sim_rx });

    // ── Visualizer (owns the window and the sim input sender) ────────────
    let mut vis = Visualizer::new(sim_tx)?;

    // ── App state ─────────────────────────────────────────────────────────
    let mut app = AppState::new(cfg, open_synth());

    // ── Main loop ─────────────────────────────────────────────────────────
    while vis.is_open() {
        // 1. Window input → UiCommands here, SimInput to the tracker.
        for command in vis.poll_input() {
            if !app.handle_command(command) {
                return Ok(());
            }
        }

        // 2. Drain the tracker channel, keeping only the latest frame.
        let mut latest: Option<TrackingFrame> = None;
        loop {
            match tracker_rx.try_recv() {
                Ok(frame) => latest = Some(frame),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }
        if let Some(frame) = latest {
            app.handle_frame(frame);
        }

        // 3. Render.
        let theremin = app.theremin();
        let (mode_name, curve_name, pitch_far, config) = (
            theremin.mode().name(),
            theremin.pitch_curve().name(),
            theremin.pitch_far(),
            *theremin.config(),
        );
        vis.render(
            &config,
            app.hands(),
            app.controls(),
            app.frequency(),
            app.volume_level(),
            &app.status,
            mode_name,
            curve_name,
            pitch_far,
        );
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::NullSynth;
    use crate::tracker::synthetic_hand;
    use theremin_engine::Point;

    fn make_app() -> AppState {
        AppState::new(AppConfig::default(), Box::new(NullSynth))
    }

    fn frame(hands: Vec<TrackedHand>) -> TrackingFrame {
        TrackingFrame { hands }
    }

    #[test]
    fn empty_frame_reports_missing_hands_and_silence() {
        let mut app = make_app();
        app.handle_frame(frame(vec![]));
        assert_eq!(app.gain(), 0.0);
        assert_eq!(app.frequency(), None);
        assert_eq!(app.status, "Show both hands in frame to play.");
    }

    #[test]
    fn both_hands_produce_sound_after_settling() {
        let mut app = make_app();
        let hands = vec![
            synthetic_hand(Point::new(0.3, 0.4), "Left"),
            synthetic_hand(Point::new(0.8, 0.4), "Right"),
        ];
        for _ in 0..30 {
            app.handle_frame(frame(hands.clone()));
        }
        assert!(app.gain() > 0.0);
        assert!(app.frequency().is_some());
        assert!(app.status.starts_with("Both hands tracked."));
    }

    #[test]
    fn lone_pitch_hand_is_tracked_but_silent() {
        let mut app = make_app();
        app.handle_frame(frame(vec![synthetic_hand(Point::new(0.2, 0.4), "Left")]));
        assert!(app.frequency().is_some());
        assert_eq!(app.gain(), 0.0);
        assert_eq!(app.status, "Right hand missing. Right hand controls volume.");
    }

    #[test]
    fn status_is_not_rewritten_while_tracking_is_unchanged() {
        let mut app = make_app();
        let hands = vec![synthetic_hand(Point::new(0.2, 0.4), "Left")];
        app.handle_frame(frame(hands.clone()));

        // Overwrite the status; an unchanged tracking state must not clobber it.
        app.status = "sentinel".to_string();
        app.handle_frame(frame(hands));
        assert_eq!(app.status, "sentinel");
    }

    #[test]
    fn mode_switch_re_announces_and_rebinds_hands() {
        let mut app = make_app();
        app.handle_frame(frame(vec![synthetic_hand(Point::new(0.2, 0.4), "Left")]));

        assert!(app.handle_command(UiCommand::SwitchMode));
        assert!(app.status.contains("right-hand pitch"));

        // Same lone left hand now fills the volume role instead.
        app.handle_frame(frame(vec![synthetic_hand(Point::new(0.2, 0.4), "Left")]));
        assert_eq!(app.status, "Right hand missing. Right hand controls pitch.");
        assert_eq!(app.frequency(), None);
        assert!(app.volume_level().is_some());
    }

    #[test]
    fn mode_switch_preserves_pitch_memory() {
        let mut app = make_app();
        let hands = vec![
            synthetic_hand(Point::new(0.2, 0.4), "Left"),
            synthetic_hand(Point::new(0.8, 0.4), "Right"),
        ];
        for _ in 0..20 {
            app.handle_frame(frame(hands.clone()));
        }
        let pitch_before = app.theremin().smoothing().smoothed_pitch_control();

        app.handle_command(UiCommand::SwitchMode);
        let pitch_after = app.theremin().smoothing().smoothed_pitch_control();
        assert_eq!(pitch_before, pitch_after);
    }

    #[test]
    fn curve_toggle_flips_between_families() {
        let mut app = make_app();
        assert_eq!(app.theremin().pitch_curve(), ResponseCurve::LogCompressed { k: LOG_CURVE_K });
        app.handle_command(UiCommand::ToggleCurve);
        assert_eq!(app.theremin().pitch_curve(), ResponseCurve::InverseSquare);
        app.handle_command(UiCommand::ToggleCurve);
        assert_eq!(app.theremin().pitch_curve(), ResponseCurve::LogCompressed { k: LOG_CURVE_K });
    }

    #[test]
    fn reach_nudges_accumulate_and_clamp() {
        let mut app = make_app();
        let start = app.theremin().pitch_far();
        app.handle_command(UiCommand::NudgeReach(0.05));
        assert!((app.theremin().pitch_far() - (start + 0.05)).abs() < 1e-6);

        for _ in 0..40 {
            app.handle_command(UiCommand::NudgeReach(0.05));
        }
        assert!(app.theremin().pitch_far() <= 1.0);
    }

    #[test]
    fn quit_command_stops_the_loop() {
        let mut app = make_app();
        assert!(!app.handle_command(UiCommand::Quit));
    }

    #[test]
    fn startup_pitch_far_override_is_applied() {
        let cfg = AppConfig { pitch_far: Some(0.4), ..AppConfig::default() };
        let app = AppState::new(cfg, Box::new(NullSynth));
        assert!((app.theremin().pitch_far() - 0.4).abs() < 1e-6);
    }
}
