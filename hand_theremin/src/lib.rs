//! # hand_theremin
//!
//! A camera-free theremin: per-frame hand positions from a tracker drive a
//! sine oscillator — one hand's distance from a virtual pitch antenna sets
//! frequency, the other hand's distance from a volume antenna sets gain.
//! Role assignment, response curves, and smoothing live in
//! [`theremin_engine`]; this crate supplies the tracker sources, the audio
//! backend, and the overlay window.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: the mouse moves one hand at a time.
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via
//!   LeapC.
//!
//! ### Simulation controls
//!
//! | Input | Effect |
//! |---|---|
//! | Mouse | Move the driven hand's index fingertip |
//! | `Tab` | Switch which hand the mouse drives |
//! | `1` / `2` | Toggle the left / right hand in or out of frame |
//! | `M` | Switch layout (left-hand pitch ↔ right-hand pitch) |
//! | `C` | Toggle the pitch response curve |
//! | `Up` / `Down` | Widen / narrow the pitch reach |
//! | `Q` | Quit |

pub mod app;
pub mod synth;
pub mod tracker;
pub mod visualizer;
