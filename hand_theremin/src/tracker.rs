//! Hand-tracking sources — both LeapMotion hardware and mouse simulation.
//!
//! The public interface is [`TrackingFrame`] delivered over a `mpsc`
//! channel. Consumers don't need to know whether frames came from real
//! hardware or the simulator; either way a frame is a snapshot of zero or
//! more hands with no identity guarantee from one frame to the next.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use theremin_engine::{Point, TrackedHand, INDEX_TIP, LANDMARKS_PER_HAND};

// ════════════════════════════════════════════════════════════════════════════
// TrackingFrame
// ════════════════════════════════════════════════════════════════════════════

/// One tracker result: every hand visible in the processed camera frame.
#[derive(Clone, Debug, Default)]
pub struct TrackingFrame {
    pub hands: Vec<TrackedHand>,
}

// ════════════════════════════════════════════════════════════════════════════
// TrackerSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`TrackingFrame`]s over a channel.
pub trait TrackerSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<TrackingFrame>);
}

/// Spawn a tracker source on its own thread and return the receiving end.
pub fn spawn_tracker_source<T: TrackerSource>(source: T) -> Receiver<TrackingFrame> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// Synthetic hands (shared by the simulator and tests)
// ════════════════════════════════════════════════════════════════════════════

/// Fabricate a plausible 21-landmark skeleton whose index fingertip sits
/// exactly at `tip`. Five fingers fan upward from a wrist below the palm.
pub fn synthetic_hand(tip: Point, label: &str) -> TrackedHand {
    let mut landmarks = Vec::with_capacity(LANDMARKS_PER_HAND);
    landmarks.push(Point::new(0.0, 0.0)); // wrist

    for digit in 0..5 {
        let angle = (-34.0 + 17.0 * digit as f32).to_radians();
        let (dx, dy) = (angle.sin(), -angle.cos());
        for joint in 1..=4 {
            let r = 0.03 + 0.017 * joint as f32;
            landmarks.push(Point::new(dx * r, dy * r));
        }
    }

    // Translate the whole skeleton so the index fingertip lands on `tip`.
    let index_tip = landmarks[INDEX_TIP];
    let (ox, oy) = (tip.x - index_tip.x, tip.y - index_tip.y);
    TrackedHand {
        landmarks: landmarks.iter().map(|p| Point::new(p.x + ox, p.y + oy)).collect(),
        label: label.to_string(),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimTrackerSource — mouse/keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimInput {
    /// Pointer moved; normalized window coordinates.
    Pointer { x: f32, y: f32 },
    /// Switch which hand the pointer drives.
    SwitchHand,
    /// Toggle the left hand in or out of the frame.
    ToggleLeft,
    /// Toggle the right hand in or out of the frame.
    ToggleRight,
}

/// Tracker source driven by [`SimInput`] events from the visualizer window.
///
/// The pointer moves one hand at a time; the other holds its last position
/// while present. This decouples the window event loop from frame
/// synthesis, mirroring how a real tracker pushes results independently of
/// rendering.
pub struct SimTrackerSource {
    pub rx: Receiver<SimInput>,
}

struct SimHand {
    present:  bool,
    position: Point,
}

impl TrackerSource for SimTrackerSource {
    fn run(self: Box<Self>, tx: Sender<TrackingFrame>) {
        let mut left  = SimHand { present: true, position: Point::new(0.3, 0.45) };
        let mut right = SimHand { present: true, position: Point::new(0.75, 0.55) };
        let mut driving_left = true;

        for input in self.rx {
            match input {
                SimInput::Pointer { x, y } => {
                    let hand = if driving_left { &mut left } else { &mut right };
                    hand.position = Point::new(x, y);
                }
                SimInput::SwitchHand => driving_left = !driving_left,
                SimInput::ToggleLeft => left.present = !left.present,
                SimInput::ToggleRight => right.present = !right.present,
            }

            let mut hands = Vec::new();
            if left.present {
                hands.push(synthetic_hand(left.position, "Left"));
            }
            if right.present {
                hands.push(synthetic_hand(right.position, "Right"));
            }
            if tx.send(TrackingFrame { hands }).is_err() {
                return;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapTrackerSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Tracker source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
///
/// Each polling frame the controller's hands are converted to normalized
/// frame coordinates: palm and per-digit bone joints fill the standard
/// 21-slot landmark layout (wrist, then four joints per finger, fingertips
/// at slots 4/8/12/16/20), and the SDK's hand type supplies the handedness
/// label. The interaction volume maps x ∈ [−250, 250] mm to [0,1] and
/// y ∈ [100, 500] mm to [1,0] (screen y grows downward).
#[cfg(feature = "leap")]
pub struct LeapTrackerSource;

#[cfg(feature = "leap")]
impl TrackerSource for LeapTrackerSource {
    fn run(self: Box<Self>, tx: Sender<TrackingFrame>) {
        use leaprs::*;

        const SPAN_X_MM: f32 = 250.0;
        const MIN_Y_MM:  f32 = 100.0;
        const SPAN_Y_MM: f32 = 400.0;

        let norm = |x: f32, y: f32| {
            Point::new(
                ((x + SPAN_X_MM) / (2.0 * SPAN_X_MM)).clamp(0.0, 1.0),
                (1.0 - (y - MIN_Y_MM) / SPAN_Y_MM).clamp(0.0, 1.0),
            )
        };

        let mut connection = Connection::create(ConnectionConfig::default())
            .expect("Failed to open LeapC connection");
        connection.open().expect("Failed to open LeapMotion device");

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let mut hands = Vec::new();

                for hand in frame.hands() {
                    let label = if hand.hand_type() == HandType::Left { "Left" } else { "Right" };

                    let palm = hand.palm().position();
                    let mut landmarks = Vec::with_capacity(LANDMARKS_PER_HAND);
                    landmarks.push(norm(palm.x, palm.y));

                    for digit in hand.digits() {
                        let meta   = digit.metacarpal();
                        let distal = digit.distal();
                        for joint in [
                            meta.prev_joint(),
                            meta.next_joint(),
                            distal.prev_joint(),
                            distal.next_joint(),
                        ] {
                            landmarks.push(norm(joint.x, joint.y));
                        }
                    }

                    hands.push(TrackedHand {
                        landmarks,
                        label: label.to_string(),
                    });
                }

                let _ = tx.send(TrackingFrame { hands });
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
