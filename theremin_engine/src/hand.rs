//! Per-frame hand detections.
//!
//! The tracker reports each hand as an ordered list of 21 landmarks in
//! normalized frame coordinates plus a free-text handedness label that may
//! be empty, partial, or plain wrong. [`HandDetection`] reduces that to the
//! single control point used for mapping and precomputes the distance to
//! each antenna. Detections live for one frame and are rebuilt from scratch
//! on the next.

use crate::geometry::Point;
use crate::mode::ModeConfig;

/// Landmark count of a complete hand skeleton.
pub const LANDMARKS_PER_HAND: usize = 21;
/// Landmark slot of the index fingertip.
pub const INDEX_TIP: usize = 8;

// ════════════════════════════════════════════════════════════════════════════
// TrackedHand — raw tracker output
// ════════════════════════════════════════════════════════════════════════════

/// One hand as delivered by the tracker, before any interpretation.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedHand {
    pub landmarks: Vec<Point>,
    /// Handedness hint. Possibly empty; matched case-insensitively.
    pub label: String,
}

// ════════════════════════════════════════════════════════════════════════════
// ControlPointKind
// ════════════════════════════════════════════════════════════════════════════

/// Which single point stands in for the whole hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlPointKind {
    /// The index fingertip (landmark 8).
    IndexTip,
    /// The centroid of all landmarks.
    Centroid,
}

impl ControlPointKind {
    /// Extract the control point, or `None` for a landmark list too short
    /// to carry one. Such detections are excluded from role candidacy.
    pub fn extract(&self, landmarks: &[Point]) -> Option<Point> {
        match self {
            ControlPointKind::IndexTip => landmarks.get(INDEX_TIP).copied(),
            ControlPointKind::Centroid => {
                if landmarks.is_empty() {
                    return None;
                }
                let n = landmarks.len() as f32;
                let sum = landmarks.iter().fold((0.0, 0.0), |acc, p| (acc.0 + p.x, acc.1 + p.y));
                Some(Point::new(sum.0 / n, sum.1 / n))
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandDetection
// ════════════════════════════════════════════════════════════════════════════

/// One frame-local hand candidate with its antenna distances precomputed.
#[derive(Clone, Debug)]
pub struct HandDetection {
    pub landmarks:       Vec<Point>,
    /// Lowercased handedness label ("" when the tracker gave none).
    pub label:           String,
    pub control_point:   Option<Point>,
    /// Distance from the control point to the pitch antenna anchor.
    /// `INFINITY` when there is no control point.
    pub pitch_distance:  f32,
    /// Distance from the control point to the volume antenna anchor.
    pub volume_distance: f32,
}

impl HandDetection {
    /// Build a detection from raw tracker output under the active mode.
    pub fn from_tracked(hand: &TrackedHand, kind: ControlPointKind, config: &ModeConfig) -> Self {
        let control_point = kind.extract(&hand.landmarks);
        let (pitch_distance, volume_distance) = match control_point {
            Some(p) => (
                p.distance_to(config.pitch_antenna.anchor_for(p)),
                p.distance_to(config.volume_antenna.anchor_for(p)),
            ),
            None => (f32::INFINITY, f32::INFINITY),
        };

        HandDetection {
            landmarks: hand.landmarks.clone(),
            label: hand.label.to_lowercase(),
            control_point,
            pitch_distance,
            volume_distance,
        }
    }

    /// Whether this detection may be bound to a role at all.
    pub fn is_candidate(&self) -> bool {
        self.control_point.is_some()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::TrackingMode;

    fn full_hand(tip: Point) -> TrackedHand {
        let mut landmarks = vec![Point::new(0.5, 0.5); LANDMARKS_PER_HAND];
        landmarks[INDEX_TIP] = tip;
        TrackedHand { landmarks, label: "Left".to_string() }
    }

    #[test]
    fn index_tip_control_point() {
        let config = ModeConfig::for_mode(TrackingMode::LeftHandPitch);
        let hand = full_hand(Point::new(0.2, 0.4));
        let det = HandDetection::from_tracked(&hand, ControlPointKind::IndexTip, &config);
        assert_eq!(det.control_point, Some(Point::new(0.2, 0.4)));
        assert!(det.is_candidate());
        assert!(det.pitch_distance.is_finite());
    }

    #[test]
    fn centroid_control_point() {
        let config = ModeConfig::for_mode(TrackingMode::LeftHandPitch);
        let hand = TrackedHand {
            landmarks: vec![Point::new(0.2, 0.2), Point::new(0.4, 0.6)],
            label: String::new(),
        };
        let det = HandDetection::from_tracked(&hand, ControlPointKind::Centroid, &config);
        let c = det.control_point.unwrap();
        assert!((c.x - 0.3).abs() < 1e-6);
        assert!((c.y - 0.4).abs() < 1e-6);
    }

    #[test]
    fn short_landmark_list_is_not_a_candidate() {
        let config = ModeConfig::for_mode(TrackingMode::LeftHandPitch);
        let hand = TrackedHand {
            landmarks: vec![Point::new(0.5, 0.5); 4],
            label: "Right".to_string(),
        };
        let det = HandDetection::from_tracked(&hand, ControlPointKind::IndexTip, &config);
        assert!(!det.is_candidate());
        assert_eq!(det.pitch_distance, f32::INFINITY);
        assert_eq!(det.volume_distance, f32::INFINITY);
    }

    #[test]
    fn empty_landmark_list_has_no_centroid() {
        let config = ModeConfig::for_mode(TrackingMode::LeftHandPitch);
        let hand = TrackedHand { landmarks: Vec::new(), label: String::new() };
        let det = HandDetection::from_tracked(&hand, ControlPointKind::Centroid, &config);
        assert!(!det.is_candidate());
    }

    #[test]
    fn label_is_lowercased() {
        let config = ModeConfig::for_mode(TrackingMode::LeftHandPitch);
        let det = HandDetection::from_tracked(&full_hand(Point::new(0.5, 0.5)),
                                              ControlPointKind::IndexTip, &config);
        assert_eq!(det.label, "left");
    }
}
