//! Role assignment: which detection plays pitch, which plays volume.
//!
//! The tracker gives no identity guarantee between frames and its
//! handedness labels may be missing, duplicated, or contradictory, so every
//! frame the roles are recomputed from scratch. Priority order:
//!
//! 1. Label match (exact beats partial; ties by antenna distance).
//! 2. Nearest-neighbor fallback when labels filled exactly one role.
//! 3. Single-hand heuristic: one unlabeled candidate goes to its closer role.
//! 4. Joint-cost minimization over ordered pairs of unlabeled candidates.
//! 5. Collision repair, should both roles ever land on one detection.
//!
//! The whole pass is a pure function of (detections, config); role
//! stickiness across frames is deliberately absent.

use crate::hand::HandDetection;
use crate::mode::ModeConfig;

// ════════════════════════════════════════════════════════════════════════════
// RoleAssignment
// ════════════════════════════════════════════════════════════════════════════

/// Indices into the frame's detection list, at most one per role.
/// Invariant: `pitch != volume` whenever two or more distinct candidates
/// were supplied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoleAssignment {
    pub pitch:  Option<usize>,
    pub volume: Option<usize>,
}

// ════════════════════════════════════════════════════════════════════════════
// Label matching
// ════════════════════════════════════════════════════════════════════════════

/// Strength of a handedness-label match, weakest first so `Ord` ranks them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum LabelMatch {
    None,
    /// The label contains the role label as a substring ("right_0").
    Partial,
    /// The label equals the role label.
    Exact,
}

fn match_label(label: &str, role_label: &str) -> LabelMatch {
    if label.is_empty() {
        LabelMatch::None
    } else if label == role_label {
        LabelMatch::Exact
    } else if label.contains(role_label) {
        LabelMatch::Partial
    } else {
        LabelMatch::None
    }
}

/// Best labeled candidate for a role among the unused detections: strongest
/// match wins, ties go to the smaller role distance, then the lower index.
fn best_label_candidate(
    detections: &[HandDetection],
    used: &[bool],
    role_label: &str,
    role_distance: impl Fn(&HandDetection) -> f32,
) -> Option<(usize, LabelMatch)> {
    let mut best: Option<(usize, LabelMatch, f32)> = None;

    for (i, det) in detections.iter().enumerate() {
        if used[i] || !det.is_candidate() {
            continue;
        }
        let strength = match_label(&det.label, role_label);
        if strength == LabelMatch::None {
            continue;
        }
        let dist = role_distance(det);
        let better = match best {
            None => true,
            Some((_, s, d)) => strength > s || (strength == s && dist < d),
        };
        if better {
            best = Some((i, strength, dist));
        }
    }

    best.map(|(i, s, _)| (i, s))
}

/// Unused candidate nearest to a role's antenna.
fn nearest_candidate(
    detections: &[HandDetection],
    used: &[bool],
    role_distance: impl Fn(&HandDetection) -> f32,
) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, det) in detections.iter().enumerate() {
        if used[i] || !det.is_candidate() {
            continue;
        }
        let dist = role_distance(det);
        if best.map_or(true, |(_, d)| dist < d) {
            best = Some((i, dist));
        }
    }
    best.map(|(i, _)| i)
}

// ════════════════════════════════════════════════════════════════════════════
// assign_roles
// ════════════════════════════════════════════════════════════════════════════

/// Assign at most one detection to each role for this frame.
///
/// Tolerates any number of detections; extras beyond two are simply never
/// chosen, and detections without a control point are excluded up front.
pub fn assign_roles(detections: &[HandDetection], config: &ModeConfig) -> RoleAssignment {
    let mut used = vec![false; detections.len()];

    // ── 1. label pass ─────────────────────────────────────────────────────
    let mut pitch = None;
    let mut pitch_match = LabelMatch::None;
    if let Some((i, m)) =
        best_label_candidate(detections, &used, config.pitch_label, |d| d.pitch_distance)
    {
        pitch = Some(i);
        pitch_match = m;
        used[i] = true;
    }

    let mut volume = None;
    let mut volume_match = LabelMatch::None;
    if let Some((i, m)) =
        best_label_candidate(detections, &used, config.volume_label, |d| d.volume_distance)
    {
        volume = Some(i);
        volume_match = m;
        used[i] = true;
    }

    // ── 2–4. spatial fallbacks ────────────────────────────────────────────
    match (pitch, volume) {
        // 2. Labels split one role off; the other takes the nearest leftover.
        (Some(_), None) => {
            if let Some(i) = nearest_candidate(detections, &used, |d| d.volume_distance) {
                volume = Some(i);
                used[i] = true;
            }
        }
        (None, Some(_)) => {
            if let Some(i) = nearest_candidate(detections, &used, |d| d.pitch_distance) {
                pitch = Some(i);
                used[i] = true;
            }
        }
        // Labels said nothing usable.
        (None, None) => {
            let remaining: Vec<usize> = (0..detections.len())
                .filter(|&i| !used[i] && detections[i].is_candidate())
                .collect();

            match remaining.len() {
                0 => {}
                // 3. A lone hand plays whichever role it is closer to.
                1 => {
                    let i = remaining[0];
                    if detections[i].pitch_distance <= detections[i].volume_distance {
                        pitch = Some(i);
                    } else {
                        volume = Some(i);
                    }
                    used[i] = true;
                }
                // 4. Joint cost over every ordered pair; first minimum wins.
                _ => {
                    let mut best: Option<(usize, usize, f32)> = None;
                    for &i in &remaining {
                        for &j in &remaining {
                            if i == j {
                                continue;
                            }
                            let cost =
                                detections[i].pitch_distance + detections[j].volume_distance;
                            if best.map_or(true, |(_, _, c)| cost < c) {
                                best = Some((i, j, cost));
                            }
                        }
                    }
                    if let Some((i, j, _)) = best {
                        pitch = Some(i);
                        volume = Some(j);
                        used[i] = true;
                        used[j] = true;
                    }
                }
            }
        }
        (Some(_), Some(_)) => {}
    }

    // ── 5. collision repair ───────────────────────────────────────────────
    let assignment = RoleAssignment { pitch, volume };
    if pitch.is_some() && pitch == volume {
        resolve_collision(detections, assignment, pitch_match, volume_match)
    } else {
        assignment
    }
}

/// Repair an assignment where both roles reference the same detection.
///
/// The steps above never produce one, but the invariant is load-bearing for
/// the synth (a hand cannot drive pitch and volume at once), so the repair
/// stays as the documented final step: prefer moving whichever role has the
/// better second-choice candidate; with none, the stronger label match
/// keeps the hand, and on equal strength the closer role does.
fn resolve_collision(
    detections: &[HandDetection],
    assignment: RoleAssignment,
    pitch_match: LabelMatch,
    volume_match: LabelMatch,
) -> RoleAssignment {
    let shared = match assignment.pitch {
        Some(i) => i,
        None => return assignment,
    };

    let mut used = vec![false; detections.len()];
    used[shared] = true;

    let alt_pitch = nearest_candidate(detections, &used, |d| d.pitch_distance);
    let alt_volume = nearest_candidate(detections, &used, |d| d.volume_distance);

    match (alt_pitch, alt_volume) {
        (Some(p), Some(v)) => {
            // Move the role whose second choice costs less.
            if detections[p].pitch_distance <= detections[v].volume_distance {
                RoleAssignment { pitch: Some(p), volume: Some(shared) }
            } else {
                RoleAssignment { pitch: Some(shared), volume: Some(v) }
            }
        }
        (Some(p), None) => RoleAssignment { pitch: Some(p), volume: Some(shared) },
        (None, Some(v)) => RoleAssignment { pitch: Some(shared), volume: Some(v) },
        (None, None) => {
            // Only one hand visible: it keeps the stronger-matched role.
            let keep_pitch = if pitch_match != volume_match {
                pitch_match > volume_match
            } else {
                detections[shared].pitch_distance <= detections[shared].volume_distance
            };
            if keep_pitch {
                RoleAssignment { pitch: Some(shared), volume: None }
            } else {
                RoleAssignment { pitch: None, volume: Some(shared) }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::hand::{ControlPointKind, TrackedHand, INDEX_TIP, LANDMARKS_PER_HAND};
    use crate::mode::{ModeConfig, TrackingMode};

    fn config() -> ModeConfig {
        ModeConfig::for_mode(TrackingMode::LeftHandPitch)
    }

    fn det(label: &str, x: f32, y: f32, cfg: &ModeConfig) -> HandDetection {
        let mut landmarks = vec![Point::new(x, y); LANDMARKS_PER_HAND];
        landmarks[INDEX_TIP] = Point::new(x, y);
        let hand = TrackedHand { landmarks, label: label.to_string() };
        HandDetection::from_tracked(&hand, ControlPointKind::IndexTip, cfg)
    }

    fn malformed(cfg: &ModeConfig) -> HandDetection {
        let hand = TrackedHand { landmarks: vec![Point::new(0.5, 0.5); 3], label: String::new() };
        HandDetection::from_tracked(&hand, ControlPointKind::IndexTip, cfg)
    }

    #[test]
    fn no_detections_no_roles() {
        let cfg = config();
        let a = assign_roles(&[], &cfg);
        assert_eq!(a, RoleAssignment::default());
    }

    #[test]
    fn exact_labels_win_regardless_of_position() {
        let cfg = config();
        // The "left" hand sits on top of the volume antenna; labels still rule.
        let hands = [det("left", 0.9, 0.82, &cfg), det("right", 0.14, 0.5, &cfg)];
        let a = assign_roles(&hands, &cfg);
        assert_eq!(a.pitch, Some(0));
        assert_eq!(a.volume, Some(1));
    }

    #[test]
    fn single_exact_label_takes_its_role() {
        let cfg = ModeConfig::for_mode(TrackingMode::RightHandPitch);
        // One hand labeled exactly as the configured pitch label, parked far
        // from the pitch antenna.
        let hands = [det("right", 0.1, 0.5, &cfg)];
        let a = assign_roles(&hands, &cfg);
        assert_eq!(a.pitch, Some(0));
        assert_eq!(a.volume, None);
    }

    #[test]
    fn partial_label_matches() {
        let cfg = config();
        let hands = [det("left_0", 0.5, 0.5, &cfg), det("right_1", 0.5, 0.5, &cfg)];
        let a = assign_roles(&hands, &cfg);
        assert_eq!(a.pitch, Some(0));
        assert_eq!(a.volume, Some(1));
    }

    #[test]
    fn exact_beats_partial() {
        let cfg = config();
        // Both claim "left"-ness; the exact one gets pitch even though the
        // partial one is nearer the pitch antenna.
        let hands = [det("left-ish", 0.15, 0.5, &cfg), det("left", 0.5, 0.3, &cfg)];
        let a = assign_roles(&hands, &cfg);
        assert_eq!(a.pitch, Some(1));
    }

    #[test]
    fn duplicate_labels_tie_break_by_distance() {
        let cfg = config();
        // Two "left" hands; the one closer to the pitch antenna wins it and
        // the other falls through to the volume role.
        let hands = [det("left", 0.7, 0.5, &cfg), det("left", 0.2, 0.5, &cfg)];
        let a = assign_roles(&hands, &cfg);
        assert_eq!(a.pitch, Some(1));
        assert_eq!(a.volume, Some(0));
    }

    #[test]
    fn nearest_neighbor_fills_the_unlabeled_role() {
        let cfg = config();
        // Pitch is label-bound; of the two unlabeled hands the one nearer
        // the volume antenna takes volume.
        let hands = [
            det("left", 0.2, 0.5, &cfg),
            det("", 0.4, 0.2, &cfg),
            det("", 0.8, 0.8, &cfg),
        ];
        let a = assign_roles(&hands, &cfg);
        assert_eq!(a.pitch, Some(0));
        assert_eq!(a.volume, Some(2));
    }

    #[test]
    fn lone_unlabeled_hand_goes_to_closer_role() {
        let cfg = config();
        let near_pitch = [det("", 0.2, 0.5, &cfg)];
        let a = assign_roles(&near_pitch, &cfg);
        assert_eq!(a.pitch, Some(0));
        assert_eq!(a.volume, None);

        let near_volume = [det("", 0.8, 0.8, &cfg)];
        let a = assign_roles(&near_volume, &cfg);
        assert_eq!(a.pitch, None);
        assert_eq!(a.volume, Some(0));
    }

    #[test]
    fn joint_cost_splits_two_unlabeled_hands() {
        let cfg = config();
        // First hand hugs the pitch antenna, second hugs the volume loop:
        // the minimal-cost ordered pair is (pitch=0, volume=1).
        let hands = [det("", 0.15, 0.5, &cfg), det("", 0.8, 0.82, &cfg)];
        let a = assign_roles(&hands, &cfg);
        assert_eq!(a.pitch, Some(0));
        assert_eq!(a.volume, Some(1));
    }

    #[test]
    fn joint_cost_prefers_global_minimum_over_greedy() {
        let cfg = config();
        // Hand 0 is the greedy pick for pitch (0.36 vs 0.38) but hugging the
        // volume loop; the globally minimal pairing flips the roles.
        let hands = [det("", 0.5, 0.82, &cfg), det("", 0.52, 0.3, &cfg)];
        let a = assign_roles(&hands, &cfg);
        assert_eq!(a.pitch, Some(1));
        assert_eq!(a.volume, Some(0));
    }

    #[test]
    fn never_assigns_one_detection_to_both_roles() {
        let cfg = config();
        let positions = [
            (0.14, 0.5, 0.76, 0.82),
            (0.5, 0.5, 0.5, 0.5),
            (0.2, 0.8, 0.2, 0.81),
        ];
        for &(x1, y1, x2, y2) in &positions {
            for labels in [("", ""), ("left", "left"), ("right", "right"), ("left", "right")] {
                let hands = [det(labels.0, x1, y1, &cfg), det(labels.1, x2, y2, &cfg)];
                let a = assign_roles(&hands, &cfg);
                if let (Some(p), Some(v)) = (a.pitch, a.volume) {
                    assert_ne!(p, v, "labels {:?} positions {:?}", labels, (x1, y1, x2, y2));
                }
            }
        }
    }

    #[test]
    fn assignment_is_deterministic() {
        let cfg = config();
        let hands = [
            det("", 0.3, 0.4, &cfg),
            det("left", 0.6, 0.6, &cfg),
            det("", 0.7, 0.8, &cfg),
        ];
        let first = assign_roles(&hands, &cfg);
        for _ in 0..10 {
            assert_eq!(assign_roles(&hands, &cfg), first);
        }
    }

    #[test]
    fn extra_detections_are_tolerated() {
        let cfg = config();
        let hands = [
            det("left", 0.2, 0.5, &cfg),
            det("right", 0.8, 0.8, &cfg),
            det("", 0.5, 0.5, &cfg),
            det("left", 0.4, 0.4, &cfg),
        ];
        let a = assign_roles(&hands, &cfg);
        assert_eq!(a.pitch, Some(0));
        assert_eq!(a.volume, Some(1));
    }

    #[test]
    fn malformed_detections_are_excluded() {
        let cfg = config();
        let hands = [malformed(&cfg), det("", 0.2, 0.5, &cfg)];
        let a = assign_roles(&hands, &cfg);
        assert_eq!(a.pitch, Some(1));
        assert_eq!(a.volume, None);

        let only_malformed = [malformed(&cfg), malformed(&cfg)];
        let a = assign_roles(&only_malformed, &cfg);
        assert_eq!(a, RoleAssignment::default());
    }

    #[test]
    fn collision_repair_moves_the_cheaper_role() {
        let cfg = config();
        let hands = [det("", 0.3, 0.5, &cfg), det("", 0.7, 0.7, &cfg)];
        // Forced collision on detection 0.
        let broken = RoleAssignment { pitch: Some(0), volume: Some(0) };
        let fixed = resolve_collision(&hands, broken, LabelMatch::None, LabelMatch::None);
        assert!(fixed.pitch != fixed.volume);
        assert!(fixed.pitch == Some(1) || fixed.volume == Some(1));
    }

    #[test]
    fn collision_repair_without_alternatives_keeps_stronger_label() {
        let cfg = config();
        let hands = [det("left", 0.9, 0.2, &cfg)];
        let broken = RoleAssignment { pitch: Some(0), volume: Some(0) };
        let fixed = resolve_collision(&hands, broken, LabelMatch::Exact, LabelMatch::None);
        assert_eq!(fixed.pitch, Some(0));
        assert_eq!(fixed.volume, None);

        let fixed = resolve_collision(&hands, broken, LabelMatch::None, LabelMatch::Partial);
        assert_eq!(fixed.pitch, None);
        assert_eq!(fixed.volume, Some(0));
    }

    #[test]
    fn collision_repair_equal_strength_keeps_closer_role() {
        let cfg = config();
        let near_volume = [det("", 0.85, 0.8, &cfg)];
        let broken = RoleAssignment { pitch: Some(0), volume: Some(0) };
        let fixed = resolve_collision(&near_volume, broken, LabelMatch::None, LabelMatch::None);
        assert_eq!(fixed.pitch, None);
        assert_eq!(fixed.volume, Some(0));
    }
}
