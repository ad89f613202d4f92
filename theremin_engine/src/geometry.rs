//! Antenna geometry in normalized camera coordinates.
//!
//! Everything here works in the [0,1]×[0,1] frame space the tracker reports
//! (x right, y down). The antennas are fixed guides a hand's distance is
//! measured against: a vertical segment for pitch, a horizontal one for
//! volume. All functions are pure and total for finite inputs; callers
//! filter out hands without a control point before measuring.

// ════════════════════════════════════════════════════════════════════════════
// Point
// ════════════════════════════════════════════════════════════════════════════

/// A 2D point in normalized frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance_to(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Antennas
// ════════════════════════════════════════════════════════════════════════════

/// Vertical pitch antenna: the segment from (x, y1) to (x, y2).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PitchAntenna {
    pub x:  f32,
    pub y1: f32,
    pub y2: f32,
}

impl PitchAntenna {
    /// Nearest point on the antenna segment to `point`: the hand's vertical
    /// coordinate clamped into [y1, y2], x fixed to the antenna's x.
    pub fn anchor_for(&self, point: Point) -> Point {
        Point {
            x: self.x,
            y: point.y.clamp(self.y1, self.y2),
        }
    }
}

/// Horizontal volume antenna: the segment from (x1, y) to (x2, y).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeAntenna {
    pub x1: f32,
    pub x2: f32,
    pub y:  f32,
}

impl VolumeAntenna {
    /// Nearest point on the antenna segment to `point`: the hand's
    /// horizontal coordinate clamped into [x1, x2], y fixed.
    pub fn anchor_for(&self, point: Point) -> Point {
        Point {
            x: point.x.clamp(self.x1, self.x2),
            y: self.y,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
