//! Software-rendered overlay using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ PITCH 440 HZ   VOLUME 62      mode / curve / reach readout   │
//! │  ┆                                                           │
//! │  ┆ pitch antenna        ● hand skeletons ●                   │
//! │  ┆   (dashed)          /  with dashed guide                  │
//! │  ┆                    ●   lines to anchors                   │
//! │  ┆              ╌╌╌╌╌╌╌╌╌╌╌╌ volume antenna ╌╌╌╌╌╌           │
//! │ status bar                                                   │
//! │ key legend                                                   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The window doubles as the simulation input surface: pointer position and
//! hand toggles are forwarded to the tracker channel, while app-level keys
//! come back to the caller as [`UiCommand`]s.

use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

use std::sync::mpsc::Sender;

use theremin_engine::{FrameControls, ModeConfig, Point, TrackedHand, INDEX_TIP};

use crate::app::UiCommand;
use crate::tracker::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W: usize = 960;
pub const WIN_H: usize = 720;

const STATUS_Y:  usize = WIN_H - 40;
const LEGEND_Y:  usize = WIN_H - 16;

const BG_COLOR:     u32 = 0xFF10141C;
const TEXT_BG:      u32 = 0xFF0F3460;
const TEXT_COLOR:   u32 = 0xFFEEEEEE;
const DIM_TEXT:     u32 = 0xFF888888;
const NEUTRAL_HAND: u32 = 0xFF9AA0B0;

const PITCH_ANTENNA_COLOR:  u32 = 0xFF3DD5F3;
const VOLUME_ANTENNA_COLOR: u32 = 0xFFFFE08A;
const LEFT_HAND_COLOR:      u32 = 0xFF44DCB0;
const RIGHT_HAND_COLOR:     u32 = 0xFFFF8F5A;

/// Standard 21-landmark hand skeleton connection table.
const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4),           // thumb
    (0, 5), (5, 6), (6, 7), (7, 8),           // index
    (5, 9), (9, 10), (10, 11), (11, 12),      // middle
    (9, 13), (13, 14), (14, 15), (15, 16),    // ring
    (13, 17), (17, 18), (18, 19), (19, 20),   // pinky
    (0, 17),                                  // palm edge
];

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf:    Vec<u32>,
    sim_tx: Sender<SimInput>,
}

impl Visualizer {
    pub fn new(sim_tx: Sender<SimInput>) -> Result<Self, String> {
        let mut window = Window::new(
            "Hand Theremin — antennas and overlay",
            WIN_W,
            WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| e.to_string())?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Poll window input. Simulation events go straight to the tracker
    /// channel; app-level commands are returned for the caller to act on.
    pub fn poll_input(&mut self) -> Vec<UiCommand> {
        let mut commands = Vec::new();
        if !self.window.is_open() {
            commands.push(UiCommand::Quit);
            return commands;
        }

        let one_shot = |w: &Window, k: Key| w.is_key_pressed(k, KeyRepeat::No);

        if one_shot(&self.window, Key::Q) {
            commands.push(UiCommand::Quit);
        }
        if one_shot(&self.window, Key::M) {
            commands.push(UiCommand::SwitchMode);
        }
        if one_shot(&self.window, Key::C) {
            commands.push(UiCommand::ToggleCurve);
        }
        if self.window.is_key_pressed(Key::Up, KeyRepeat::Yes) {
            commands.push(UiCommand::NudgeReach(0.05));
        }
        if self.window.is_key_pressed(Key::Down, KeyRepeat::Yes) {
            commands.push(UiCommand::NudgeReach(-0.05));
        }

        if one_shot(&self.window, Key::Tab) {
            let _ = self.sim_tx.send(SimInput::SwitchHand);
        }
        if one_shot(&self.window, Key::Key1) {
            let _ = self.sim_tx.send(SimInput::ToggleLeft);
        }
        if one_shot(&self.window, Key::Key2) {
            let _ = self.sim_tx.send(SimInput::ToggleRight);
        }

        if let Some((mx, my)) = self.window.get_mouse_pos(MouseMode::Clamp) {
            let _ = self.sim_tx.send(SimInput::Pointer {
                x: mx / WIN_W as f32,
                y: my / WIN_H as f32,
            });
        }

        commands
    }

    /// Render one frame.
    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        config: &ModeConfig,
        hands: &[TrackedHand],
        controls: Option<&FrameControls>,
        frequency: Option<f32>,
        volume_level: Option<f32>,
        status: &str,
        mode_name: &str,
        curve_name: &str,
        pitch_far: f32,
    ) {
        self.buf.fill(BG_COLOR);

        self.draw_antennas(config);

        // ── Hand skeletons ────────────────────────────────────────────────
        for hand in hands {
            self.draw_hand(hand);
        }

        // ── Guides from control point to anchor ───────────────────────────
        if let Some(c) = controls {
            if let Some((point, anchor)) = c.pitch_guide {
                self.draw_dashed_line(point, anchor, PITCH_ANTENNA_COLOR, 5, 6, 1);
                self.draw_ring(point, 7, PITCH_ANTENNA_COLOR);
            }
            if let Some((point, anchor)) = c.volume_guide {
                self.draw_dashed_line(point, anchor, VOLUME_ANTENNA_COLOR, 5, 6, 1);
                self.draw_ring(point, 7, VOLUME_ANTENNA_COLOR);
            }
        }

        // ── Readouts ──────────────────────────────────────────────────────
        let freq_text = match frequency {
            Some(f) => format!("PITCH {:>4} HZ", f.round() as u32),
            None    => "PITCH   -- HZ".to_string(),
        };
        let vol_text = match volume_level {
            Some(v) => format!("VOLUME {:>3}%", (v * 100.0).round() as u32),
            None    => "VOLUME  --%".to_string(),
        };
        self.draw_text(&freq_text, 12, 12, 2, PITCH_ANTENNA_COLOR);
        self.draw_text(&vol_text, 12, 28, 2, VOLUME_ANTENNA_COLOR);

        let (has_pitch, has_volume) = match controls {
            Some(c) => (c.has_pitch, c.has_volume),
            None    => (false, false),
        };
        self.draw_hand_state("pitch hand", has_pitch, 12, 48);
        self.draw_hand_state("volume hand", has_volume, 12, 60);

        let mode_text = format!("{}  |  {}  |  reach {:.2}", mode_name, curve_name, pitch_far);
        let mode_x = WIN_W.saturating_sub(mode_text.len() * 4 + 12);
        self.draw_text(&mode_text, mode_x, 12, 1, DIM_TEXT);

        // ── Status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, WIN_W, LEGEND_Y - STATUS_Y, TEXT_BG);
        self.draw_text(status, 10, STATUS_Y + 8, 1, TEXT_COLOR);

        // ── Key legend ────────────────────────────────────────────────────
        self.draw_text(
            "mouse=move hand  Tab=switch hand  1/2=toggle hands  M=mode  C=curve  Up/Down=reach  Q=quit",
            10,
            LEGEND_Y + 4,
            1,
            DIM_TEXT,
        );

        self.window.update_with_buffer(&self.buf, WIN_W, WIN_H).ok();
    }

    // ── Antennas ──────────────────────────────────────────────────────────

    fn draw_antennas(&mut self, config: &ModeConfig) {
        let pa = config.pitch_antenna;
        self.draw_dashed_line(
            Point::new(pa.x, pa.y1),
            Point::new(pa.x, pa.y2),
            PITCH_ANTENNA_COLOR,
            10,
            8,
            3,
        );

        let va = config.volume_antenna;
        self.draw_dashed_line(
            Point::new(va.x1, va.y),
            Point::new(va.x2, va.y),
            VOLUME_ANTENNA_COLOR,
            10,
            8,
            3,
        );
    }

    // ── Hands ─────────────────────────────────────────────────────────────

    fn draw_hand(&mut self, hand: &TrackedHand) {
        let color = hand_color(&hand.label);

        for &(a, b) in &HAND_CONNECTIONS {
            if let (Some(&pa), Some(&pb)) = (hand.landmarks.get(a), hand.landmarks.get(b)) {
                self.draw_line(pa, pb, color);
            }
        }
        for &p in &hand.landmarks {
            let (x, y) = to_px(p);
            self.fill_rect(x.saturating_sub(1), y.saturating_sub(1), 3, 3, color);
        }
        // Mark the fingertip driving the mapping.
        if let Some(&tip) = hand.landmarks.get(INDEX_TIP) {
            let (x, y) = to_px(tip);
            self.fill_rect(x.saturating_sub(2), y.saturating_sub(2), 5, 5,
                           blend(color, 0xFFFFFFFF, 0.5));
        }
    }

    fn draw_hand_state(&mut self, role: &str, tracking: bool, x: usize, y: usize) {
        let (text, color) = if tracking {
            (format!("{}: tracking", role), 0xFF7CE58A)
        } else {
            (format!("{}: missing", role), 0xFFE06666)
        };
        self.draw_text(&text, x, y, 1, color);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(WIN_H) {
            for col in x..(x + w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < WIN_W && y < WIN_H {
            self.buf[y * WIN_W + x] = color;
        }
    }

    /// Solid line between two normalized points, stepped at pixel pitch.
    fn draw_line(&mut self, a: Point, b: Point, color: u32) {
        self.draw_dashed_line(a, b, color, usize::MAX, 0, 1);
    }

    /// Dashed line: `dash` pixels on, `gap` pixels off, square pen of
    /// `thickness` pixels.
    fn draw_dashed_line(
        &mut self,
        a: Point,
        b: Point,
        color: u32,
        dash: usize,
        gap: usize,
        thickness: usize,
    ) {
        let (x0, y0) = to_px_f(a);
        let (x1, y1) = to_px_f(b);
        let (dx, dy) = (x1 - x0, y1 - y0);
        let length = (dx * dx + dy * dy).sqrt().max(1.0);
        let steps = length as usize;
        let period = dash.saturating_add(gap).max(1);

        for step in 0..=steps {
            if dash != usize::MAX && step % period >= dash {
                continue;
            }
            let t = step as f32 / length;
            let px = (x0 + dx * t) as usize;
            let py = (y0 + dy * t) as usize;
            for oy in 0..thickness {
                for ox in 0..thickness {
                    self.set_pixel(px + ox, py + oy, color);
                }
            }
        }
    }

    fn draw_ring(&mut self, center: Point, radius: usize, color: u32) {
        let (cx, cy) = to_px(center);
        let r = radius as isize;
        let mut angle = 0.0f32;
        while angle < std::f32::consts::TAU {
            let x = cx as isize + (angle.cos() * r as f32) as isize;
            let y = cy as isize + (angle.sin() * r as f32) as isize;
            if x >= 0 && y >= 0 {
                self.set_pixel(x as usize, y as usize, color);
            }
            angle += 0.1;
        }
    }

    /// Minimal bitmap font — 3×5 characters scaled up by `scale`.
    fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale; // 3 wide + 1 gap
            if cx + 4 * scale > WIN_W {
                break;
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Free helpers
// ────────────────────────────────────────────────────────────────────────────

fn to_px(p: Point) -> (usize, usize) {
    let (x, y) = to_px_f(p);
    (x as usize, y as usize)
}

fn to_px_f(p: Point) -> (f32, f32) {
    (
        (p.x.clamp(0.0, 1.0) * (WIN_W - 1) as f32),
        (p.y.clamp(0.0, 1.0) * (WIN_H - 1) as f32),
    )
}

fn hand_color(label: &str) -> u32 {
    let label = label.to_lowercase();
    if label.contains("left") {
        LEFT_HAND_COLOR
    } else if label.contains("right") {
        RIGHT_HAND_COLOR
    } else {
        NEUTRAL_HAND
    }
}

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '|' => [0b010, 0b010, 0b010, 0b010, 0b010],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hand_colors_follow_labels() {
        assert_eq!(hand_color("Left"), LEFT_HAND_COLOR);
        assert_eq!(hand_color("right_0"), RIGHT_HAND_COLOR);
        assert_eq!(hand_color(""), NEUTRAL_HAND);
    }

    #[test]
    fn to_px_clamps_out_of_range_points() {
        assert_eq!(to_px(Point::new(-1.0, 2.0)), (0, WIN_H - 1));
        assert_eq!(to_px(Point::new(1.0, 0.0)), (WIN_W - 1, 0));
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 0.0), 0xFF000000);
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
    }

    #[test]
    fn every_legend_char_has_a_glyph() {
        let legend = "mouse=move hand Tab=switch 1/2=toggle M=mode C=curve Up/Down=reach Q=quit";
        for ch in legend.chars() {
            // No character in the legend should fall back to the dot glyph,
            // except those that genuinely are dots.
            if ch != '.' {
                assert_ne!(char_glyph(ch), char_glyph('\u{1}'), "missing glyph for {ch:?}");
            }
        }
    }
}
