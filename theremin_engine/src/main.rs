//! Interactive terminal explorer for the theremin engine: pick a mode and a
//! pitch curve, type hand positions, and see the role assignment and synth
//! targets the engine derives — no camera, window, or audio required.

use std::io::{self, Write};

use theremin_engine::{
    ControlPointKind, Point, ResponseCurve, Theremin, TrackedHand, TrackingMode,
    DistanceRange, INDEX_TIP, LANDMARKS_PER_HAND, LOG_CURVE_K,
};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║            Theremin Engine — Frame Explorer              ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();

    let mode = pick_mode();
    let curve = pick_curve();
    let mut engine = Theremin::new(mode, curve, ControlPointKind::IndexTip);

    println!();
    println!("  Mode  : {}", mode.name());
    println!("  Curve : {}", curve.name());
    print_curve_table(curve, engine.config().pitch_range);

    loop {
        print_ops_menu();
        let choice = read_line("Command: ").trim().to_ascii_lowercase();

        match choice.as_str() {
            "1" => {
                let hands = read_hands();
                run_frame(&mut engine, &hands);
            }
            "2" => {
                engine.set_mode(engine.mode().toggled());
                println!("  Mode now: {}  (pitch label \"{}\")",
                         engine.mode().name(), engine.config().pitch_label);
            }
            "3" => {
                let far: f32 = read_line("  Pitch reach 0.1–1.0 (default 0.55): ")
                    .trim().parse().unwrap_or(0.55);
                engine.set_pitch_far(far);
                println!("  Pitch far distance now {:.2}.", engine.pitch_far());
            }
            "4" => {
                print_curve_table(engine.pitch_curve(), engine.config().pitch_range);
            }
            "q" => {
                println!("\nGoodbye!\n");
                break;
            }
            _ => println!("  ⚠  Please enter 1–4 or q.\n"),
        }
    }
}

fn run_frame(engine: &mut Theremin, hands: &[TrackedHand]) {
    let controls = engine.process(hands);
    let targets = engine.advance(&controls);

    println!();
    println!("  ┌─ frame result ─");
    match controls.assignment.pitch {
        Some(i) => println!("  │  pitch hand  : detection {}", i),
        None    => println!("  │  pitch hand  : (absent)"),
    }
    match controls.assignment.volume {
        Some(i) => println!("  │  volume hand : detection {}", i),
        None    => println!("  │  volume hand : (absent)"),
    }
    println!("  │  pitch control    : {:.3}", controls.pitch_control);
    println!("  │  volume proximity : {:.3}", controls.volume_proximity);
    match targets.frequency {
        Some(f) => println!("  │  frequency   : {:.1} Hz", f),
        None    => println!("  │  frequency   : -- (not retargeted)"),
    }
    println!("  │  gain        : {:.3}", targets.gain);
    println!("  └─");
    println!();
}

fn read_hands() -> Vec<TrackedHand> {
    let n: usize = read_line("  How many hands? (0–4, default 2): ")
        .trim().parse().unwrap_or(2).min(4);

    let mut hands = Vec::with_capacity(n);
    for i in 0..n {
        let label = read_line(&format!("  Hand {} label (left/right/empty): ", i))
            .trim().to_string();
        let x: f32 = read_line("    x 0–1: ").trim().parse().unwrap_or(0.5);
        let y: f32 = read_line("    y 0–1: ").trim().parse().unwrap_or(0.5);

        let mut landmarks = vec![Point::new(x, y); LANDMARKS_PER_HAND];
        landmarks[INDEX_TIP] = Point::new(x, y);
        hands.push(TrackedHand { landmarks, label });
    }
    hands
}

fn pick_mode() -> TrackingMode {
    println!("  Layout:  1. left-hand pitch (default)   2. right-hand pitch (mirrored)");
    match read_line("  Choice (default 1): ").trim() {
        "2" => TrackingMode::RightHandPitch,
        _   => TrackingMode::LeftHandPitch,
    }
}

fn pick_curve() -> ResponseCurve {
    println!("  Pitch curve:  1. log-compressed (k=14)   2. inverse-square");
    match read_line("  Choice (default 1): ").trim() {
        "2" => ResponseCurve::InverseSquare,
        _   => ResponseCurve::LogCompressed { k: LOG_CURVE_K },
    }
}

fn print_curve_table(curve: ResponseCurve, range: DistanceRange) {
    println!();
    println!("  distance → control ({}, near {:.2}, far {:.2}):",
             curve.name(), range.near, range.far);
    print!("   ");
    for step in 0..=10 {
        let d = range.near + (range.far - range.near) * step as f32 / 10.0;
        print!(" {:.2}→{:.2}", d, curve.control_for(d, range));
        if step == 5 { print!("\n   "); }
    }
    println!();
    println!();
}

fn print_ops_menu() {
    println!("  ┌──────────────────────────────────────────────┐");
    println!("  │  1. Run a frame (type hand positions)        │");
    println!("  │  2. Toggle mode                              │");
    println!("  │  3. Set pitch reach (far distance)           │");
    println!("  │  4. Print pitch-curve table                  │");
    println!("  │  q. Quit                                     │");
    println!("  └──────────────────────────────────────────────┘");
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
