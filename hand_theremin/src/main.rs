//! hand_theremin — interactive entry point.

use std::io::{self, Write};

use hand_theremin::app::{run, AppConfig};
use theremin_engine::{ControlPointKind, ResponseCurve, TrackingMode, LOG_CURVE_K};

fn main() {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║           Hand Theremin — antennas in thin air               ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hand tracking");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Mouse simulation  (use --features leap for hardware)");
    println!();

    let cfg = if std::env::args().any(|a| a == "--quick") {
        println!("  Quick-start: left-hand pitch, log curve, index fingertip\n");
        AppConfig::default()
    } else {
        configure_interactively()
    };

    println!();
    println!("  Opening overlay window…");
    println!();

    if let Err(e) = run(cfg) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn configure_interactively() -> AppConfig {
    println!("  Layout:  1. left-hand pitch   2. right-hand pitch");
    let mode = match read_line("  Choice (default 1): ").trim() {
        "2" => TrackingMode::RightHandPitch,
        _   => TrackingMode::LeftHandPitch,
    };

    println!("  Pitch curve:  1. log-compressed (fine control near antenna)");
    println!("                2. inverse-square (field-like falloff)");
    let pitch_curve = match read_line("  Choice (default 1): ").trim() {
        "2" => ResponseCurve::InverseSquare,
        _   => ResponseCurve::LogCompressed { k: LOG_CURVE_K },
    };

    println!("  Control point:  1. index fingertip   2. hand centroid");
    let control_point = match read_line("  Choice (default 1): ").trim() {
        "2" => ControlPointKind::Centroid,
        _   => ControlPointKind::IndexTip,
    };

    let pitch_far = read_line("  Pitch reach 0.1–1.0 (default 0.55): ")
        .trim()
        .parse::<f32>()
        .ok()
        .map(|f| f.clamp(0.1, 1.0));

    AppConfig { mode, pitch_curve, control_point, pitch_far }
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
