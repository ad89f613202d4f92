//! Continuous sine-voice synthesizer.
//!
//! The theremin needs a single always-running oscillator whose frequency
//! and gain glide toward per-frame targets. Targets arrive at tracker frame
//! rate already EMA-smoothed; here each is applied through a one-pole ramp
//! at audio rate (the second smoothing stage) so retunes and hand loss
//! never click.

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use theremin_engine::SynthTargets;

// ════════════════════════════════════════════════════════════════════════════
// Synth — abstraction over cpal / null (for testing)
// ════════════════════════════════════════════════════════════════════════════

/// Narrow audio-sink contract: ramp toward this frame's targets.
pub trait Synth {
    fn apply(&mut self, targets: &SynthTargets);
}

// ── null backend (used when no audio device is available) ──────────────────

pub struct NullSynth;

impl Synth for NullSynth {
    fn apply(&mut self, _targets: &SynthTargets) {}
}

// ════════════════════════════════════════════════════════════════════════════
// Voice — shared between the control thread and the audio callback
// ════════════════════════════════════════════════════════════════════════════

/// One-pole ramp coefficient for a time constant in seconds at a given
/// sample rate.
fn ramp_coeff(time_constant: f32, sample_rate: f32) -> f32 {
    1.0 - (-1.0 / (time_constant * sample_rate)).exp()
}

struct Voice {
    sample_rate:      f32,
    phase:            f32,
    frequency:        f32,
    gain:             f32,
    target_frequency: f32,
    target_gain:      f32,
    freq_coeff:       f32,
    gain_coeff:       f32,
}

impl Voice {
    fn new(sample_rate: f32) -> Self {
        Voice {
            sample_rate,
            phase:            0.0,
            frequency:        440.0,
            gain:             0.0,
            target_frequency: 440.0,
            target_gain:      0.0,
            freq_coeff:       ramp_coeff(0.045, sample_rate),
            gain_coeff:       ramp_coeff(0.05, sample_rate),
        }
    }

    fn retarget(&mut self, targets: &SynthTargets) {
        if let Some(f) = targets.frequency {
            self.target_frequency = f;
        }
        self.target_gain = targets.gain;
        self.freq_coeff = ramp_coeff(targets.frequency_ramp, self.sample_rate);
        self.gain_coeff = ramp_coeff(targets.gain_ramp, self.sample_rate);
    }

    fn next_sample(&mut self) -> f32 {
        use std::f32::consts::TAU;

        self.frequency += (self.target_frequency - self.frequency) * self.freq_coeff;
        self.gain += (self.target_gain - self.gain) * self.gain_coeff;

        self.phase += TAU * self.frequency / self.sample_rate;
        if self.phase > TAU {
            self.phase -= TAU;
        }
        self.phase.sin() * self.gain
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CpalSynth
// ════════════════════════════════════════════════════════════════════════════

/// cpal-backed sine voice. The stream runs on the audio thread; `apply`
/// only swaps targets under the shared lock.
pub struct CpalSynth {
    _stream: cpal::Stream,
    voice:   Arc<Mutex<Voice>>,
}

impl CpalSynth {
    pub fn open() -> Result<Self, String> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| "no default output device".to_string())?;
        let config = device.default_output_config().map_err(|e| e.to_string())?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        let voice = Arc::new(Mutex::new(Voice::new(sample_rate)));

        let err_fn = |err| eprintln!("[synth] stream error: {err}");

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => device
                .build_output_stream(
                    &config.into(),
                    {
                        let voice = Arc::clone(&voice);
                        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                            fill_buffer(data, channels, &voice, |s| s);
                        }
                    },
                    err_fn,
                    None,
                )
                .map_err(|e| e.to_string())?,
            cpal::SampleFormat::I16 => device
                .build_output_stream(
                    &config.into(),
                    {
                        let voice = Arc::clone(&voice);
                        move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                            fill_buffer(data, channels, &voice, |s| {
                                (s * i16::MAX as f32) as i16
                            });
                        }
                    },
                    err_fn,
                    None,
                )
                .map_err(|e| e.to_string())?,
            other => return Err(format!("unsupported sample format {other:?}")),
        };

        stream.play().map_err(|e| e.to_string())?;

        Ok(CpalSynth { _stream: stream, voice })
    }
}

fn fill_buffer<T: Copy>(
    data: &mut [T],
    channels: usize,
    voice: &Arc<Mutex<Voice>>,
    convert: impl Fn(f32) -> T,
) {
    let Ok(mut voice) = voice.lock() else { return };
    let mut frame = 0usize;
    while frame < data.len() {
        let s = convert(voice.next_sample());
        for ch in 0..channels {
            let idx = frame + ch;
            if idx < data.len() {
                data[idx] = s;
            }
        }
        frame += channels.max(1);
    }
}

impl Synth for CpalSynth {
    fn apply(&mut self, targets: &SynthTargets) {
        if let Ok(mut voice) = self.voice.lock() {
            voice.retarget(targets);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// open_synth — pick a backend
// ════════════════════════════════════════════════════════════════════════════

/// Open the default audio output, falling back to a silent backend with a
/// warning so the overlay and tracking still work without a sound card.
pub fn open_synth() -> Box<dyn Synth> {
    match CpalSynth::open() {
        Ok(synth) => Box::new(synth),
        Err(e) => {
            eprintln!("[synth] audio init failed: {} — running silent", e);
            Box::new(NullSynth)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
