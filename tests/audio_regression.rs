use polysynth::{
    engine::{OfflineBackend, OfflineRenderer},
    synth::settings::{EffectUpdate, EffectsUpdate},
    Engine, EngineConfig,
};
use rustfft::{num_complex::Complex, FftPlanner};

const SR: f32 = 48_000.0;
const FFT_SIZE: usize = 8_192;

fn engine() -> (Engine, OfflineRenderer) {
    let (backend, renderer) = OfflineBackend::new(SR);
    let mut engine = Engine::new(EngineConfig::default());
    engine.initialize_with(backend).unwrap();
    (engine, renderer)
}

fn peak_frequency(samples: &[f32]) -> f32 {
    let n = samples.len();
    let mut buffer: Vec<Complex<f32>> = samples
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let hann = 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / n as f32).cos();
            Complex::new(s * hann, 0.0)
        })
        .collect();

    FftPlanner::new().plan_fft_forward(n).process(&mut buffer);

    let (bin, _) = buffer[1..n / 2]
        .iter()
        .enumerate()
        .map(|(i, c)| (i + 1, c.norm()))
        .fold((0, 0.0f32), |best, cur| if cur.1 > best.1 { cur } else { best });
    bin as f32 * SR / n as f32
}

#[test]
fn silent_until_a_note_is_played() {
    let (_engine, renderer) = engine();
    let out = renderer.render_frames(4_096);
    assert!(out.iter().all(|&s| s == 0.0));
}

#[test]
fn held_a4_peaks_at_440_hz() {
    let (mut engine, renderer) = engine();
    engine.note_on("A4", 1.0).unwrap();

    // Let the attack and decay settle before analysing.
    renderer.render_frames(SR as usize / 2);
    let sustained = renderer.render_frames(FFT_SIZE);

    let peak = peak_frequency(&sustained);
    let bin_width = SR / FFT_SIZE as f32;
    assert!((peak - 440.0).abs() <= bin_width, "peak at {peak} Hz");
}

#[test]
fn released_note_decays_to_silence() {
    let (mut engine, renderer) = engine();
    engine.note_on("C4", 1.0).unwrap();
    renderer.render_frames(4_800);
    engine.note_off("C4").unwrap();

    // Release is 0.5 s; give the tail a full second.
    renderer.render_frames(SR as usize);
    let tail = renderer.render_frames(1_024);
    let peak = tail.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    assert!(peak < 1e-3, "tail peak {peak}");
}

#[test]
fn dense_chord_stays_under_the_limiter_ceiling() {
    let (mut engine, renderer) = engine();
    engine
        .update_effects(EffectsUpdate {
            distortion: Some(EffectUpdate {
                enabled: Some(true),
                wet: Some(1.0),
            }),
            ..Default::default()
        })
        .unwrap();
    engine.update_volume(12.0).unwrap();
    for note in ["C3", "E3", "G3", "C4", "E4", "G4", "B4", "D5"] {
        engine.note_on(note, 1.0).unwrap();
    }

    let out = renderer.render_frames(SR as usize);
    assert!(out.iter().any(|s| s.abs() > 0.1));
    assert!(out.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
}
