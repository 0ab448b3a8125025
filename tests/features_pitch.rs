use approx::assert_abs_diff_eq;
use voiceprops::analysis::pitch::PitchTracker;
use voiceprops::config::PitchConfig;
use voiceprops::{FeatureExtractor, Waveform};

const SAMPLE_RATE: u32 = 22_050;
const DURATION_SECONDS: f64 = 0.8;

#[test]
fn steady_voice_yields_consistent_fundamental() {
    let clip = voiced_clip(150.0, 150.0);
    let track = PitchTracker::default().track(&clip).expect("track pitch");
    let voiced = track.voiced_frequencies();

    assert!(
        voiced.len() * 10 >= track.frames.len() * 9,
        "expected most frames voiced, got {}/{}",
        voiced.len(),
        track.frames.len()
    );
    let summary = track.summary();
    assert_abs_diff_eq!(summary.mean, 150.0, epsilon = 3.0);
    assert!(summary.min <= summary.mean && summary.mean <= summary.max);
}

#[test]
fn rising_glide_raises_fundamental_over_time() {
    let clip = voiced_clip(120.0, 240.0);
    let track = PitchTracker::default().track(&clip).expect("track pitch");
    let voiced: Vec<_> = track.frames.iter().filter(|frame| frame.voiced).collect();
    let head = voiced.first().expect("voiced head").frequency;
    let tail = voiced.last().expect("voiced tail").frequency;
    assert!(tail > head * 1.6, "head={head} tail={tail}");
}

#[test]
fn octave_up_doubles_fundamental() {
    let extractor = FeatureExtractor::default();
    let low = extractor.extract(&voiced_clip(110.0, 110.0)).expect("low");
    let high = extractor.extract(&voiced_clip(220.0, 220.0)).expect("high");
    assert_abs_diff_eq!(high.meanfun / low.meanfun, 2.0, epsilon = 0.05);
}

#[test]
fn noise_is_mostly_unvoiced() {
    let clip = Waveform::new(white_noise(SAMPLE_RATE as usize, 0x2545_f491), SAMPLE_RATE);
    let track = PitchTracker::default().track(&clip).expect("track noise");
    let voiced = track.frames.iter().filter(|frame| frame.voiced).count();
    assert!(
        voiced * 10 < track.frames.len(),
        "noise voiced in {voiced}/{} frames",
        track.frames.len()
    );
    assert_eq!(track.argmins().len(), track.frames.len());
}

#[test]
fn silence_reports_undefined_fundamental_without_failing() {
    let clip = Waveform::new(vec![0.0; SAMPLE_RATE as usize], SAMPLE_RATE);
    let record = FeatureExtractor::default().extract(&clip).expect("extract");
    assert!(record.meanfun.is_nan());
    assert!(record.minfun.is_nan());
    assert!(record.maxfun.is_nan());
}

#[test]
fn stricter_threshold_rejects_weak_periodicity() {
    let mut samples = tone(200.0, 0.3, SAMPLE_RATE as usize);
    for (sample, noise) in samples.iter_mut().zip(white_noise(SAMPLE_RATE as usize, 7)) {
        *sample += 0.2 * noise;
    }
    let clip = Waveform::new(samples, SAMPLE_RATE);

    let lenient = PitchTracker::default().track(&clip).expect("lenient");
    let strict = PitchTracker::new(PitchConfig {
        harmonic_threshold: 0.95,
        ..PitchConfig::default()
    })
    .expect("valid config")
    .track(&clip)
    .expect("strict");
    assert!(strict.voiced_frequencies().len() < lenient.voiced_frequencies().len());
}

fn voiced_clip(f_start: f64, f_end: f64) -> Waveform {
    let total_samples = (SAMPLE_RATE as f64 * DURATION_SECONDS) as usize;
    let dt = 1.0 / SAMPLE_RATE as f64;
    let mut phase: f64 = 0.0;
    let mut samples = Vec::with_capacity(total_samples);

    for index in 0..total_samples {
        let progress = index as f64 / (total_samples - 1).max(1) as f64;
        let freq = f_start + (f_end - f_start) * progress;
        phase += 2.0 * std::f64::consts::PI * freq * dt;
        // fundamental plus two weaker harmonics, roughly voice-like
        samples.push(0.4 * phase.sin() + 0.2 * (2.0 * phase).sin() + 0.1 * (3.0 * phase).sin());
    }
    Waveform::new(samples, SAMPLE_RATE)
}

fn tone(frequency: f64, amplitude: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|n| {
            amplitude
                * (2.0 * std::f64::consts::PI * frequency * n as f64 / SAMPLE_RATE as f64).sin()
        })
        .collect()
}

/// Deterministic uniform noise in [-0.5, 0.5) from a xorshift generator.
fn white_noise(len: usize, seed: u64) -> Vec<f64> {
    let mut state = seed.max(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 11) as f64 / (1u64 << 53) as f64 - 0.5
        })
        .collect()
}
