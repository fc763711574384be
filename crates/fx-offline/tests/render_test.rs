//! Offline rendering tests

use std::path::Path;

use fx_core::{BAND_COUNT, FxError};
use fx_offline::{RenderOptions, render_wav};
use tempfile::TempDir;

const SAMPLE_RATE: u32 = 44100;

fn write_wav(path: &Path, channels: u16, bits: u16, samples: &[i16]) {
    let spec = hound::WavSpec {
        channels,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: bits,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &s in samples {
        if bits == 16 {
            writer.write_sample(s).unwrap();
        } else {
            writer.write_sample(s as i32 * 256).unwrap();
        }
    }
    writer.finalize().unwrap();
}

fn read_wav(path: &Path) -> (hound::WavSpec, Vec<i16>) {
    let mut reader = hound::WavReader::open(path).unwrap();
    let spec = reader.spec();
    let samples = reader.samples::<i16>().map(Result::unwrap).collect();
    (spec, samples)
}

fn sine(frames: usize, freq: f64, amplitude: f64) -> Vec<i16> {
    (0..frames)
        .flat_map(|n| {
            let s = amplitude * (2.0 * std::f64::consts::PI * freq * n as f64 / SAMPLE_RATE as f64).sin();
            [s as i16, (s * 0.5) as i16]
        })
        .collect()
}

#[test]
fn test_disabled_render_is_identity() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");
    let samples = sine(5000, 440.0, 16000.0);
    write_wav(&input, 2, 16, &samples);

    let report = render_wav(&input, &output, &RenderOptions::default()).unwrap();
    assert_eq!(report.frames, 5000);
    assert_eq!(report.sample_rate, SAMPLE_RATE);
    assert_eq!(report.routine, "no-op (scalar)");
    assert_eq!(report.final_agc_millibels, 0);

    let (spec, rendered) = read_wav(&output);
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(rendered, samples);
}

#[test]
fn test_equalizer_render_changes_audio() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");
    let samples = sine(3000, 1000.0, 8000.0);
    write_wav(&input, 2, 16, &samples);

    let mut levels = [0; BAND_COUNT];
    levels[5] = -1500;
    let options = RenderOptions::default()
        .with_equalizer(levels)
        .with_block_frames(100);
    let report = render_wav(&input, &output, &options).unwrap();
    assert_eq!(report.frames, 3000);
    assert!(report.routine.starts_with("equalizer"));

    let (_, rendered) = read_wav(&output);
    assert_eq!(rendered.len(), samples.len());
    let peak_in = samples[4000..].iter().map(|s| s.unsigned_abs()).max().unwrap();
    let peak_out = rendered[4000..].iter().map(|s| s.unsigned_abs()).max().unwrap();
    assert!(peak_out < peak_in / 2, "cut not applied: {peak_out} vs {peak_in}");
}

#[test]
fn test_loud_render_reports_suppression() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");
    write_wav(&input, 2, 16, &sine(20000, 62.5, 30000.0));

    let options = RenderOptions::default().with_bass_boost(1000);
    let report = render_wav(&input, &output, &options).unwrap();
    assert!(report.final_agc_millibels < 0);
}

#[test]
fn test_rejects_mono() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("mono.wav");
    write_wav(&input, 1, 16, &[0; 100]);

    let result = render_wav(&input, dir.path().join("out.wav"), &RenderOptions::default());
    assert!(matches!(result, Err(FxError::UnsupportedFormat(_))));
}

#[test]
fn test_rejects_24_bit() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("hi.wav");
    write_wav(&input, 2, 24, &[0; 100]);

    let result = render_wav(&input, dir.path().join("out.wav"), &RenderOptions::default());
    assert!(matches!(result, Err(FxError::UnsupportedFormat(_))));
}

#[test]
fn test_missing_input() {
    let dir = TempDir::new().unwrap();
    let result = render_wav(
        dir.path().join("absent.wav"),
        dir.path().join("out.wav"),
        &RenderOptions::default(),
    );
    assert!(matches!(result, Err(FxError::Io(_))));
}

#[test]
fn test_zero_block_rejected() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    write_wav(&input, 2, 16, &sine(10, 440.0, 1000.0));

    let options = RenderOptions::default().with_block_frames(0);
    let result = render_wav(&input, dir.path().join("out.wav"), &options);
    assert!(matches!(result, Err(FxError::InvalidConfig(_))));
}
