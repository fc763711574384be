//! fx-offline: render WAV files through the effects engine
//!
//! Streams a 16-bit stereo WAV through an [`EffectsEngine`] in fixed-size
//! blocks, the same way a playback host would feed it, and writes the
//! result as 16-bit WAV.

use std::path::Path;

use fx_core::{BAND_COUNT, CHANNELS, EffectsConfig, FxError, FxResult};
use fx_dsp::EffectsEngine;
use serde::{Deserialize, Serialize};

/// Default block size in frames
pub const DEFAULT_BLOCK_FRAMES: usize = 1024;

/// Effect settings applied before rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Engine configuration; the sample rate is taken from the input file
    pub config: EffectsConfig,
    pub equalizer: bool,
    /// Band levels in millibels
    pub band_levels: [i32; BAND_COUNT],
    pub bass_boost: bool,
    pub bass_boost_strength: i32,
    pub virtualizer: bool,
    pub virtualizer_strength: i32,
    /// Override the configured limiter state
    pub automatic_gain: Option<bool>,
    pub block_frames: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            config: EffectsConfig::default(),
            equalizer: false,
            band_levels: [0; BAND_COUNT],
            bass_boost: false,
            bass_boost_strength: 0,
            virtualizer: false,
            virtualizer_strength: 0,
            automatic_gain: None,
            block_frames: DEFAULT_BLOCK_FRAMES,
        }
    }
}

impl RenderOptions {
    /// Enable the equalizer with the given band levels (millibels)
    pub fn with_equalizer(mut self, band_levels: [i32; BAND_COUNT]) -> Self {
        self.equalizer = true;
        self.band_levels = band_levels;
        self
    }

    /// Enable bass boost at `strength` (0..=1000)
    pub fn with_bass_boost(mut self, strength: i32) -> Self {
        self.bass_boost = true;
        self.bass_boost_strength = strength;
        self
    }

    /// Enable the virtualizer at `strength` (0..=1000)
    pub fn with_virtualizer(mut self, strength: i32) -> Self {
        self.virtualizer = true;
        self.virtualizer_strength = strength;
        self
    }

    pub fn with_automatic_gain(mut self, enabled: bool) -> Self {
        self.automatic_gain = Some(enabled);
        self
    }

    pub fn with_block_frames(mut self, block_frames: usize) -> Self {
        self.block_frames = block_frames;
        self
    }

    /// Build an engine at `sample_rate` with these settings applied
    pub fn build_engine(&self, sample_rate: u32) -> FxResult<EffectsEngine> {
        let config = self.config.clone().with_sample_rate(sample_rate);
        let mut engine = EffectsEngine::new(config)?;
        let controller = &mut engine.controller;

        controller.set_equalizer_band_levels(&self.band_levels);
        controller.set_bass_boost_strength(self.bass_boost_strength);
        controller.set_virtualizer_strength(self.virtualizer_strength);
        controller.enable_equalizer(self.equalizer);
        controller.enable_bass_boost(self.bass_boost);
        controller.enable_virtualizer(self.virtualizer);
        if let Some(enabled) = self.automatic_gain {
            controller.enable_automatic_gain(enabled);
        }
        Ok(engine)
    }
}

/// Summary of a finished render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderReport {
    pub frames: u64,
    pub sample_rate: u32,
    /// Routine the engine ran, e.g. `equalizer (vectorized)`
    pub routine: String,
    /// Limiter gain at the end of the file in millibels
    pub final_agc_millibels: i32,
}

/// Render `input` into `output`
pub fn render_wav(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &RenderOptions,
) -> FxResult<RenderReport> {
    let input = input.as_ref();
    let output = output.as_ref();
    if options.block_frames == 0 {
        return Err(FxError::InvalidConfig("block_frames must be positive".into()));
    }

    let mut reader = hound::WavReader::open(input).map_err(audio_error)?;
    let spec = reader.spec();
    if spec.channels as usize != CHANNELS
        || spec.bits_per_sample != 16
        || spec.sample_format != hound::SampleFormat::Int
    {
        return Err(FxError::UnsupportedFormat(format!(
            "{}: {} channel(s), {}-bit {:?} (need 16-bit integer stereo)",
            input.display(),
            spec.channels,
            spec.bits_per_sample,
            spec.sample_format
        )));
    }

    let mut engine = options.build_engine(spec.sample_rate)?;
    log::info!(
        "Rendering {} -> {} at {} Hz with {}",
        input.display(),
        output.display(),
        spec.sample_rate,
        engine.controller.routine()
    );

    let out_spec = hound::WavSpec {
        channels: CHANNELS as u16,
        sample_rate: spec.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(output, out_spec).map_err(audio_error)?;

    let block_samples = options.block_frames * CHANNELS;
    let mut block = Vec::with_capacity(block_samples);
    let mut samples = reader.samples::<i16>();
    let mut frames = 0u64;

    loop {
        block.clear();
        for sample in samples.by_ref().take(block_samples) {
            block.push(sample.map_err(audio_error)?);
        }
        if block.is_empty() {
            break;
        }

        let block_frames = block.len() / CHANNELS;
        engine.process(&mut block, block_frames);
        for &sample in &block[..block_frames * CHANNELS] {
            writer.write_sample(sample).map_err(audio_error)?;
        }
        frames += block_frames as u64;

        if block.len() < block_samples {
            break;
        }
    }
    writer.finalize().map_err(audio_error)?;

    let report = RenderReport {
        frames,
        sample_rate: spec.sample_rate,
        routine: engine.controller.routine().to_string(),
        final_agc_millibels: engine.controller.current_automatic_gain_millibels(),
    };
    log::info!(
        "Rendered {} frames, final limiter gain {} mB",
        report.frames,
        report.final_agc_millibels
    );
    Ok(report)
}

fn audio_error(err: hound::Error) -> FxError {
    match err {
        hound::Error::IoError(err) => FxError::Io(err),
        other => FxError::AudioFile(other.to_string()),
    }
}
