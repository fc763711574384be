//! Control path
//!
//! `EffectsController` receives parameter changes from the host, keeps the
//! authoritative copy of every control-side entity (flags, band levels,
//! strengths, coefficients, selected routine) and publishes a complete
//! [`RenderSnapshot`] after each change.

use std::sync::Arc;

use fx_core::{
    BAND_COUNT, BackendPreference, EffectsConfig, FxResult, gain_to_millibels,
    validate_sample_rate,
};

use crate::agc::{AgcParams, GainMeter};
use crate::coefficients::BandCoefficients;
use crate::dispatch::{Routine, vectorized_allowed};
use crate::equalizer::Equalizer;
use crate::flags::EffectFlags;
use crate::snapshot::{RenderSnapshot, SnapshotWriter};
use crate::virtualizer::Virtualizer;

pub struct EffectsController {
    config: EffectsConfig,
    flags: EffectFlags,
    agc_enabled: bool,
    equalizer: Equalizer,
    virtualizer: Virtualizer,
    vectorized_available: bool,
    routine: Routine,
    pipeline_epoch: u64,
    agc_epoch: u64,
    writer: SnapshotWriter<RenderSnapshot>,
    meter: Arc<GainMeter>,
}

impl EffectsController {
    pub(crate) fn new(
        config: EffectsConfig,
        vectorized_supported: bool,
        writer: SnapshotWriter<RenderSnapshot>,
        meter: Arc<GainMeter>,
    ) -> Self {
        let sample_rate = config.sample_rate;
        let mut controller = Self {
            flags: EffectFlags::NONE,
            agc_enabled: config.agc.enabled,
            equalizer: Equalizer::new(sample_rate, config.bass_boost_max_db),
            virtualizer: Virtualizer::new(sample_rate),
            vectorized_available: vectorized_allowed(config.backend, vectorized_supported),
            routine: Routine::NOOP,
            pipeline_epoch: 0,
            agc_epoch: 0,
            writer,
            meter,
            config,
        };
        controller.initialize();
        controller
    }

    /// One-time setup: every effect disabled, flat levels, zero strengths,
    /// limiter back to its configured default.
    pub fn initialize(&mut self) {
        self.flags = EffectFlags::NONE;
        self.agc_enabled = self.config.agc.enabled;
        self.equalizer.reset_levels();
        self.virtualizer.reset_strength();
        self.equalizer.config_changed(self.config.sample_rate, self.flags);
        self.virtualizer.destroy();
        self.pipeline_epoch += 1;
        self.update_routine();
        self.publish();
        log::info!(
            "Effects initialized at {} Hz ({} bands, {})",
            self.config.sample_rate,
            self.equalizer.active_bands(),
            self.routine
        );
    }

    // ─── Equalizer ───────────────────────────────────────────────────────

    pub fn enable_equalizer(&mut self, enabled: bool) {
        let flags = self.flags.with(EffectFlags::EQUALIZER, enabled);
        // Band levels only count while the equalizer is on
        self.equalizer.compute_all(flags);
        self.set_flags(flags);
        self.publish();
    }

    pub fn is_equalizer_enabled(&self) -> bool {
        self.flags.contains(EffectFlags::EQUALIZER)
    }

    /// Set one band level in millibels (clamped to ±1500). Out-of-range
    /// bands are ignored.
    pub fn set_equalizer_band_level(&mut self, band: usize, level_mb: i32) {
        if self.equalizer.set_band_level(band, level_mb, self.flags) {
            self.publish();
        }
    }

    /// Set every band level in millibels (clamped to ±1500)
    pub fn set_equalizer_band_levels(&mut self, levels_mb: &[i32; BAND_COUNT]) {
        self.equalizer.set_band_levels(levels_mb, self.flags);
        self.publish();
    }

    pub fn equalizer_band_level(&self, band: usize) -> Option<i32> {
        self.equalizer.band_level(band)
    }

    pub fn equalizer_band_levels(&self) -> [i32; BAND_COUNT] {
        self.equalizer.band_levels()
    }

    /// Recompute one band from the current state.
    ///
    /// Idempotent; out-of-range bands are ignored.
    pub fn compute_filter(&mut self, band: usize) {
        if band < BAND_COUNT {
            self.equalizer.compute_filter(band, self.flags);
            self.publish();
        }
    }

    // ─── Bass boost ──────────────────────────────────────────────────────

    pub fn enable_bass_boost(&mut self, enabled: bool) {
        let flags = self.flags.with(EffectFlags::BASS_BOOST, enabled);
        self.equalizer.compute_all(flags);
        self.set_flags(flags);
        self.publish();
    }

    pub fn is_bass_boost_enabled(&self) -> bool {
        self.flags.contains(EffectFlags::BASS_BOOST)
    }

    /// Set bass boost strength (clamped to `0..=1000`)
    pub fn set_bass_boost_strength(&mut self, strength: i32) {
        self.equalizer.set_bass_boost_strength(strength, self.flags);
        self.publish();
    }

    pub fn bass_boost_strength(&self) -> u32 {
        self.equalizer.bass_boost_strength()
    }

    // ─── Virtualizer ─────────────────────────────────────────────────────

    pub fn enable_virtualizer(&mut self, enabled: bool) {
        let flags = self.flags.with(EffectFlags::VIRTUALIZER, enabled);
        if enabled {
            self.virtualizer.config_changed(self.equalizer.sample_rate(), true);
        } else {
            self.virtualizer.destroy();
        }
        self.set_flags(flags);
        self.publish();
    }

    pub fn is_virtualizer_enabled(&self) -> bool {
        self.flags.contains(EffectFlags::VIRTUALIZER)
    }

    /// Set virtualizer strength (clamped to `0..=1000`)
    pub fn set_virtualizer_strength(&mut self, strength: i32) {
        self.virtualizer
            .set_strength(strength, self.is_virtualizer_enabled());
        self.publish();
    }

    pub fn virtualizer_strength(&self) -> u32 {
        self.virtualizer.strength()
    }

    // ─── Automatic gain ──────────────────────────────────────────────────

    /// Enable or disable the limiter. Disabling snaps the gain back to unity.
    pub fn enable_automatic_gain(&mut self, enabled: bool) {
        if self.agc_enabled == enabled {
            return;
        }
        self.agc_enabled = enabled;
        if !enabled {
            self.agc_epoch += 1;
        }
        self.publish();
    }

    pub fn is_automatic_gain_enabled(&self) -> bool {
        self.agc_enabled
    }

    /// Limiter gain in millibels as last reported by the render path.
    ///
    /// 0 while the limiter or every effect is disabled.
    pub fn current_automatic_gain_millibels(&self) -> i32 {
        if self.agc_enabled && !self.flags.is_empty() {
            gain_to_millibels(self.meter.load())
        } else {
            0
        }
    }

    // ─── Configuration ───────────────────────────────────────────────────

    /// Sample rate change: active band count, limiter factors and every
    /// coefficient are recomputed and the render state is cleared.
    pub fn set_sample_rate(&mut self, sample_rate: u32) -> FxResult<()> {
        if let Err(err) = validate_sample_rate(sample_rate) {
            log::warn!("Rejected sample rate {sample_rate} Hz");
            return Err(err);
        }
        self.config.sample_rate = sample_rate;
        self.equalizer.config_changed(sample_rate, self.flags);
        self.virtualizer
            .config_changed(sample_rate, self.is_virtualizer_enabled());
        self.pipeline_epoch += 1;
        self.publish();
        log::info!(
            "Sample rate {} Hz: {} active bands",
            sample_rate,
            self.equalizer.active_bands()
        );
        Ok(())
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    pub fn active_band_count(&self) -> usize {
        self.equalizer.active_bands()
    }

    /// Host-side backend capability change (e.g. a vector unit turned off)
    pub fn set_vectorized_available(&mut self, available: bool) {
        let available = available && self.config.backend != BackendPreference::Scalar;
        if self.vectorized_available != available {
            self.vectorized_available = available;
            self.update_routine();
            self.publish();
        }
    }

    pub fn config(&self) -> &EffectsConfig {
        &self.config
    }

    pub fn flags(&self) -> EffectFlags {
        self.flags
    }

    /// Routine the render path will run for the next buffer
    pub fn routine(&self) -> Routine {
        self.routine
    }

    pub fn coefficients(&self) -> &[BandCoefficients; BAND_COUNT] {
        self.equalizer.coefficients()
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn set_flags(&mut self, flags: EffectFlags) {
        if flags == self.flags {
            return;
        }
        self.flags = flags;
        // Stale history from another topology would pop
        self.pipeline_epoch += 1;
        self.update_routine();
    }

    fn update_routine(&mut self) {
        let routine = Routine::select(self.flags, self.vectorized_available);
        if routine != self.routine {
            log::debug!("Routine {} -> {}", self.routine, routine);
            self.routine = routine;
        }
    }

    fn publish(&mut self) {
        let snapshot = RenderSnapshot {
            flags: self.flags,
            routine: self.routine,
            coefficients: *self.equalizer.coefficients(),
            active_bands: self.equalizer.active_bands(),
            agc: AgcParams::new(&self.config.agc, self.agc_enabled, self.config.sample_rate),
            virtualizer_strength: self.virtualizer.strength(),
            pipeline_epoch: self.pipeline_epoch,
            agc_epoch: self.agc_epoch,
        };
        self.writer.publish(&snapshot);
    }
}
