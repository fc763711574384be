//! Equalizer and bass boost parameters (control path)
//!
//! Owns the band levels, the bass boost strength and the coefficient table
//! derived from them. Every setter recomputes exactly the bands whose
//! response it can change:
//! - a band level: the band and its two neighbors
//! - bass boost, equalizer enable, sample rate: all bands

use fx_core::{
    BAND_COUNT, MAX_STRENGTH, clamp_band_level, clamp_strength, millibels_to_db,
};

use crate::coefficients::{BandCoefficients, FilterInputs, active_band_count, compute_band};
use crate::flags::EffectFlags;

#[derive(Debug, Clone)]
pub struct Equalizer {
    levels_mb: [i32; BAND_COUNT],
    gains_db: [f64; BAND_COUNT],
    bass_boost_strength: u32,
    bass_boost_max_db: f64,
    sample_rate: u32,
    active_bands: usize,
    coefficients: [BandCoefficients; BAND_COUNT],
}

impl Equalizer {
    pub fn new(sample_rate: u32, bass_boost_max_db: f64) -> Self {
        Self {
            levels_mb: [0; BAND_COUNT],
            gains_db: [0.0; BAND_COUNT],
            bass_boost_strength: 0,
            bass_boost_max_db,
            sample_rate,
            active_bands: active_band_count(sample_rate),
            coefficients: [BandCoefficients::BYPASS; BAND_COUNT],
        }
    }

    /// Flat levels, zero bass boost, bypass coefficients
    pub fn reset_levels(&mut self) {
        self.levels_mb = [0; BAND_COUNT];
        self.gains_db = [0.0; BAND_COUNT];
        self.bass_boost_strength = 0;
        self.coefficients = [BandCoefficients::BYPASS; BAND_COUNT];
    }

    #[inline]
    pub fn coefficients(&self) -> &[BandCoefficients; BAND_COUNT] {
        &self.coefficients
    }

    #[inline]
    pub fn active_bands(&self) -> usize {
        self.active_bands
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Stored (clamped) level of a band in millibels
    pub fn band_level(&self, band: usize) -> Option<i32> {
        self.levels_mb.get(band).copied()
    }

    pub fn band_levels(&self) -> [i32; BAND_COUNT] {
        self.levels_mb
    }

    pub fn bass_boost_strength(&self) -> u32 {
        self.bass_boost_strength
    }

    /// Bass boost gain currently applied to the bass bands
    pub fn bass_boost_db(&self, flags: EffectFlags) -> f64 {
        if flags.contains(EffectFlags::BASS_BOOST) {
            self.bass_boost_strength as f64 * self.bass_boost_max_db / MAX_STRENGTH as f64
        } else {
            0.0
        }
    }

    /// Recompute one band's coefficients from the current inputs.
    ///
    /// Out-of-range bands are ignored.
    pub fn compute_filter(&mut self, band: usize, flags: EffectFlags) {
        let inputs = FilterInputs {
            gains_db: &self.gains_db,
            equalizer_enabled: flags.contains(EffectFlags::EQUALIZER),
            bass_boost_db: self.bass_boost_db(flags),
            sample_rate: self.sample_rate,
        };
        if let Some(coefficients) = compute_band(band, &inputs) {
            self.coefficients[band] = coefficients;
        }
    }

    pub fn compute_all(&mut self, flags: EffectFlags) {
        for band in 0..BAND_COUNT {
            self.compute_filter(band, flags);
        }
    }

    /// Set one band level (millibels, clamped to ±15 dB).
    ///
    /// Returns `false` without touching anything when the band is out of range.
    pub fn set_band_level(&mut self, band: usize, level_mb: i32, flags: EffectFlags) -> bool {
        if band >= BAND_COUNT {
            return false;
        }
        let level_mb = clamp_band_level(level_mb);
        self.levels_mb[band] = level_mb;
        self.gains_db[band] = millibels_to_db(level_mb);

        // Both neighbors depend on this band
        if band > 0 {
            self.compute_filter(band - 1, flags);
        }
        self.compute_filter(band, flags);
        if band + 1 < BAND_COUNT {
            self.compute_filter(band + 1, flags);
        }
        log::debug!("Band {band} level {level_mb} mB");
        true
    }

    /// Set all band levels at once (millibels, clamped)
    pub fn set_band_levels(&mut self, levels_mb: &[i32; BAND_COUNT], flags: EffectFlags) {
        for (band, &level_mb) in levels_mb.iter().enumerate() {
            let level_mb = clamp_band_level(level_mb);
            self.levels_mb[band] = level_mb;
            self.gains_db[band] = millibels_to_db(level_mb);
        }
        self.compute_all(flags);
    }

    /// Set bass boost strength (clamped to `0..=1000`).
    ///
    /// Coefficients only change when the bass boost is enabled.
    pub fn set_bass_boost_strength(&mut self, strength: i32, flags: EffectFlags) {
        self.bass_boost_strength = clamp_strength(strength);
        if flags.contains(EffectFlags::BASS_BOOST) {
            self.compute_all(flags);
        }
    }

    /// Sample rate change: new active band count and a full recompute
    pub fn config_changed(&mut self, sample_rate: u32, flags: EffectFlags) {
        self.sample_rate = sample_rate;
        self.active_bands = active_band_count(sample_rate);
        self.compute_all(flags);
    }
}
