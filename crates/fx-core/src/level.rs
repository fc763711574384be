//! Level units used at the control boundary
//!
//! Band levels travel as millibels (1/100 dB), strengths as integers in
//! `0..=MAX_STRENGTH`, gains inside the engine as linear amplitude.

use crate::{DB_RANGE, MAX_STRENGTH};

/// Clamp a band level to ±`DB_RANGE` millibels
#[inline]
pub fn clamp_band_level(millibels: i32) -> i32 {
    millibels.clamp(-DB_RANGE, DB_RANGE)
}

/// Clamp a bass boost / virtualizer strength to `0..=MAX_STRENGTH`
#[inline]
pub fn clamp_strength(strength: i32) -> u32 {
    strength.clamp(0, MAX_STRENGTH as i32) as u32
}

#[inline]
pub fn millibels_to_db(millibels: i32) -> f64 {
    millibels as f64 / 100.0
}

/// Linear amplitude to millibels, rounded to the nearest integer.
///
/// Non-positive gains map to `i32::MIN`.
#[inline]
pub fn gain_to_millibels(gain: f32) -> i32 {
    if gain <= 0.0 {
        i32::MIN
    } else {
        (2000.0 * (gain as f64).log10()).round() as i32
    }
}

/// Convert a gain slope in dB per second to a per-frame linear multiplier.
///
/// `10^(db_per_second / (sample_rate * 20))`
#[inline]
pub fn db_per_second_to_frame_factor(db_per_second: f64, sample_rate: u32) -> f32 {
    10.0_f64.powf(db_per_second / (sample_rate as f64 * 20.0)) as f32
}
