//! Filter bank (render path)
//!
//! Cascaded Direct Form II biquads, one per band and channel. Because
//! `b1 == a1` for every band, a stage is
//!
//! ```text
//! w[n] = x[n] - a1*w[n-1] + (-a2)*w[n-2]
//! y[n] = b0*w[n] + a1*w[n-1] + b2*w[n-2]
//! ```
//!
//! The scalar kernel here is the reference; `simd` must perform the same
//! operations in the same order.
//!
//! History values below `DENORMAL_FLOOR` are flushed to zero so a decaying
//! tail never reaches subnormal range during silence.

use fx_core::BAND_COUNT;

use crate::coefficients::BandCoefficients;

/// History magnitude below which a value is stored as zero
pub const DENORMAL_FLOOR: f32 = 1e-25;

/// Zero `value` if it lies below `DENORMAL_FLOOR`
#[inline(always)]
pub fn flush_denormal(value: f32) -> f32 {
    if value.abs() < DENORMAL_FLOOR { 0.0 } else { value }
}

/// Recursive history of one band.
///
/// Lanes are `[left, right, -, -]`; the last two lanes are padding that lets
/// the vector kernel load and store the state directly.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[repr(C, align(16))]
pub struct BandState {
    pub w1: [f32; 4],
    pub w2: [f32; 4],
}

/// History of every band
#[derive(Debug, Clone)]
pub struct FilterBank {
    states: [BandState; BAND_COUNT],
}

impl FilterBank {
    pub fn new() -> Self {
        Self {
            states: [BandState::default(); BAND_COUNT],
        }
    }

    pub fn reset(&mut self) {
        self.states = [BandState::default(); BAND_COUNT];
    }

    #[inline]
    pub fn states(&self) -> &[BandState; BAND_COUNT] {
        &self.states
    }

    #[inline]
    pub fn states_mut(&mut self) -> &mut [BandState; BAND_COUNT] {
        &mut self.states
    }

    /// Run one frame through the first `bands` bands
    #[inline(always)]
    pub fn process_frame(
        &mut self,
        coefficients: &[BandCoefficients; BAND_COUNT],
        bands: usize,
        left: f32,
        right: f32,
    ) -> (f32, f32) {
        let bands = bands.min(BAND_COUNT);
        let mut left = left;
        let mut right = right;
        for (c, state) in coefficients[..bands].iter().zip(self.states[..bands].iter_mut()) {
            left = stage(c, state, 0, left);
            right = stage(c, state, 1, right);
        }
        (left, right)
    }
}

impl Default for FilterBank {
    fn default() -> Self {
        Self::new()
    }
}

#[inline(always)]
fn stage(c: &BandCoefficients, state: &mut BandState, ch: usize, x: f32) -> f32 {
    let w1 = state.w1[ch];
    let w2 = state.w2[ch];
    let w = flush_denormal(x - c.a1[ch] * w1 + c.neg_a2[ch] * w2);
    let y = c.b0[ch] * w + c.a1[ch] * w1 + c.b2[ch] * w2;
    state.w2[ch] = w1;
    state.w1[ch] = w;
    y
}
