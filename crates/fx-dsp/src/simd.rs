//! Vectorized filter bank kernel
//!
//! Both channels ride in one 128-bit vector (`[left, right, 0, 0]`). The
//! arithmetic is lane-wise IEEE single precision in exactly the order the
//! scalar kernel uses, with no fused multiply-add, so both backends agree
//! bit-for-bit.

use fx_core::BAND_COUNT;
use wide::f32x4;

use crate::bank::{BandState, flush_denormal};
use crate::coefficients::BandCoefficients;

/// Band coefficients loaded into vector registers
#[derive(Debug, Clone, Copy)]
pub struct PackedCoefficients {
    b0: f32x4,
    a1: f32x4,
    b2: f32x4,
    neg_a2: f32x4,
}

impl PackedCoefficients {
    #[inline]
    fn lanes(pair: [f32; 2]) -> f32x4 {
        f32x4::from([pair[0], pair[1], 0.0, 0.0])
    }

    pub fn pack(c: &BandCoefficients) -> Self {
        Self {
            b0: Self::lanes(c.b0),
            a1: Self::lanes(c.a1),
            b2: Self::lanes(c.b2),
            neg_a2: Self::lanes(c.neg_a2),
        }
    }

    pub fn pack_all(coefficients: &[BandCoefficients; BAND_COUNT]) -> [Self; BAND_COUNT] {
        std::array::from_fn(|band| Self::pack(&coefficients[band]))
    }
}

impl Default for PackedCoefficients {
    fn default() -> Self {
        Self::pack(&BandCoefficients::BYPASS)
    }
}

/// Run one frame through the first `bands` bands
#[inline(always)]
pub fn process_frame(
    coefficients: &[PackedCoefficients; BAND_COUNT],
    states: &mut [BandState; BAND_COUNT],
    bands: usize,
    left: f32,
    right: f32,
) -> (f32, f32) {
    let bands = bands.min(BAND_COUNT);
    let mut x = f32x4::from([left, right, 0.0, 0.0]);
    for (c, state) in coefficients[..bands].iter().zip(states[..bands].iter_mut()) {
        let w1 = f32x4::from(state.w1);
        let w2 = f32x4::from(state.w2);
        let w = (x - c.a1 * w1 + c.neg_a2 * w2).to_array().map(flush_denormal);
        x = c.b0 * f32x4::from(w) + c.a1 * w1 + c.b2 * w2;
        state.w2 = state.w1;
        state.w1 = w;
    }
    let out = x.to_array();
    (out[0], out[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::FilterBank;
    use crate::coefficients::{BAND_FREQUENCIES, BAND_Q};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_matches_scalar_bit_for_bit() {
        let gains = [6.0, -3.0, 9.5, 0.0, -12.0, 4.0, 15.0, -15.0, 2.5, 7.0];
        let coefficients: [BandCoefficients; BAND_COUNT] = std::array::from_fn(|band| {
            BandCoefficients::peaking(BAND_FREQUENCIES[band], BAND_Q, gains[band], 48000.0)
        });
        let packed = PackedCoefficients::pack_all(&coefficients);

        let mut scalar = FilterBank::new();
        let mut vector = FilterBank::new();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..10_000 {
            let l = rng.random_range(-32768i32..=32767) as f32;
            let r = rng.random_range(-32768i32..=32767) as f32;
            let expected = scalar.process_frame(&coefficients, BAND_COUNT, l, r);
            let actual = process_frame(&packed, vector.states_mut(), BAND_COUNT, l, r);
            assert_eq!(expected.0.to_bits(), actual.0.to_bits());
            assert_eq!(expected.1.to_bits(), actual.1.to_bits());
        }
        assert_eq!(scalar.states(), vector.states());
    }

    #[test]
    fn test_padding_lanes_stay_zero() {
        let coefficients = [BandCoefficients::peaking(1000.0, BAND_Q, 6.0, 44100.0); BAND_COUNT];
        let packed = PackedCoefficients::pack_all(&coefficients);
        let mut bank = FilterBank::new();
        for n in 0..100 {
            process_frame(&packed, bank.states_mut(), BAND_COUNT, n as f32, -(n as f32));
        }
        for state in bank.states() {
            assert_eq!(state.w1[2..], [0.0, 0.0]);
            assert_eq!(state.w2[3], 0.0);
        }
    }
}
