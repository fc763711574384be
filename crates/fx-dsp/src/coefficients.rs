//! Coefficient engine
//!
//! Every band is an RBJ peaking biquad centered one octave above its lower
//! neighbor. After normalization by `a0` a peaking filter has `b1 == a1`,
//! so a band stores only four coefficients per channel: `b0`, `a1` (which
//! doubles as `b1`), `b2` and the negated `a2`.

use std::f64::consts::{PI, SQRT_2};

use fx_core::{BAND_COUNT, BASS_BOOST_BAND_COUNT};

/// Center frequency of each band in Hz
pub const BAND_FREQUENCIES: [f64; BAND_COUNT] = [
    31.25, 62.5, 125.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0, 16000.0,
];

/// One-octave bandwidth
pub const BAND_Q: f64 = SQRT_2;

/// Fraction of a neighbor's gain that leaks into a band's center.
///
/// Subtracted from the band's own gain so that the cascade lands close to
/// the requested level at every center frequency.
pub const NEIGHBOR_COUPLING: f64 = 0.2;

/// Coefficients of one band for both channels (`[left, right]`)
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C, align(16))]
pub struct BandCoefficients {
    pub b0: [f32; 2],
    /// `a1`, also used as `b1`
    pub a1: [f32; 2],
    pub b2: [f32; 2],
    /// `-a2`
    pub neg_a2: [f32; 2],
}

impl BandCoefficients {
    /// Unity gain, no filtering
    pub const BYPASS: Self = Self {
        b0: [1.0; 2],
        a1: [0.0; 2],
        b2: [0.0; 2],
        neg_a2: [0.0; 2],
    };

    /// Peaking EQ coefficients, identical for both channels.
    ///
    /// Frequencies at or above Nyquist produce the bypass filter.
    pub fn peaking(freq: f64, q: f64, gain_db: f64, sample_rate: f64) -> Self {
        if sample_rate <= 0.0 || freq >= sample_rate * 0.5 {
            return Self::BYPASS;
        }

        let a = 10.0_f64.powf(gain_db / 40.0);
        let omega = 2.0 * PI * freq / sample_rate;
        let alpha = omega.sin() / (2.0 * q);
        let cos_omega = omega.cos();

        let b0 = 1.0 + alpha * a;
        let b2 = 1.0 - alpha * a;
        let a0 = 1.0 + alpha / a;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha / a;

        Self::stereo(
            (b0 / a0) as f32,
            (a1 / a0) as f32,
            (b2 / a0) as f32,
            (-a2 / a0) as f32,
        )
    }

    #[inline]
    fn stereo(b0: f32, a1: f32, b2: f32, neg_a2: f32) -> Self {
        Self {
            b0: [b0; 2],
            a1: [a1; 2],
            b2: [b2; 2],
            neg_a2: [neg_a2; 2],
        }
    }

    /// Whether this band leaves the signal untouched
    pub fn is_bypass(&self) -> bool {
        *self == Self::BYPASS
    }

    /// Magnitude response in dB at `freq` (left channel)
    pub fn magnitude_db(&self, freq: f64, sample_rate: f64) -> f64 {
        let omega = 2.0 * PI * freq / sample_rate;
        let (b0, b1, b2) = (self.b0[0] as f64, self.a1[0] as f64, self.b2[0] as f64);
        let (a1, a2) = (self.a1[0] as f64, -(self.neg_a2[0] as f64));

        // H(e^jw) evaluated with z^-1 = cos(w) - j sin(w)
        let (c1, s1) = (omega.cos(), -omega.sin());
        let (c2, s2) = ((2.0 * omega).cos(), -(2.0 * omega).sin());
        let num_re = b0 + b1 * c1 + b2 * c2;
        let num_im = b1 * s1 + b2 * s2;
        let den_re = 1.0 + a1 * c1 + a2 * c2;
        let den_im = a1 * s1 + a2 * s2;

        let num = (num_re * num_re + num_im * num_im).sqrt();
        let den = (den_re * den_re + den_im * den_im).sqrt();
        20.0 * (num / den).log10()
    }
}

impl Default for BandCoefficients {
    fn default() -> Self {
        Self::BYPASS
    }
}

/// Everything a band's coefficients depend on besides its own index
#[derive(Debug, Clone, Copy)]
pub struct FilterInputs<'a> {
    /// Stored band levels in dB
    pub gains_db: &'a [f64; BAND_COUNT],
    pub equalizer_enabled: bool,
    /// Bass boost gain for the bass bands in dB, 0 when disabled
    pub bass_boost_db: f64,
    pub sample_rate: u32,
}

impl FilterInputs<'_> {
    #[inline]
    fn equalizer_gain(&self, band: Option<usize>) -> f64 {
        match band {
            Some(band) if self.equalizer_enabled && band < BAND_COUNT => self.gains_db[band],
            _ => 0.0,
        }
    }

    /// Gain the band's filter is designed with
    pub fn effective_gain_db(&self, band: usize) -> f64 {
        let own = self.equalizer_gain(Some(band));
        let neighbors = self.equalizer_gain(band.checked_sub(1)) + self.equalizer_gain(Some(band + 1));
        let bass = if band < BASS_BOOST_BAND_COUNT {
            self.bass_boost_db
        } else {
            0.0
        };
        own - NEIGHBOR_COUPLING * neighbors + bass
    }
}

/// Compute one band's coefficients.
///
/// Returns `None` for an out-of-range band. Pure: identical inputs give
/// bit-identical coefficients.
pub fn compute_band(band: usize, inputs: &FilterInputs<'_>) -> Option<BandCoefficients> {
    if band >= BAND_COUNT {
        return None;
    }
    let gain_db = inputs.effective_gain_db(band);
    if gain_db == 0.0 {
        return Some(BandCoefficients::BYPASS);
    }
    Some(BandCoefficients::peaking(
        BAND_FREQUENCIES[band],
        BAND_Q,
        gain_db,
        inputs.sample_rate as f64,
    ))
}

/// Bands that are meaningful below Nyquist for a sample rate (6 to 10)
pub fn active_band_count(sample_rate: u32) -> usize {
    if sample_rate > 2 * 16000 {
        10
    } else if sample_rate > 2 * 8000 {
        9
    } else if sample_rate > 2 * 4000 {
        8
    } else if sample_rate > 2 * 2000 {
        7
    } else {
        6
    }
}
