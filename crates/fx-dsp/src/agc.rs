//! Automatic gain controller (limiter)
//!
//! Hard limiting clicks, so instead of clamping the output the controller
//! rides a smoothed suppression gain: while the output would clip the gain
//! falls by a fixed factor every frame (−40 dB/s by default); after a quiet
//! hold-off period it recovers by a much smaller factor (+0.5 dB/s) until
//! it is back at unity.

use fx_core::{AgcConfig, db_per_second_to_frame_factor, exceeds_i16, saturate_to_i16};
use portable_atomic::{AtomicF32, Ordering};

/// Lowest suppression gain (−80 dB)
pub const MIN_GAIN: f32 = 1.0e-4;

/// Hold-off value that never counts down
pub const HOLD_OFF_DISARMED: u32 = u32::MAX;

/// Per-frame AGC constants derived from configuration and sample rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgcParams {
    pub enabled: bool,
    pub reduction_per_frame: f32,
    pub recovery_per_frame: f32,
    pub hold_off_frames: u32,
}

impl AgcParams {
    /// Neutral factors, used before the first sample rate is known
    pub const UNITY: Self = Self {
        enabled: false,
        reduction_per_frame: 1.0,
        recovery_per_frame: 1.0,
        hold_off_frames: 0,
    };

    pub fn new(config: &AgcConfig, enabled: bool, sample_rate: u32) -> Self {
        let hold_off_frames = (config.hold_off_ms as u64 * sample_rate as u64 / 1000)
            .min(HOLD_OFF_DISARMED as u64 - 1) as u32;
        Self {
            enabled,
            reduction_per_frame: db_per_second_to_frame_factor(
                config.reduction_db_per_second,
                sample_rate,
            ),
            recovery_per_frame: db_per_second_to_frame_factor(
                config.recovery_db_per_second,
                sample_rate,
            ),
            hold_off_frames,
        }
    }
}

/// Render-path limiter state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgcState {
    gain: f32,
    must_reduce: bool,
    frames_before_recovery: u32,
    /// Largest post-filter magnitude since `begin_block`, before the gain
    block_peak: f32,
}

impl AgcState {
    pub const fn new() -> Self {
        Self {
            gain: 1.0,
            must_reduce: false,
            frames_before_recovery: HOLD_OFF_DISARMED,
            block_peak: 0.0,
        }
    }

    /// Start a new processing block: clears the block peak
    #[inline]
    pub fn begin_block(&mut self) {
        self.block_peak = 0.0;
    }

    /// No suppression, reduction inactive, hold-off disarmed
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[inline]
    pub fn gain(&self) -> f32 {
        self.gain
    }

    #[inline]
    pub fn must_reduce(&self) -> bool {
        self.must_reduce
    }

    #[inline]
    pub fn frames_before_recovery(&self) -> u32 {
        self.frames_before_recovery
    }

    /// Peak absolute post-filter sample of the current block
    #[inline]
    pub fn block_peak(&self) -> f32 {
        self.block_peak
    }

    /// Scale one filtered frame, update the gain and convert to 16-bit
    #[inline(always)]
    pub fn apply(&mut self, params: &AgcParams, left: f32, right: f32) -> (i16, i16) {
        self.block_peak = self.block_peak.max(left.abs()).max(right.abs());
        if !params.enabled {
            return (saturate_to_i16(left), saturate_to_i16(right));
        }

        let left = left * self.gain;
        let right = right * self.gain;
        self.track(params, exceeds_i16(left) || exceeds_i16(right));
        (saturate_to_i16(left), saturate_to_i16(right))
    }

    #[inline(always)]
    fn track(&mut self, params: &AgcParams, clipped: bool) {
        if clipped {
            self.must_reduce = true;
            self.gain = (self.gain * params.reduction_per_frame).max(MIN_GAIN);
            self.frames_before_recovery = params.hold_off_frames;
            return;
        }

        self.must_reduce = false;
        if self.frames_before_recovery > 0 {
            if self.frames_before_recovery != HOLD_OFF_DISARMED {
                self.frames_before_recovery -= 1;
            }
        } else if self.gain < 1.0 {
            self.gain = (self.gain * params.recovery_per_frame).min(1.0);
        }
    }
}

impl Default for AgcState {
    fn default() -> Self {
        Self::new()
    }
}

/// Latest render-path gain, readable from the control path
#[derive(Debug)]
pub struct GainMeter {
    gain: AtomicF32,
}

impl GainMeter {
    pub fn new() -> Self {
        Self {
            gain: AtomicF32::new(1.0),
        }
    }

    #[inline]
    pub fn store(&self, gain: f32) {
        self.gain.store(gain, Ordering::Relaxed);
    }

    #[inline]
    pub fn load(&self) -> f32 {
        self.gain.load(Ordering::Relaxed)
    }
}

impl Default for GainMeter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(hold_off_ms: u32) -> AgcParams {
        let config = AgcConfig {
            hold_off_ms,
            ..Default::default()
        };
        AgcParams::new(&config, true, 44100)
    }

    #[test]
    fn test_params() {
        let p = params(1000);
        assert!(p.reduction_per_frame < 1.0);
        assert!(p.recovery_per_frame > 1.0);
        assert_eq!(p.hold_off_frames, 44100);
        assert_eq!(params(10).hold_off_frames, 441);
    }

    #[test]
    fn test_quiet_signal_untouched() {
        let p = params(1000);
        let mut agc = AgcState::new();
        for _ in 0..1000 {
            assert_eq!(agc.apply(&p, 1000.4, -20000.6), (1000, -20001));
        }
        assert_eq!(agc.gain(), 1.0);
        assert!(!agc.must_reduce());
    }

    #[test]
    fn test_reduces_while_clipping() {
        let p = params(1000);
        let mut agc = AgcState::new();
        let mut previous = agc.gain();
        for _ in 0..100 {
            let (l, r) = agc.apply(&p, 60000.0, -60000.0);
            assert_eq!((l, r), (i16::MAX, i16::MIN));
            assert!(agc.gain() < previous);
            assert!(agc.must_reduce());
            previous = agc.gain();
        }
        assert_eq!(agc.frames_before_recovery(), 44100);
    }

    #[test]
    fn test_hold_off_then_recovery() {
        let p = params(10);
        let mut agc = AgcState::new();
        // Short enough that every frame still clips
        for _ in 0..1000 {
            agc.apply(&p, 40000.0, 40000.0);
        }
        let suppressed = agc.gain();
        assert!(suppressed < 1.0);

        // Hold-off: gain frozen
        for _ in 0..p.hold_off_frames {
            agc.apply(&p, 0.0, 0.0);
            assert_eq!(agc.gain(), suppressed);
        }
        assert_eq!(agc.frames_before_recovery(), 0);

        // Recovery: strictly increasing
        let mut previous = agc.gain();
        for _ in 0..1000 {
            agc.apply(&p, 0.0, 0.0);
            assert!(agc.gain() > previous);
            previous = agc.gain();
        }
    }

    #[test]
    fn test_recovery_caps_at_unity() {
        let p = AgcParams {
            recovery_per_frame: 1.5,
            ..params(0)
        };
        let mut agc = AgcState::new();
        agc.apply(&p, 40000.0, 0.0);
        for _ in 0..100 {
            agc.apply(&p, 0.0, 0.0);
            assert!(agc.gain() <= 1.0);
        }
        assert_eq!(agc.gain(), 1.0);
    }

    #[test]
    fn test_gain_floor() {
        let p = AgcParams {
            reduction_per_frame: 0.1,
            ..params(1000)
        };
        let mut agc = AgcState::new();
        for _ in 0..20 {
            agc.apply(&p, f32::MAX, f32::MAX);
        }
        assert_eq!(agc.gain(), MIN_GAIN);
    }

    #[test]
    fn test_disabled_only_saturates() {
        let p = AgcParams {
            enabled: false,
            ..params(1000)
        };
        let mut agc = AgcState::new();
        assert_eq!(agc.apply(&p, 50000.0, -50000.0), (i16::MAX, i16::MIN));
        assert_eq!(agc.gain(), 1.0);
        assert_eq!(agc.frames_before_recovery(), HOLD_OFF_DISARMED);
    }

    #[test]
    fn test_reset() {
        let p = params(1000);
        let mut agc = AgcState::new();
        agc.apply(&p, 40000.0, 0.0);
        agc.reset();
        assert_eq!(agc, AgcState::new());
    }

    #[test]
    fn test_meter() {
        let meter = GainMeter::new();
        assert_eq!(meter.load(), 1.0);
        meter.store(0.25);
        assert_eq!(meter.load(), 0.25);
    }

    #[test]
    fn test_block_peak_tracks_largest_magnitude() {
        let p = params(1000);
        let mut agc = AgcState::new();
        for (l, r) in [(100.0, -250.5), (-40000.0, 3.0), (12.0, 39000.0)] {
            agc.apply(&p, l, r);
        }
        // Measured before the gain, so the suppression does not shrink it
        assert_eq!(agc.block_peak(), 40000.0);
        assert!(agc.gain() < 1.0);

        agc.begin_block();
        assert_eq!(agc.block_peak(), 0.0);
        agc.apply(&p, -7.0, 5.0);
        assert_eq!(agc.block_peak(), 7.0);
    }
}
