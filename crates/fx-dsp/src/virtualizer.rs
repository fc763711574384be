//! Stereo virtualizer
//!
//! Control surface and lifecycle only. The spatialization filter is not
//! implemented: `recompute` has nothing to derive and the render stage is
//! the identity. A real widening stage would keep its own coefficients on
//! the control side (recomputed here, published with the snapshot) and its
//! own history in `VirtualizerStage`, cleared on the same resets as the
//! filter bank.

use fx_core::clamp_strength;

/// Control-path virtualizer parameters
#[derive(Debug, Clone)]
pub struct Virtualizer {
    strength: u32,
    sample_rate: u32,
}

impl Virtualizer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            strength: 0,
            sample_rate,
        }
    }

    #[inline]
    pub fn strength(&self) -> u32 {
        self.strength
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Set strength (clamped to `0..=1000`); recomputes when enabled
    pub fn set_strength(&mut self, strength: i32, enabled: bool) {
        self.strength = clamp_strength(strength);
        if enabled {
            self.recompute();
        }
    }

    pub fn reset_strength(&mut self) {
        self.strength = 0;
    }

    /// Enable or sample-rate change. Does nothing while disabled.
    pub fn config_changed(&mut self, sample_rate: u32, enabled: bool) {
        self.sample_rate = sample_rate;
        if !enabled {
            return;
        }
        self.destroy();
        self.recompute();
    }

    /// Release structures built for the current sample rate
    pub fn destroy(&mut self) {}

    fn recompute(&mut self) {
        log::trace!(
            "Virtualizer strength {} at {} Hz (no spatialization filter)",
            self.strength,
            self.sample_rate
        );
    }
}

/// Render-path virtualizer stage
#[derive(Debug, Clone, Default)]
pub struct VirtualizerStage;

impl VirtualizerStage {
    pub fn reset(&mut self) {}

    #[inline(always)]
    pub fn process_frame(&mut self, _strength: u32, left: f32, right: f32) -> (f32, f32) {
        (left, right)
    }
}
