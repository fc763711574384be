//! Routine selection
//!
//! The render path runs exactly one routine per buffer, picked from the
//! enabled effects and the available backend. Selection happens on the
//! control path whenever the flags or backend availability change; the
//! result travels to the render path inside the published snapshot.

use std::sync::OnceLock;

use fx_core::BackendPreference;

use crate::flags::EffectFlags;

/// Which stages a buffer passes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutineKind {
    /// Copy (or leave) the input untouched
    NoOp,
    /// Filter bank (equalizer and/or bass boost) + gain limiter
    Equalizer,
    /// Virtualizer + gain limiter
    Virtualizer,
    /// Filter bank + virtualizer + gain limiter
    Combined,
}

impl RoutineKind {
    pub const fn select(flags: EffectFlags) -> Self {
        if flags.contains(EffectFlags::VIRTUALIZER) {
            if flags.uses_filter_bank() {
                Self::Combined
            } else {
                Self::Virtualizer
            }
        } else if flags.uses_filter_bank() {
            Self::Equalizer
        } else {
            Self::NoOp
        }
    }

    pub const fn uses_filter_bank(self) -> bool {
        matches!(self, Self::Equalizer | Self::Combined)
    }

    pub const fn uses_virtualizer(self) -> bool {
        matches!(self, Self::Virtualizer | Self::Combined)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::NoOp => "no-op",
            Self::Equalizer => "equalizer",
            Self::Virtualizer => "virtualizer",
            Self::Combined => "equalizer+virtualizer",
        }
    }
}

/// Execution strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Portable `f32` kernels, the reference implementation
    Scalar,
    /// 4-lane vector kernels, bit-identical to `Scalar`
    Vectorized,
}

impl Backend {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Vectorized => "vectorized",
        }
    }
}

/// A routine: stages × backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Routine {
    pub kind: RoutineKind,
    pub backend: Backend,
}

impl Routine {
    pub const NOOP: Self = Self {
        kind: RoutineKind::NoOp,
        backend: Backend::Scalar,
    };

    pub const fn new(kind: RoutineKind, backend: Backend) -> Self {
        Self { kind, backend }
    }

    /// Pick the routine for `flags`. Only the filter bank has a vector
    /// form, so the no-op and virtualizer-only routines stay scalar.
    pub const fn select(flags: EffectFlags, vectorized: bool) -> Self {
        let kind = RoutineKind::select(flags);
        let backend = if vectorized && kind.uses_filter_bank() {
            Backend::Vectorized
        } else {
            Backend::Scalar
        };
        Self { kind, backend }
    }
}

impl std::fmt::Display for Routine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.kind.name(), self.backend.name())
    }
}

static VECTOR_SUPPORT: OnceLock<bool> = OnceLock::new();

/// Whether this CPU can run the 128-bit vector kernels (detected once)
pub fn vectorized_supported() -> bool {
    *VECTOR_SUPPORT.get_or_init(|| {
        #[cfg(target_arch = "x86_64")]
        {
            is_x86_feature_detected!("sse2")
        }

        #[cfg(target_arch = "aarch64")]
        {
            // NEON is always available on aarch64
            true
        }

        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            false
        }
    })
}

/// Combine configuration with hardware support
pub fn vectorized_allowed(preference: BackendPreference, supported: bool) -> bool {
    match preference {
        BackendPreference::Scalar => false,
        BackendPreference::Auto | BackendPreference::Vectorized => supported,
    }
}
