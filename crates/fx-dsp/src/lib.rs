//! fx-dsp: real-time effects engine for 16-bit stereo PCM
//!
//! A 10-band parametric equalizer and a 3-band bass boost sharing one
//! biquad filter bank, a stereo virtualizer (control surface only) and an
//! automatic gain limiter, with scalar and vectorized backends picked at
//! runtime.
//!
//! ## Modules
//! - `coefficients` - peaking biquad design and band-coupling rules
//! - `equalizer` - band levels and bass boost, recomputation fan-out
//! - `bank` - cascaded Direct Form II filter bank (scalar reference)
//! - `simd` - 4-lane vector kernel, bit-identical to `bank`
//! - `agc` - smoothed clip-avoiding gain rider
//! - `virtualizer` - virtualizer parameters and identity render stage
//! - `dispatch` - routine selection (stages × backend)
//! - `snapshot` - wait-free control → render publication
//! - `controller` / `processor` / `engine` - the two execution paths
//!
//! ## Threading
//!
//! ```text
//!  control thread                         audio thread
//!  ┌──────────────────┐  RenderSnapshot  ┌──────────────────┐
//!  │ EffectsController│ ───────────────▶ │ EffectsProcessor │
//!  │ levels, flags,   │  (triple buffer) │ filter history,  │
//!  │ coefficients     │ ◀─────────────── │ limiter state    │
//!  └──────────────────┘   GainMeter      └──────────────────┘
//! ```

pub mod agc;
pub mod bank;
pub mod coefficients;
pub mod controller;
pub mod dispatch;
pub mod engine;
pub mod equalizer;
pub mod flags;
pub mod processor;
pub mod simd;
pub mod snapshot;
pub mod virtualizer;

pub use controller::EffectsController;
pub use dispatch::{Backend, Routine, RoutineKind};
pub use engine::EffectsEngine;
pub use flags::EffectFlags;
pub use processor::EffectsProcessor;

pub use fx_core::{BAND_COUNT, BASS_BOOST_BAND_COUNT, DB_RANGE, EffectsConfig, FxError, FxResult};
