//! fx-core: Shared types, configuration and errors for PlayFx
//!
//! This crate holds everything the effects engine and its hosts agree on:
//! the error type, the engine configuration, level units (millibels,
//! decibels, linear gain) and the interleaved 16-bit PCM helpers.

mod config;
mod error;
mod level;
mod pcm;

pub use config::*;
pub use error::*;
pub use level::*;
pub use pcm::*;

/// Number of parametric equalizer bands
pub const BAND_COUNT: usize = 10;

/// Band level range in millibels (±15 dB)
pub const DB_RANGE: i32 = 1500;

/// Bands shared with the bass boost (31.25 Hz, 62.5 Hz and 125 Hz)
pub const BASS_BOOST_BAND_COUNT: usize = 3;

/// Upper bound for bass boost and virtualizer strength
pub const MAX_STRENGTH: u32 = 1000;

/// Interleaved channels per frame
pub const CHANNELS: usize = 2;

/// Lowest sample rate the engine accepts
pub const MIN_SAMPLE_RATE: u32 = 1;

/// Highest sample rate the engine accepts
pub const MAX_SAMPLE_RATE: u32 = 768_000;
