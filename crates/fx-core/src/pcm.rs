//! Interleaved 16-bit stereo PCM helpers

use crate::CHANNELS;

/// Number of complete stereo frames held by an interleaved buffer
#[inline]
pub fn frames_in(buffer: &[i16]) -> usize {
    buffer.len() / CHANNELS
}

/// Round to nearest and saturate into the signed 16-bit range.
///
/// Values outside the range are clamped, never wrapped. NaN maps to 0.
#[inline(always)]
pub fn saturate_to_i16(value: f32) -> i16 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Whether a value would fall outside the signed 16-bit range
#[inline(always)]
pub fn exceeds_i16(value: f32) -> bool {
    value > i16::MAX as f32 || value < i16::MIN as f32
}
