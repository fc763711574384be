//! Lock-free snapshot publication (control path → render path)
//!
//! A triple buffer split into a writer half and a reader half. The writer
//! fills its private slot and swaps it into the shared "back" slot; the
//! reader swaps the back slot into its own private slot when it sees the
//! dirty bit. Both sides are wait-free and never allocate after creation,
//! so the render path always observes either the previous complete
//! snapshot or the newest complete one, never a mix.

use std::cell::UnsafeCell;
use std::sync::Arc;

use fx_core::BAND_COUNT;
use portable_atomic::{AtomicU8, Ordering};

use crate::agc::AgcParams;
use crate::coefficients::BandCoefficients;
use crate::dispatch::Routine;
use crate::flags::EffectFlags;

const INDEX_MASK: u8 = 0b011;
const DIRTY: u8 = 0b100;

struct Shared<T> {
    slots: [UnsafeCell<T>; 3],
    /// Index of the back slot, plus `DIRTY` when it holds an unread publish
    back: AtomicU8,
}

// SAFETY: each slot index is owned by exactly one of writer, back, reader at
// any time; ownership only moves through the atomic swap on `back`.
unsafe impl<T: Send> Sync for Shared<T> {}

/// Producer half, owned by the control path
pub struct SnapshotWriter<T> {
    shared: Arc<Shared<T>>,
    slot: u8,
}

/// Consumer half, owned by the render path
pub struct SnapshotReader<T> {
    shared: Arc<Shared<T>>,
    slot: u8,
}

/// Create a connected writer/reader pair, all slots holding `initial`
pub fn snapshot_channel<T: Clone + Send>(initial: T) -> (SnapshotWriter<T>, SnapshotReader<T>) {
    let shared = Arc::new(Shared {
        slots: [
            UnsafeCell::new(initial.clone()),
            UnsafeCell::new(initial.clone()),
            UnsafeCell::new(initial),
        ],
        back: AtomicU8::new(1),
    });
    (
        SnapshotWriter {
            shared: Arc::clone(&shared),
            slot: 0,
        },
        SnapshotReader { shared, slot: 2 },
    )
}

impl<T: Clone> SnapshotWriter<T> {
    /// Publish a complete value
    pub fn publish(&mut self, value: &T) {
        // SAFETY: `self.slot` is owned by the writer until the swap below
        unsafe {
            (*self.shared.slots[self.slot as usize].get()).clone_from(value);
        }
        let previous = self.shared.back.swap(self.slot | DIRTY, Ordering::AcqRel);
        self.slot = previous & INDEX_MASK;
    }
}

impl<T> SnapshotReader<T> {
    /// Newest published value (or the last one seen if nothing new arrived)
    pub fn latest(&mut self) -> &T {
        if self.has_update() {
            let previous = self.shared.back.swap(self.slot, Ordering::AcqRel);
            self.slot = previous & INDEX_MASK;
        }
        // SAFETY: `self.slot` is owned by the reader until its next swap
        unsafe { &*self.shared.slots[self.slot as usize].get() }
    }

    /// Whether a publish happened since the last `latest()`
    #[inline]
    pub fn has_update(&self) -> bool {
        self.shared.back.load(Ordering::Relaxed) & DIRTY != 0
    }
}

/// Everything the render path needs for one buffer
#[derive(Debug, Clone, Copy)]
pub struct RenderSnapshot {
    pub flags: EffectFlags,
    pub routine: Routine,
    pub coefficients: [BandCoefficients; BAND_COUNT],
    pub active_bands: usize,
    pub agc: AgcParams,
    pub virtualizer_strength: u32,
    /// Filter history and AGC state are cleared when this changes
    pub pipeline_epoch: u64,
    /// AGC state alone is cleared when this changes
    pub agc_epoch: u64,
}

impl RenderSnapshot {
    /// Bands the filter bank runs for the current flags
    pub fn filter_bands(&self) -> usize {
        if self.flags.contains(EffectFlags::EQUALIZER) {
            self.active_bands
        } else if self.flags.contains(EffectFlags::BASS_BOOST) {
            fx_core::BASS_BOOST_BAND_COUNT.min(self.active_bands)
        } else {
            0
        }
    }
}

impl Default for RenderSnapshot {
    fn default() -> Self {
        Self {
            flags: EffectFlags::NONE,
            routine: Routine::NOOP,
            coefficients: [BandCoefficients::BYPASS; BAND_COUNT],
            active_bands: 0,
            agc: AgcParams::UNITY,
            virtualizer_strength: 0,
            pipeline_epoch: 0,
            agc_epoch: 0,
        }
    }
}
