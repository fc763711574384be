//! Render path
//!
//! `EffectsProcessor` is called once per audio block. It adopts the newest
//! published snapshot at the start of the block, then runs the selected
//! routine over every frame. It owns the filter history and the limiter
//! state outright; nothing here allocates, locks or logs.

use std::sync::Arc;

use fx_core::{BAND_COUNT, CHANNELS, frames_in};

use crate::agc::{AgcState, GainMeter};
use crate::bank::FilterBank;
use crate::dispatch::{Backend, Routine, RoutineKind};
use crate::simd::{self, PackedCoefficients};
use crate::snapshot::{RenderSnapshot, SnapshotReader};
use crate::virtualizer::VirtualizerStage;

pub struct EffectsProcessor {
    reader: SnapshotReader<RenderSnapshot>,
    snapshot: RenderSnapshot,
    packed: [PackedCoefficients; BAND_COUNT],
    bank: FilterBank,
    agc: AgcState,
    virtualizer: VirtualizerStage,
    meter: Arc<GainMeter>,
}

impl EffectsProcessor {
    pub(crate) fn new(reader: SnapshotReader<RenderSnapshot>, meter: Arc<GainMeter>) -> Self {
        let mut processor = Self {
            reader,
            snapshot: RenderSnapshot::default(),
            packed: [PackedCoefficients::default(); BAND_COUNT],
            bank: FilterBank::new(),
            agc: AgcState::new(),
            virtualizer: VirtualizerStage,
            meter,
        };
        processor.sync();
        processor
    }

    /// Process `frames` interleaved stereo frames in place.
    ///
    /// `frames` is clamped to what the buffer holds.
    pub fn process(&mut self, buffer: &mut [i16], frames: usize) {
        self.sync();
        self.execute(self.snapshot.routine, buffer, frames);
    }

    /// Process from `src` into `dst`. With every effect disabled this is a
    /// plain copy.
    pub fn process_into(&mut self, src: &[i16], dst: &mut [i16], frames: usize) {
        let frames = frames.min(frames_in(src)).min(frames_in(dst));
        let samples = frames * CHANNELS;
        dst[..samples].copy_from_slice(&src[..samples]);
        self.process(dst, frames);
    }

    /// Adopt the newest snapshot, then run `routine` instead of the
    /// dispatched one. Used to validate dispatch and to compare backends.
    pub fn run_routine(&mut self, routine: Routine, buffer: &mut [i16], frames: usize) {
        self.sync();
        self.execute(routine, buffer, frames);
    }

    fn execute(&mut self, routine: Routine, buffer: &mut [i16], frames: usize) {
        let frames = frames.min(frames_in(buffer));
        let buffer = &mut buffer[..frames * CHANNELS];
        self.agc.begin_block();

        match (routine.kind, routine.backend) {
            (RoutineKind::NoOp, _) => {}
            (RoutineKind::Equalizer, Backend::Scalar) => self.render::<true, false, false>(buffer),
            (RoutineKind::Equalizer, Backend::Vectorized) => {
                self.render::<true, false, true>(buffer)
            }
            (RoutineKind::Virtualizer, _) => self.render::<false, true, false>(buffer),
            (RoutineKind::Combined, Backend::Scalar) => self.render::<true, true, false>(buffer),
            (RoutineKind::Combined, Backend::Vectorized) => self.render::<true, true, true>(buffer),
        }
        self.meter.store(self.agc.gain());
    }

    /// Routine of the snapshot adopted by the last call
    pub fn routine(&self) -> Routine {
        self.snapshot.routine
    }

    /// Current limiter gain (linear)
    pub fn agc_gain(&self) -> f32 {
        self.agc.gain()
    }

    /// Peak absolute post-filter sample of the last block (0 for the no-op
    /// routine)
    pub fn block_peak(&self) -> f32 {
        self.agc.block_peak()
    }

    pub fn agc_state(&self) -> &AgcState {
        &self.agc
    }

    pub fn filter_bank(&self) -> &FilterBank {
        &self.bank
    }

    /// Snapshot adopted by the last call
    pub fn snapshot(&self) -> &RenderSnapshot {
        &self.snapshot
    }

    /// Adopt the newest snapshot and apply any reset it requests
    fn sync(&mut self) {
        if !self.reader.has_update() {
            return;
        }
        let next = *self.reader.latest();

        if next.pipeline_epoch != self.snapshot.pipeline_epoch {
            self.bank.reset();
            self.virtualizer.reset();
            self.agc.reset();
        } else if next.agc_epoch != self.snapshot.agc_epoch {
            self.agc.reset();
        }
        if next.coefficients != self.snapshot.coefficients {
            self.packed = PackedCoefficients::pack_all(&next.coefficients);
        }
        self.snapshot = next;
    }

    #[inline(always)]
    fn render<const FILTER: bool, const VIRTUALIZE: bool, const VECTOR: bool>(
        &mut self,
        buffer: &mut [i16],
    ) {
        let bands = if FILTER { self.snapshot.filter_bands() } else { 0 };
        let strength = self.snapshot.virtualizer_strength;
        let params = self.snapshot.agc;

        for frame in buffer.chunks_exact_mut(CHANNELS) {
            let mut left = frame[0] as f32;
            let mut right = frame[1] as f32;

            if FILTER {
                (left, right) = if VECTOR {
                    simd::process_frame(&self.packed, self.bank.states_mut(), bands, left, right)
                } else {
                    self.bank
                        .process_frame(&self.snapshot.coefficients, bands, left, right)
                };
            }
            if VIRTUALIZE {
                (left, right) = self.virtualizer.process_frame(strength, left, right);
            }

            let (left, right) = self.agc.apply(&params, left, right);
            frame[0] = left;
            frame[1] = right;
        }
    }
}
