//! Effects engine: one controller, one processor, one snapshot channel

use std::sync::Arc;

use fx_core::{EffectsConfig, FxResult};

use crate::agc::GainMeter;
use crate::controller::EffectsController;
use crate::dispatch::vectorized_supported;
use crate::processor::EffectsProcessor;
use crate::snapshot::{RenderSnapshot, snapshot_channel};

/// The complete engine.
///
/// Single-threaded hosts can use it directly through `controller` and
/// `processor`; threaded hosts call [`EffectsEngine::into_parts`] and move
/// the processor to the audio thread.
pub struct EffectsEngine {
    pub controller: EffectsController,
    pub processor: EffectsProcessor,
}

impl EffectsEngine {
    /// Validate `config`, initialize every effect to disabled and connect
    /// both halves.
    pub fn new(config: EffectsConfig) -> FxResult<Self> {
        Self::with_vector_support(config, vectorized_supported())
    }

    /// Like [`EffectsEngine::new`] with an explicit vector-unit capability
    pub fn with_vector_support(config: EffectsConfig, vectorized_supported: bool) -> FxResult<Self> {
        config.validate()?;

        let (writer, reader) = snapshot_channel(RenderSnapshot::default());
        let meter = Arc::new(GainMeter::new());
        let controller =
            EffectsController::new(config, vectorized_supported, writer, Arc::clone(&meter));
        let processor = EffectsProcessor::new(reader, meter);

        Ok(Self {
            controller,
            processor,
        })
    }

    /// Process one block in place (control and render on the same thread)
    pub fn process(&mut self, buffer: &mut [i16], frames: usize) {
        self.processor.process(buffer, frames);
    }

    pub fn into_parts(self) -> (EffectsController, EffectsProcessor) {
        (self.controller, self.processor)
    }
}
