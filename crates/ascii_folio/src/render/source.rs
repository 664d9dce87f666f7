use crate::ascii::grid::CharacterGrid;
use crate::image_pipeline::loader::{FrameProducer, ProduceError};
use crate::image_pipeline::sampler::BlockSampler;

/// Anything the render loop can pull a fresh grid from each tick.
pub trait GridSource {
    fn next_grid(&mut self, tick: u64) -> Result<CharacterGrid, ProduceError>;
}

/// A frame producer paired with the sampler that turns its frames into grids.
pub struct SampledSource<P> {
    producer: P,
    sampler: BlockSampler,
}

impl<P: FrameProducer> SampledSource<P> {
    pub fn new(producer: P, sampler: BlockSampler) -> Self {
        Self { producer, sampler }
    }

    pub fn sampler(&self) -> &BlockSampler {
        &self.sampler
    }
}

impl<P: FrameProducer> GridSource for SampledSource<P> {
    fn next_grid(&mut self, tick: u64) -> Result<CharacterGrid, ProduceError> {
        let frame = self.producer.next_frame(tick)?;
        Ok(self.sampler.sample(frame))
    }
}

impl<S: GridSource + ?Sized> GridSource for Box<S> {
    fn next_grid(&mut self, tick: u64) -> Result<CharacterGrid, ProduceError> {
        (**self).next_grid(tick)
    }
}
