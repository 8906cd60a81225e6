use burn::prelude::*;

use crate::error::EvalError;
use crate::volume::Volume;

/// A contiguous run of slices, each widened to `[before, self, after]` channels.
///
/// The tensor is laid out as `[len, 3 * channels, height, width]`. A batch is handed
/// to the [`InferenceExecutor`](crate::InferenceExecutor) by value and does not outlive
/// the inference call it feeds.
#[derive(Debug)]
pub struct ContextBatch<B: Backend> {
    start: usize,
    tensor: Tensor<B, 4>,
}

impl<B: Backend> ContextBatch<B> {
    /// Depth index of the first slice in the batch.
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn len(&self) -> usize {
        self.tensor.dims()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tensor(&self) -> &Tensor<B, 4> {
        &self.tensor
    }

    pub fn into_tensor(self) -> Tensor<B, 4> {
        self.tensor
    }
}

/// Splits a volume into [`ContextBatch`]es of at most `batch_size` slices.
#[derive(Clone, Copy, Debug)]
pub struct SliceContextBatcher {
    batch_size: usize,
}

impl SliceContextBatcher {
    pub fn new(batch_size: usize) -> Result<Self, EvalError> {
        if batch_size == 0 {
            return Err(EvalError::InvalidBatchSize);
        }
        Ok(Self { batch_size })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches a volume of `depth` slices is split into.
    pub fn batch_count(&self, depth: usize) -> usize {
        depth.div_ceil(self.batch_size)
    }

    /// Lazily yields the context batches of `volume` in depth order.
    pub fn batches<'a, B: Backend>(&self, volume: &'a Volume<B>) -> ContextBatches<'a, B> {
        ContextBatches {
            volume,
            batch_size: self.batch_size,
            next: 0,
        }
    }

    pub fn build_batches<B: Backend>(&self, volume: &Volume<B>) -> Vec<ContextBatch<B>> {
        self.batches(volume).collect()
    }
}

/// Iterator returned by [`SliceContextBatcher::batches`].
pub struct ContextBatches<'a, B: Backend> {
    volume: &'a Volume<B>,
    batch_size: usize,
    next: usize,
}

impl<B: Backend> Iterator for ContextBatches<'_, B> {
    type Item = ContextBatch<B>;

    fn next(&mut self) -> Option<Self::Item> {
        let depth = self.volume.depth();
        if self.next >= depth {
            return None;
        }

        let start = self.next;
        let len = self.batch_size.min(depth - start);
        self.next += len;

        Some(ContextBatch {
            start,
            tensor: with_neighbours(self.volume.tensor(), start, len),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .volume
            .depth()
            .saturating_sub(self.next)
            .div_ceil(self.batch_size);
        (remaining, Some(remaining))
    }
}

impl<B: Backend> ExactSizeIterator for ContextBatches<'_, B> {}

/// Concatenates `[before, self, after]` along the channel axis for slices `start..start + len`.
///
/// Neighbours outside the chunk come from the full volume; only the first and last
/// slice of the volume fall back to themselves.
fn with_neighbours<B: Backend>(volume: &Tensor<B, 4>, start: usize, len: usize) -> Tensor<B, 4> {
    let depth = volume.dims()[0];
    let end = start + len;
    let current = volume.clone().narrow(0, start, len);

    let before_first = volume.clone().narrow(0, start.saturating_sub(1), 1);
    let after_last = volume.clone().narrow(0, end.min(depth - 1), 1);

    let (before, after) = if len > 1 {
        (
            Tensor::cat(vec![before_first, current.clone().narrow(0, 0, len - 1)], 0),
            Tensor::cat(vec![current.clone().narrow(0, 1, len - 1), after_last], 0),
        )
    } else {
        (before_first, after_last)
    };

    Tensor::cat(vec![before, current, after], 1)
}
