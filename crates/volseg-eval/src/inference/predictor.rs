use burn::prelude::{Backend, Tensor};

/// A segmentation network evaluated one batch of context slices at a time.
///
/// Implementations must be stateless across calls: the output for a batch may only
/// depend on that batch.
pub trait SlicePredictor<B: Backend> {
    /// Maps `[n, 3 * C, H, W]` context slices to `[n, K, H', W']` raw scores.
    fn predict(&self, batch: Tensor<B, 4>) -> anyhow::Result<Tensor<B, 4>>;
}

impl<B, F> SlicePredictor<B> for F
where
    B: Backend,
    F: Fn(Tensor<B, 4>) -> anyhow::Result<Tensor<B, 4>>,
{
    fn predict(&self, batch: Tensor<B, 4>) -> anyhow::Result<Tensor<B, 4>> {
        self(batch)
    }
}
