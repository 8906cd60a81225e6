//! Turns per-batch host predictions back into a binary mask volume.
mod resample;

pub use resample::{resample_axis, resample_trilinear};

use burn::prelude::*;
use burn::tensor::activation::sigmoid;

use crate::error::EvalError;
use crate::inference::HostPredictions;
use crate::volume::{MaskVolume, TargetShape};

/// Concatenates, resamples and binarizes predictions on the host device.
#[derive(Clone, Debug)]
pub struct VolumeReassembler<B: Backend> {
    device: B::Device,
    threshold: f64,
    foreground_channel: usize,
}

impl<B: Backend> VolumeReassembler<B> {
    pub fn new(device: B::Device, threshold: f64, foreground_channel: usize) -> Self {
        Self {
            device,
            threshold,
            foreground_channel,
        }
    }

    /// Builds the `[depth, 1, height, width]` mask matching `target`.
    ///
    /// Raw scores go through a logistic activation and are kept where the probability
    /// reaches the threshold. Only the foreground channel survives.
    pub fn reassemble(
        &self,
        predictions: HostPredictions,
        target: TargetShape,
    ) -> Result<MaskVolume<B>, EvalError> {
        if predictions.is_empty() {
            return Err(EvalError::EmptyVolume);
        }

        let slices: Vec<Tensor<B, 4>> = predictions
            .into_batches()
            .into_iter()
            .map(|batch| Tensor::from_data(batch.data, &self.device))
            .collect();
        let raw = Tensor::cat(slices, 0);

        let resampled = resample_trilinear(raw, target);
        let mask = binarize(resampled, self.threshold);

        let available = mask.dims()[1];
        if self.foreground_channel >= available {
            return Err(EvalError::MissingForegroundChannel {
                channel: self.foreground_channel,
                available,
            });
        }

        Ok(MaskVolume::new(mask.narrow(1, self.foreground_channel, 1)))
    }
}

/// Maps raw scores to `{0, 1}`: `sigmoid(score) >= threshold`.
pub fn binarize<B: Backend>(scores: Tensor<B, 4>, threshold: f64) -> Tensor<B, 4> {
    sigmoid(scores).greater_equal_elem(threshold).float()
}
