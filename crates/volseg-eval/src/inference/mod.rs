//! Batched inference over context slices.
//!
//! This is the only part of the crate that holds tensors on the compute device:
//! * [`SlicePredictor`]: the external network, `[n, 3C, H, W] -> [n, K, H', W']`.
//! * [`InferenceExecutor`]: moves each [`ContextBatch`](crate::ContextBatch) to the device,
//!   runs the predictor and brings the result back as [`HostPredictions`].
mod executor;
mod predictor;

#[cfg(test)]
mod tests;

pub use executor::*;
pub use predictor::SlicePredictor;
