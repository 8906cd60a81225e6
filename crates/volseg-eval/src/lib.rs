//! Evaluation of 2D segmentation networks on 3D volumes.
//!
//! A volume is cut into slices, every slice is widened with its neighbours'
//! channels, the slices are pushed through a predictor in batches, and the
//! per-slice outputs are stitched back into a mask volume that is scored
//! according to the dataset the volume came from:
//!
//! 1. [`SliceContextBatcher`] builds [`ContextBatch`]es from a [`Volume`].
//! 2. [`InferenceExecutor`] runs a [`SlicePredictor`] over them and returns [`HostPredictions`].
//! 3. [`VolumeReassembler`] concatenates, resamples and binarizes them into a [`MaskVolume`].
//! 4. [`DatasetAwareEvaluator`] accumulates the metric family selected by [`DatasetIdentity`].
//!
//! [`EvaluationSession`] wires the four stages together and drives whole datasets.
mod batcher;
mod config;
mod dataset;
mod error;
mod evaluator;
mod inference;
mod reassembly;
mod report;
mod session;
mod volume;

pub mod logging;
pub mod metrics;

#[cfg(feature = "cli")]
pub mod cli;

pub use batcher::*;
pub use config::*;
pub use dataset::*;
pub use error::*;
pub use evaluator::DatasetAwareEvaluator;
pub use inference::*;
pub use reassembly::*;
pub use report::*;
pub use session::*;
pub use volume::*;

pub use burn;
