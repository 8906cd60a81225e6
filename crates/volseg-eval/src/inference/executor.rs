use burn::prelude::*;

use super::predictor::SlicePredictor;
use crate::batcher::ContextBatch;
use crate::error::EvalError;

/// Raw scores of one batch, copied back to host memory.
#[derive(Clone, Debug)]
pub struct HostBatch {
    pub start: usize,
    pub dims: [usize; 4],
    pub data: TensorData,
}

/// Per-batch predictions in depth order. Nothing in here lives on the compute device.
#[derive(Clone, Debug, Default)]
pub struct HostPredictions {
    batches: Vec<HostBatch>,
}

impl HostPredictions {
    /// Total number of prediction slices over all batches.
    pub fn slices(&self) -> usize {
        self.batches.iter().map(|batch| batch.dims[0]).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn batches(&self) -> &[HostBatch] {
        &self.batches
    }

    pub fn into_batches(self) -> Vec<HostBatch> {
        self.batches
    }
}

/// Runs a [`SlicePredictor`] over context batches on a single compute device.
#[derive(Clone, Debug)]
pub struct InferenceExecutor<B: Backend> {
    device: B::Device,
}

impl<B: Backend> InferenceExecutor<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    /// Predicts every batch in order.
    ///
    /// The first failing batch aborts the whole run, so a volume is never scored on a
    /// partial prediction. A predictor that returns a different number of slices than it
    /// was given, an empty channel or spatial axis, or a shape that changes between
    /// batches counts as a failure.
    pub fn run<P, I>(&self, predictor: &P, batches: I) -> Result<HostPredictions, EvalError>
    where
        P: SlicePredictor<B> + ?Sized,
        I: IntoIterator<Item = ContextBatch<B>>,
    {
        let mut outputs: Vec<HostBatch> = Vec::new();

        for batch in batches {
            let start = batch.start();
            let len = batch.len();
            log::debug!("Predicting slices {start}..{}", start + len);

            let input = batch.into_tensor().to_device(&self.device);
            let output = predictor
                .predict(input)
                .map_err(|source| EvalError::PredictorFailure { start, source })?;

            let dims = output.dims();
            if dims[0] != len {
                return Err(EvalError::PredictorFailure {
                    start,
                    source: anyhow::anyhow!(
                        "expected {len} prediction slices, received {}",
                        dims[0]
                    ),
                });
            }
            if dims[1..].contains(&0) {
                return Err(EvalError::PredictorFailure {
                    start,
                    source: anyhow::anyhow!("prediction has an empty axis: {dims:?}"),
                });
            }
            if let Some(previous) = outputs.last() {
                if previous.dims[1..] != dims[1..] {
                    return Err(EvalError::PredictorFailure {
                        start,
                        source: anyhow::anyhow!(
                            "prediction shape changed from {:?} to {:?}",
                            &previous.dims[1..],
                            &dims[1..]
                        ),
                    });
                }
            }

            outputs.push(HostBatch {
                start,
                dims,
                data: output.into_data(),
            });
        }

        Ok(HostPredictions { batches: outputs })
    }
}
