use burn::prelude::Backend;

use crate::batcher::SliceContextBatcher;
use crate::config::EvaluationConfig;
use crate::dataset::DatasetIdentity;
use crate::error::{EvalError, Stage, VolumeError};
use crate::evaluator::DatasetAwareEvaluator;
use crate::inference::{InferenceExecutor, SlicePredictor};
use crate::reassembly::VolumeReassembler;
use crate::report::{MetricReport, ReportSink};
use crate::volume::VolumeSample;

/// Outcome of evaluating one dataset.
#[derive(Debug)]
pub struct DatasetSummary {
    pub dataset: DatasetIdentity,
    pub report: MetricReport,
    pub evaluated: usize,
    pub skipped: Vec<VolumeError>,
}

/// Runs volumes through batching, inference, reassembly and evaluation, one at a time.
pub struct EvaluationSession<B: Backend, P> {
    config: EvaluationConfig,
    predictor: P,
    batcher: SliceContextBatcher,
    executor: InferenceExecutor<B>,
    reassembler: VolumeReassembler<B>,
    evaluator: DatasetAwareEvaluator,
}

impl<B, P> EvaluationSession<B, P>
where
    B: Backend,
    P: SlicePredictor<B>,
{
    /// `device` runs the predictor; `host` holds everything before and after inference.
    pub fn new(
        config: EvaluationConfig,
        predictor: P,
        device: B::Device,
        host: B::Device,
    ) -> Result<Self, EvalError> {
        config.validate()?;
        Ok(Self {
            batcher: SliceContextBatcher::new(config.batch_size)?,
            executor: InferenceExecutor::new(device),
            reassembler: VolumeReassembler::new(host, config.threshold, config.foreground_channel),
            evaluator: DatasetAwareEvaluator::new(),
            predictor,
            config,
        })
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &DatasetAwareEvaluator {
        &self.evaluator
    }

    /// Evaluates a single volume and accumulates its scores under `dataset`.
    ///
    /// On error nothing is accumulated.
    pub fn evaluate_volume(
        &mut self,
        dataset: DatasetIdentity,
        sample: &VolumeSample<B>,
    ) -> Result<(), VolumeError> {
        let fail = |stage: Stage| {
            let volume = sample.id.clone();
            move |source: EvalError| VolumeError::new(volume, dataset, stage, source)
        };

        let image = dataset
            .prepare_channels(&sample.image, self.config.slot_channels)
            .map_err(fail(Stage::Preparation))?;

        log::debug!(
            "Volume '{}': {} slices in {} batches",
            sample.id,
            image.depth(),
            self.batcher.batch_count(image.depth())
        );

        let predictions = self
            .executor
            .run(&self.predictor, self.batcher.batches(&image))
            .map_err(fail(Stage::Inference))?;

        let mask = self
            .reassembler
            .reassemble(predictions, sample.label.target_shape())
            .map_err(fail(Stage::Reassembly))?;

        self.evaluator
            .evaluate(dataset, &mask, &sample.label)
            .map_err(fail(Stage::Evaluation))?;

        log::info!("Evaluated volume '{}' ({dataset})", sample.id);
        Ok(())
    }

    /// Evaluates every sample of a dataset, then reports and resets its metrics.
    ///
    /// Failed volumes are skipped when `skip_failed_volumes` is set. Otherwise the first
    /// failure aborts the dataset, discarding its partial metrics, and nothing is reported.
    pub fn run_dataset<I, S>(
        &mut self,
        dataset: DatasetIdentity,
        samples: I,
        sink: &mut S,
    ) -> Result<DatasetSummary, VolumeError>
    where
        I: IntoIterator<Item = VolumeSample<B>>,
        S: ReportSink + ?Sized,
    {
        log::info!("Evaluating dataset {dataset} ({} regime)", dataset.regime());

        let mut evaluated = 0;
        let mut skipped = Vec::new();

        for sample in samples {
            match self.evaluate_volume(dataset, &sample) {
                Ok(()) => evaluated += 1,
                Err(err) if self.config.skip_failed_volumes => {
                    log::warn!("Skipping volume: {err}");
                    skipped.push(err);
                }
                Err(err) => {
                    log::error!("Aborting dataset {dataset}: {err}");
                    self.evaluator.finish(dataset);
                    return Err(err);
                }
            }
        }

        let report = self.evaluator.finish(dataset);
        sink.report(dataset, &report);

        if !skipped.is_empty() {
            log::warn!(
                "Dataset {dataset}: {} of {} volumes skipped",
                skipped.len(),
                evaluated + skipped.len()
            );
        }

        Ok(DatasetSummary {
            dataset,
            report,
            evaluated,
            skipped,
        })
    }
}
