use std::collections::BTreeMap;

use burn::prelude::Backend;

use crate::dataset::DatasetIdentity;
use crate::error::EvalError;
use crate::metrics::{BinaryMask, MetricAccumulator};
use crate::report::MetricReport;
use crate::volume::{LabelVolume, MaskVolume};

/// Scores predictions with the metric family of the dataset they belong to.
///
/// Each dataset gets its own accumulator, created by the first volume of that dataset
/// and dropped by [`finish`](Self::finish), so datasets never see each other's volumes.
#[derive(Default)]
pub struct DatasetAwareEvaluator {
    accumulators: BTreeMap<DatasetIdentity, Box<dyn MetricAccumulator>>,
}

impl DatasetAwareEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates one volume for `dataset`.
    ///
    /// The prediction and the label must have exactly the same shape; nothing is
    /// accumulated otherwise.
    pub fn evaluate<B: Backend>(
        &mut self,
        dataset: DatasetIdentity,
        predicted: &MaskVolume<B>,
        label: &LabelVolume<B>,
    ) -> Result<(), EvalError> {
        let predicted_dims = predicted.dims();
        let label_dims = label.dims();
        if predicted_dims != label_dims {
            return Err(EvalError::ShapeMismatch {
                predicted: predicted_dims,
                label: label_dims,
            });
        }

        let predicted = BinaryMask::from_tensor(predicted.tensor().clone())?;
        let label = BinaryMask::from_tensor(label.tensor().clone())?;

        self.accumulators
            .entry(dataset)
            .or_insert_with(|| dataset.regime().accumulator())
            .update(&predicted, &label);
        Ok(())
    }

    /// Same as [`evaluate`](Self::evaluate) for a dataset given by its tag.
    pub fn evaluate_tagged<B: Backend>(
        &mut self,
        tag: &str,
        predicted: &MaskVolume<B>,
        label: &LabelVolume<B>,
    ) -> Result<(), EvalError> {
        let dataset = DatasetIdentity::parse(tag)?;
        self.evaluate(dataset, predicted, label)
    }

    /// Volumes accumulated for `dataset` since it was last finished.
    pub fn volumes(&self, dataset: DatasetIdentity) -> usize {
        self.accumulators
            .get(&dataset)
            .map_or(0, |accumulator| accumulator.volumes())
    }

    /// Reports `dataset` and resets its accumulator.
    pub fn finish(&mut self, dataset: DatasetIdentity) -> MetricReport {
        let accumulator = self
            .accumulators
            .remove(&dataset)
            .unwrap_or_else(|| dataset.regime().accumulator());
        accumulator.report()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::prelude::*;

    type TestBackend = NdArray;

    /// A `[depth, 1, 1, 1]` volume with one voxel per slice.
    fn column(values: &[u8]) -> Tensor<TestBackend, 4> {
        let device = Default::default();
        let values: Vec<f32> = values.iter().map(|v| *v as f32).collect();
        let depth = values.len();
        Tensor::from_data(TensorData::new(values, [depth, 1, 1, 1]), &device)
    }

    fn mask(values: &[u8]) -> MaskVolume<TestBackend> {
        MaskVolume::new(column(values))
    }

    fn label(values: &[u8]) -> LabelVolume<TestBackend> {
        LabelVolume::new(column(values)).unwrap()
    }

    #[test]
    fn perfect_rider_prediction_scores_one() {
        let mut evaluator = DatasetAwareEvaluator::new();

        evaluator
            .evaluate(DatasetIdentity::Rider, &mask(&[0, 1, 1]), &label(&[0, 1, 1]))
            .unwrap();
        let report = evaluator.finish(DatasetIdentity::Rider);

        assert_eq!(report.get("dice"), Some(1.0));
        assert_eq!(report.get("iou"), Some(1.0));
        assert_eq!(report.get("sensitivity"), Some(1.0));
    }

    #[test]
    fn duke_uses_slice_presence() {
        let mut evaluator = DatasetAwareEvaluator::new();

        evaluator
            .evaluate(
                DatasetIdentity::Duke,
                &mask(&[0, 1, 0, 0, 1]),
                &label(&[0, 1, 1, 0, 1]),
            )
            .unwrap();
        let report = evaluator.finish(DatasetIdentity::Duke);

        assert!((report.get("accuracy").unwrap() - 0.8).abs() < 1e-12);
        assert!((report.get("precision").unwrap() - 1.0).abs() < 1e-12);
        assert!((report.get("recall").unwrap() - 2.0 / 3.0).abs() < 1e-12);
        assert!((report.get("f1").unwrap() - 0.8).abs() < 1e-12);
        assert_eq!(report.get("dice"), None);
    }

    #[test]
    fn shape_mismatch_is_rejected_without_accumulating() {
        let mut evaluator = DatasetAwareEvaluator::new();

        let err = evaluator
            .evaluate(DatasetIdentity::Rider, &mask(&[1, 1]), &label(&[1, 1, 1]))
            .unwrap_err();

        assert!(matches!(
            err,
            EvalError::ShapeMismatch {
                predicted: [2, 1, 1, 1],
                label: [3, 1, 1, 1]
            }
        ));
        assert_eq!(evaluator.volumes(DatasetIdentity::Rider), 0);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let mut evaluator = DatasetAwareEvaluator::new();

        let err = evaluator
            .evaluate_tagged("BRATS", &mask(&[1]), &label(&[1]))
            .unwrap_err();

        assert!(matches!(err, EvalError::UnknownDatasetIdentity(_)));
    }

    #[test]
    fn finishing_a_dataset_resets_its_count() {
        let mut evaluator = DatasetAwareEvaluator::new();
        evaluator
            .evaluate(DatasetIdentity::Rider, &mask(&[1, 0]), &label(&[1, 0]))
            .unwrap();
        evaluator
            .evaluate(DatasetIdentity::Rider, &mask(&[0, 0]), &label(&[1, 0]))
            .unwrap();
        assert_eq!(evaluator.volumes(DatasetIdentity::Rider), 2);

        let rider = evaluator.finish(DatasetIdentity::Rider);
        assert_eq!(rider.get("volumes"), Some(2.0));
        assert_eq!(evaluator.volumes(DatasetIdentity::Rider), 0);

        evaluator
            .evaluate_tagged("DUKE", &mask(&[1, 1]), &label(&[1, 1]))
            .unwrap();
        let duke = evaluator.finish(DatasetIdentity::Duke);
        assert_eq!(duke.get("volumes"), Some(1.0));
        assert_eq!(duke.get("accuracy"), Some(1.0));

        evaluator
            .evaluate(DatasetIdentity::Rider, &mask(&[1, 0]), &label(&[1, 0]))
            .unwrap();
        let rider_again = evaluator.finish(DatasetIdentity::Rider);
        assert_eq!(rider_again.get("volumes"), Some(1.0));
        assert_eq!(rider_again.get("dice"), Some(1.0));
    }

    #[test]
    fn finishing_an_untouched_dataset_reports_empty_regime() {
        let report = DatasetAwareEvaluator::new().finish(DatasetIdentity::Duke);

        assert_eq!(report.get("volumes"), Some(0.0));
        assert_eq!(report.get("f1"), Some(0.0));
    }
}
