use crate::batcher::SliceContextBatcher;
use crate::error::EvalError;
use crate::inference::{InferenceExecutor, SlicePredictor};
use crate::volume::Volume;
use burn::backend::NdArray;
use burn::prelude::*;
use std::cell::Cell;

type TestBackend = NdArray;
type Device = <TestBackend as Backend>::Device;

/// Slice `k` holds the value `k` everywhere.
fn ramp_volume(depth: usize) -> Volume<TestBackend> {
    let device = Device::default();
    let values: Vec<f32> = (0..depth)
        .flat_map(|k| std::iter::repeat_n(k as f32, 4))
        .collect();
    Volume::new(Tensor::from_data(
        TensorData::new(values, [depth, 1, 2, 2]),
        &device,
    ))
    .unwrap()
}

/// Returns the centre (`self`) channel of each context slice.
fn centre_channel(batch: Tensor<TestBackend, 4>) -> anyhow::Result<Tensor<TestBackend, 4>> {
    Ok(batch.narrow(1, 1, 1))
}

struct FailingOnCall {
    fail_on: usize,
    calls: Cell<usize>,
}

impl SlicePredictor<TestBackend> for FailingOnCall {
    fn predict(&self, batch: Tensor<TestBackend, 4>) -> anyhow::Result<Tensor<TestBackend, 4>> {
        let call = self.calls.get();
        self.calls.set(call + 1);
        if call == self.fail_on {
            anyhow::bail!("out of device memory");
        }
        Ok(batch)
    }
}

#[test]
fn test_predictions_keep_slice_order() {
    let volume = ramp_volume(10);
    let batcher = SliceContextBatcher::new(4).unwrap();
    let executor = InferenceExecutor::<TestBackend>::new(Device::default());

    let predictions = executor
        .run(&centre_channel, batcher.batches(&volume))
        .unwrap();

    assert_eq!(predictions.slices(), 10);
    let starts: Vec<usize> = predictions.batches().iter().map(|b| b.start).collect();
    assert_eq!(starts, vec![0, 4, 8]);

    let values: Vec<f32> = predictions
        .into_batches()
        .into_iter()
        .flat_map(|batch| batch.data.to_vec::<f32>().unwrap())
        .step_by(4)
        .collect();
    let expected: Vec<f32> = (0..10).map(|k| k as f32).collect();
    assert_eq!(values, expected);
}

#[test]
fn test_predictor_failure_reports_batch_start() {
    let volume = ramp_volume(10);
    let batcher = SliceContextBatcher::new(4).unwrap();
    let executor = InferenceExecutor::<TestBackend>::new(Device::default());
    let predictor = FailingOnCall {
        fail_on: 1,
        calls: Cell::new(0),
    };

    let result = executor.run(&predictor, batcher.batches(&volume));

    match result {
        Err(EvalError::PredictorFailure { start, source }) => {
            assert_eq!(start, 4);
            assert!(source.to_string().contains("out of device memory"));
        }
        other => panic!("Unexpected result: {other:?}"),
    }
    assert_eq!(predictor.calls.get(), 2, "no batch may run after a failure");
}

#[test]
fn test_wrong_slice_count_is_a_predictor_failure() {
    let volume = ramp_volume(5);
    let batcher = SliceContextBatcher::new(5).unwrap();
    let executor = InferenceExecutor::<TestBackend>::new(Device::default());
    let truncating =
        |batch: Tensor<TestBackend, 4>| -> anyhow::Result<Tensor<TestBackend, 4>> {
            Ok(batch.narrow(0, 0, 1))
        };

    let result = executor.run(&truncating, batcher.batches(&volume));

    assert!(matches!(
        result,
        Err(EvalError::PredictorFailure { start: 0, .. })
    ));
}

#[test]
fn test_changing_output_shape_is_a_predictor_failure() {
    let volume = ramp_volume(4);
    let batcher = SliceContextBatcher::new(2).unwrap();
    let executor = InferenceExecutor::<TestBackend>::new(Device::default());
    let calls = Cell::new(0);
    let unstable = |batch: Tensor<TestBackend, 4>| -> anyhow::Result<Tensor<TestBackend, 4>> {
        calls.set(calls.get() + 1);
        let channels = calls.get();
        Ok(batch.narrow(1, 0, channels))
    };

    let result = executor.run(&unstable, batcher.batches(&volume));

    assert!(matches!(
        result,
        Err(EvalError::PredictorFailure { start: 2, .. })
    ));
}

#[test]
fn test_empty_prediction_axis_is_a_predictor_failure() {
    let volume = ramp_volume(6);
    let batcher = SliceContextBatcher::new(3).unwrap();
    let executor = InferenceExecutor::<TestBackend>::new(Device::default());

    for empty_axis in 1..4 {
        let collapsing =
            |batch: Tensor<TestBackend, 4>| -> anyhow::Result<Tensor<TestBackend, 4>> {
                let mut dims = batch.dims();
                dims[1] = 1;
                dims[empty_axis] = 0;
                Ok(Tensor::zeros(dims, &batch.device()))
            };

        let result = executor.run(&collapsing, batcher.batches(&volume));

        match result {
            Err(EvalError::PredictorFailure { start, source }) => {
                assert_eq!(start, 0);
                assert!(source.to_string().contains("empty axis"), "{source}");
            }
            other => panic!("axis {empty_axis}: unexpected result {other:?}"),
        }
    }
}
