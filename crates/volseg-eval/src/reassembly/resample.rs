use burn::prelude::*;

use crate::volume::TargetShape;

/// Resamples depth, height and width of a `[D, C, H, W]` tensor with trilinear interpolation.
///
/// Sample positions follow the half-pixel convention (no corner alignment), so resampling
/// to the current size is the identity. Trilinear interpolation is separable, so the three
/// spatial axes are interpolated one after the other; the channel axis is untouched.
pub fn resample_trilinear<B: Backend>(tensor: Tensor<B, 4>, target: TargetShape) -> Tensor<B, 4> {
    let tensor = resample_axis(tensor, 0, target.depth);
    let tensor = resample_axis(tensor, 2, target.height);
    resample_axis(tensor, 3, target.width)
}

/// Linear interpolation along a single axis.
///
/// An axis without samples carries no signal and resamples to zeros.
pub fn resample_axis<B: Backend>(tensor: Tensor<B, 4>, axis: usize, size: usize) -> Tensor<B, 4> {
    let input = tensor.dims()[axis];
    if input == size {
        return tensor;
    }

    let device = tensor.device();
    if input == 0 {
        let mut dims = tensor.dims();
        dims[axis] = size;
        return Tensor::zeros(dims, &device);
    }
    let taps = LinearTaps::new(input, size);

    let lower = Tensor::<B, 1, Int>::from_data(TensorData::new(taps.lower, [size]), &device);
    let upper = Tensor::<B, 1, Int>::from_data(TensorData::new(taps.upper, [size]), &device);

    let mut shape = [1; 4];
    shape[axis] = size;
    let upper_weight =
        Tensor::<B, 1>::from_data(TensorData::new(taps.upper_weight, [size]), &device)
            .reshape(Shape::new(shape));
    let lower_weight =
        Tensor::<B, 1>::from_data(TensorData::new(taps.lower_weight, [size]), &device)
            .reshape(Shape::new(shape));

    let below = tensor.clone().select(axis, lower);
    let above = tensor.select(axis, upper);
    below * lower_weight + above * upper_weight
}

/// Source indices and weights for resampling `input` samples to `output` samples.
#[derive(Debug, PartialEq)]
struct LinearTaps {
    lower: Vec<i64>,
    upper: Vec<i64>,
    lower_weight: Vec<f32>,
    upper_weight: Vec<f32>,
}

impl LinearTaps {
    fn new(input: usize, output: usize) -> Self {
        let scale = input as f64 / output as f64;
        let last = input - 1;

        let mut taps = Self {
            lower: Vec::with_capacity(output),
            upper: Vec::with_capacity(output),
            lower_weight: Vec::with_capacity(output),
            upper_weight: Vec::with_capacity(output),
        };

        for position in 0..output {
            // Centre of the output sample mapped back into input coordinates.
            let source = ((position as f64 + 0.5) * scale - 0.5).max(0.0);
            let lower = (source.floor() as usize).min(last);
            let upper = (lower + 1).min(last);
            let fraction = (source - lower as f64) as f32;

            taps.lower.push(lower as i64);
            taps.upper.push(upper as i64);
            taps.lower_weight.push(1.0 - fraction);
            taps.upper_weight.push(fraction);
        }

        taps
    }
}
