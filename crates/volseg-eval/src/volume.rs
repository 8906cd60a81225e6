use burn::prelude::*;
use derive_new::new;

use crate::error::EvalError;

/// Depth, height and width a reassembled prediction must be resampled to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, new)]
pub struct TargetShape {
    pub depth: usize,
    pub height: usize,
    pub width: usize,
}

/// An ordered stack of equally shaped 2D slices, laid out as `[depth, channels, height, width]`.
#[derive(Clone, Debug)]
pub struct Volume<B: Backend> {
    tensor: Tensor<B, 4>,
}

impl<B: Backend> Volume<B> {
    /// Wraps a depth-first tensor. A volume without slices is rejected.
    pub fn new(tensor: Tensor<B, 4>) -> Result<Self, EvalError> {
        if tensor.dims()[0] == 0 {
            return Err(EvalError::EmptyVolume);
        }
        Ok(Self { tensor })
    }

    pub fn depth(&self) -> usize {
        self.tensor.dims()[0]
    }

    pub fn channels(&self) -> usize {
        self.tensor.dims()[1]
    }

    pub fn dims(&self) -> [usize; 4] {
        self.tensor.dims()
    }

    pub fn tensor(&self) -> &Tensor<B, 4> {
        &self.tensor
    }

    pub fn into_tensor(self) -> Tensor<B, 4> {
        self.tensor
    }
}

/// Ground-truth segmentation, laid out as `[depth, 1, height, width]`.
///
/// The label is authoritative for the shape predictions are resampled to and is never mutated.
#[derive(Clone, Debug)]
pub struct LabelVolume<B: Backend> {
    tensor: Tensor<B, 4>,
}

impl<B: Backend> LabelVolume<B> {
    /// Wraps a single-channel depth-first tensor.
    pub fn new(tensor: Tensor<B, 4>) -> Result<Self, EvalError> {
        let [depth, channels, _, _] = tensor.dims();
        if depth == 0 {
            return Err(EvalError::EmptyVolume);
        }
        if channels != 1 {
            return Err(EvalError::LabelChannels(channels));
        }
        Ok(Self { tensor })
    }

    pub fn dims(&self) -> [usize; 4] {
        self.tensor.dims()
    }

    pub fn target_shape(&self) -> TargetShape {
        let [depth, _, height, width] = self.tensor.dims();
        TargetShape::new(depth, height, width)
    }

    pub fn tensor(&self) -> &Tensor<B, 4> {
        &self.tensor
    }
}

/// Binary prediction mask produced by reassembly, laid out as `[depth, 1, height, width]`.
#[derive(Clone, Debug)]
pub struct MaskVolume<B: Backend> {
    tensor: Tensor<B, 4>,
}

impl<B: Backend> MaskVolume<B> {
    pub(crate) fn new(tensor: Tensor<B, 4>) -> Self {
        Self { tensor }
    }

    pub fn dims(&self) -> [usize; 4] {
        self.tensor.dims()
    }

    pub fn tensor(&self) -> &Tensor<B, 4> {
        &self.tensor
    }

    pub fn into_tensor(self) -> Tensor<B, 4> {
        self.tensor
    }
}

/// One image volume and its co-registered label, as handed over by a loader.
#[derive(Clone, Debug, new)]
pub struct VolumeSample<B: Backend> {
    #[new(into)]
    pub id: String,
    pub image: Volume<B>,
    pub label: LabelVolume<B>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn empty_volume_is_rejected() {
        let device = Default::default();
        let tensor = Tensor::<TestBackend, 4>::zeros([0, 1, 4, 4], &device);

        assert!(matches!(
            Volume::new(tensor.clone()),
            Err(EvalError::EmptyVolume)
        ));
        assert!(matches!(
            LabelVolume::new(tensor),
            Err(EvalError::EmptyVolume)
        ));
    }

    #[test]
    fn multi_channel_label_is_rejected() {
        let device = Default::default();
        let tensor = Tensor::<TestBackend, 4>::zeros([3, 2, 4, 4], &device);

        assert!(matches!(
            LabelVolume::new(tensor),
            Err(EvalError::LabelChannels(2))
        ));
    }

    #[test]
    fn label_exposes_target_shape() {
        let device = Default::default();
        let label =
            LabelVolume::new(Tensor::<TestBackend, 4>::zeros([7, 1, 5, 6], &device)).unwrap();

        assert_eq!(label.target_shape(), TargetShape::new(7, 5, 6));
    }
}
