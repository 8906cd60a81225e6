//! Metric families and their per-dataset accumulators.
//!
//! Scoring happens on host-side [`BinaryMask`]s so counts are exact regardless of the
//! backend's float precision.
mod overlap;
mod presence;

pub use overlap::*;
pub use presence::*;

use burn::prelude::*;

use crate::dataset::EvaluationRegime;
use crate::error::EvalError;
use crate::report::MetricReport;

/// Foreground voxels of a `[depth, channels, height, width]` volume, on the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryMask {
    depth: usize,
    voxels: Vec<bool>,
}

impl BinaryMask {
    /// Marks every voxel strictly greater than zero as foreground.
    pub fn from_tensor<B: Backend>(tensor: Tensor<B, 4>) -> Result<Self, EvalError> {
        let depth = tensor.dims()[0];
        let values = tensor
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| EvalError::Data(format!("{e:?}")))?;
        Ok(Self {
            depth,
            voxels: values.into_iter().map(|v| v > 0.0).collect(),
        })
    }

    /// Builds a mask from a flat voxel buffer split evenly over `depth` slices.
    pub fn from_voxels(depth: usize, voxels: Vec<bool>) -> Self {
        debug_assert!(depth == 0 || voxels.len() % depth == 0);
        Self { depth, voxels }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn voxels(&self) -> &[bool] {
        &self.voxels
    }

    pub fn count(&self) -> usize {
        self.voxels.iter().filter(|v| **v).count()
    }

    /// Whether each depth slice contains at least one foreground voxel.
    pub fn slice_presence(&self) -> Vec<bool> {
        if self.depth == 0 {
            return Vec::new();
        }
        let slice_len = self.voxels.len() / self.depth;
        if slice_len == 0 {
            return vec![false; self.depth];
        }
        self.voxels
            .chunks(slice_len)
            .map(|slice| slice.iter().any(|v| *v))
            .collect()
    }
}

/// Running aggregation of one metric family over the volumes of a single dataset.
pub trait MetricAccumulator: Send {
    /// Scores one volume. Both masks have the same shape.
    fn update(&mut self, predicted: &BinaryMask, label: &BinaryMask);

    /// Number of volumes scored so far.
    fn volumes(&self) -> usize;

    /// Summary over every volume scored so far.
    fn report(&self) -> MetricReport;
}

impl EvaluationRegime {
    /// A fresh, empty accumulator for this regime.
    pub fn accumulator(self) -> Box<dyn MetricAccumulator> {
        match self {
            EvaluationRegime::Overlap => Box::new(OverlapAccumulator::default()),
            EvaluationRegime::PresenceAbsence => Box::new(PresenceAccumulator::default()),
        }
    }
}
