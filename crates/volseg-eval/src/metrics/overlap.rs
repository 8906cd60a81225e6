use super::{BinaryMask, MetricAccumulator};
use crate::report::MetricReport;

/// Voxel overlap between a predicted mask and its label, treating the volume as one sample.
///
/// Every score is `NaN` when the label has no foreground, since none of them is defined then.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlapScores {
    pub dice: f64,
    pub iou: f64,
    pub sensitivity: f64,
}

impl OverlapScores {
    pub fn compute(predicted: &BinaryMask, label: &BinaryMask) -> Self {
        let mut true_positives = 0usize;
        let mut predicted_count = 0usize;
        let mut label_count = 0usize;
        for (p, l) in predicted.voxels().iter().zip(label.voxels()) {
            predicted_count += *p as usize;
            label_count += *l as usize;
            true_positives += (*p && *l) as usize;
        }
        Self::from_counts(true_positives, predicted_count, label_count)
    }

    pub fn from_counts(true_positives: usize, predicted: usize, label: usize) -> Self {
        if label == 0 {
            return Self {
                dice: f64::NAN,
                iou: f64::NAN,
                sensitivity: f64::NAN,
            };
        }

        let tp = true_positives as f64;
        let predicted = predicted as f64;
        let label = label as f64;
        Self {
            dice: 2.0 * tp / (predicted + label),
            iou: tp / (predicted + label - tp),
            sensitivity: tp / label,
        }
    }
}

/// Mean of the defined (non-NaN) values seen so far.
#[derive(Clone, Copy, Debug, Default)]
struct RunningMean {
    sum: f64,
    count: usize,
}

impl RunningMean {
    fn push(&mut self, value: f64) {
        if !value.is_nan() {
            self.sum += value;
            self.count += 1;
        }
    }

    /// `0.0` when no defined value was seen.
    fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Running means of Dice, IoU and sensitivity.
#[derive(Clone, Debug, Default)]
pub struct OverlapAccumulator {
    volumes: usize,
    dice: RunningMean,
    iou: RunningMean,
    sensitivity: RunningMean,
}

impl MetricAccumulator for OverlapAccumulator {
    fn update(&mut self, predicted: &BinaryMask, label: &BinaryMask) {
        let scores = OverlapScores::compute(predicted, label);
        log::debug!(
            "Overlap scores: dice {:.4}, iou {:.4}, sensitivity {:.4}",
            scores.dice,
            scores.iou,
            scores.sensitivity
        );
        self.volumes += 1;
        self.dice.push(scores.dice);
        self.iou.push(scores.iou);
        self.sensitivity.push(scores.sensitivity);
    }

    fn volumes(&self) -> usize {
        self.volumes
    }

    fn report(&self) -> MetricReport {
        let mut report = MetricReport::default();
        report.insert("dice", self.dice.mean());
        report.insert("iou", self.iou.mean());
        report.insert("sensitivity", self.sensitivity.mean());
        report.insert("volumes", self.volumes as f64);
        report
    }
}
