use super::{BinaryMask, MetricAccumulator};
use crate::report::MetricReport;

/// Per-slice presence/absence classification scores of a single volume.
///
/// Zero-division follows the usual classification-report convention: precision is `0`
/// when no slice is predicted positive, recall is `0` when no slice is truly positive,
/// and F1 is `0` when both are empty.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassificationScores {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl ClassificationScores {
    /// Compares two equally long binary sequences, `actual` being the ground truth.
    pub fn compute(actual: &[bool], predicted: &[bool]) -> Self {
        debug_assert_eq!(actual.len(), predicted.len());

        let mut tp = 0usize;
        let mut fp = 0usize;
        let mut fn_ = 0usize;
        let mut correct = 0usize;
        for (a, p) in actual.iter().zip(predicted) {
            match (*a, *p) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
                (false, false) => {}
            }
            correct += (a == p) as usize;
        }

        Self {
            accuracy: ratio(correct, actual.len()),
            precision: ratio(tp, tp + fp),
            recall: ratio(tp, tp + fn_),
            f1: ratio(2 * tp, 2 * tp + fp + fn_),
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Per-volume classification scores, averaged when the dataset is reported.
#[derive(Clone, Debug, Default)]
pub struct PresenceAccumulator {
    accuracies: Vec<f64>,
    precisions: Vec<f64>,
    recalls: Vec<f64>,
    f1s: Vec<f64>,
}

impl MetricAccumulator for PresenceAccumulator {
    fn update(&mut self, predicted: &BinaryMask, label: &BinaryMask) {
        let scores =
            ClassificationScores::compute(&label.slice_presence(), &predicted.slice_presence());
        log::debug!(
            "Presence scores: accuracy {:.4}, precision {:.4}, recall {:.4}, f1 {:.4}",
            scores.accuracy,
            scores.precision,
            scores.recall,
            scores.f1
        );
        self.accuracies.push(scores.accuracy);
        self.precisions.push(scores.precision);
        self.recalls.push(scores.recall);
        self.f1s.push(scores.f1);
    }

    fn volumes(&self) -> usize {
        self.accuracies.len()
    }

    fn report(&self) -> MetricReport {
        let mut report = MetricReport::default();
        report.insert("accuracy", mean(&self.accuracies));
        report.insert("precision", mean(&self.precisions));
        report.insert("recall", mean(&self.recalls));
        report.insert("f1", mean(&self.f1s));
        report.insert("volumes", self.volumes() as f64);
        report
    }
}
