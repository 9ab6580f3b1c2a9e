// ============================================================
// Layer 5b — Evaluator
// ============================================================
// Computes classification metrics for the decision rule
// "predict 1 iff probability >= threshold".
//
// All functions here are pure: same inputs → same report,
// nothing mutated, no hidden state. Degenerate situations
// (zero predicted positives, zero true positives) produce a
// metric value of 0, never an error — under heavy imbalance
// they are expected outcomes for bad thresholds, and the
// calibration sweep simply out-competes them.
//
// The "argmax" baseline of a 2-way softmax is exactly the
// 0.5 cutoff on the positive-class probability, so it needs
// no separate code path.

use crate::domain::error::{PipelineError, PipelineResult};

/// The naive argmax operating point on a 2-way softmax.
pub const ARGMAX_THRESHOLD: f64 = 0.5;

/// Confusion counts for the positive class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfusionCounts {
    pub true_positives:  usize,
    pub false_positives: usize,
    pub true_negatives:  usize,
    pub false_negatives: usize,
}

impl ConfusionCounts {
    /// Count outcomes of "predict 1 iff p >= threshold".
    fn tally(probabilities: &[f64], labels: &[usize], threshold: f64) -> Self {
        let mut counts = Self {
            true_positives:  0,
            false_positives: 0,
            true_negatives:  0,
            false_negatives: 0,
        };
        for (&p, &label) in probabilities.iter().zip(labels) {
            let predicted = p >= threshold;
            match (predicted, label == 1) {
                (true, true)   => counts.true_positives += 1,
                (true, false)  => counts.false_positives += 1,
                (false, false) => counts.true_negatives += 1,
                (false, true)  => counts.false_negatives += 1,
            }
        }
        counts
    }

    /// Positive-class precision; 0 when nothing was predicted positive.
    pub fn precision(&self) -> f64 {
        let predicted_positive = self.true_positives + self.false_positives;
        if predicted_positive == 0 {
            return 0.0;
        }
        self.true_positives as f64 / predicted_positive as f64
    }

    /// Positive-class recall; 0 when there are no true positives.
    pub fn recall(&self) -> f64 {
        let actual_positive = self.true_positives + self.false_negatives;
        if actual_positive == 0 {
            return 0.0;
        }
        self.true_positives as f64 / actual_positive as f64
    }

    /// Positive-class F1; 0 when precision + recall is 0.
    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            return 0.0;
        }
        2.0 * p * r / (p + r)
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.true_positives
            + self.false_positives
            + self.true_negatives
            + self.false_negatives;
        if total == 0 {
            return 0.0;
        }
        (self.true_positives + self.true_negatives) as f64 / total as f64
    }
}

/// Full metrics at one operating point.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub threshold: f64,
    pub accuracy:  f64,
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
    /// Number of true positive-class examples
    pub support_positive: usize,
    /// Number of true negative-class examples
    pub support_negative: usize,
}

impl ClassificationReport {
    /// One-line summary for logs and console output.
    pub fn summary(&self) -> String {
        format!(
            "threshold={:.2} acc={:.4} precision={:.4} recall={:.4} f1={:.4} (support: {} pos / {} neg)",
            self.threshold, self.accuracy, self.precision, self.recall, self.f1,
            self.support_positive, self.support_negative,
        )
    }
}

/// Evaluate "predict 1 iff probability >= threshold" over the
/// full score set. Pure function of its arguments.
///
/// Fails with LengthMismatch if probabilities and labels do not
/// align 1:1.
pub fn report(
    probabilities: &[f64],
    labels:        &[usize],
    threshold:     f64,
) -> PipelineResult<ClassificationReport> {
    if probabilities.len() != labels.len() {
        return Err(PipelineError::LengthMismatch {
            texts:  probabilities.len(),
            labels: labels.len(),
        });
    }

    let counts = ConfusionCounts::tally(probabilities, labels, threshold);

    Ok(ClassificationReport {
        threshold,
        accuracy:         counts.accuracy(),
        precision:        counts.precision(),
        recall:           counts.recall(),
        f1:               counts.f1(),
        support_positive: counts.true_positives + counts.false_negatives,
        support_negative: counts.true_negatives + counts.false_positives,
    })
}

/// The argmax comparison baseline: 0.5 on the positive-class
/// softmax probability.
pub fn report_argmax(
    probabilities: &[f64],
    labels:        &[usize],
) -> PipelineResult<ClassificationReport> {
    report(probabilities, labels, ARGMAX_THRESHOLD)
}
