// ============================================================
// Layer 5b — Threshold Calibrator
// ============================================================
// Sweeps candidate decision thresholds over held-out
// probability scores and picks the operating point that
// maximizes positive-class F1.
//
// Sweep rules:
//   - candidates are visited in ascending order
//   - predict 1 iff probability >= t
//   - a candidate replaces the incumbent only if its F1 is
//     STRICTLY greater — ties keep the first (lowest) threshold
//   - a candidate with zero predicted or zero true positives
//     scores F1 = 0 and is simply out-competed, never an error
//
// The selected threshold is persisted alongside the checkpoint
// and applied at prediction time instead of the naive 0.5.

use crate::domain::error::{PipelineError, PipelineResult};
use crate::eval::metrics::report;

/// Result of a calibration sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationResult {
    pub threshold: f64,
    pub f1:        f64,
}

/// The standard candidate grid: 0.05, 0.10, ..., 0.95.
pub fn default_threshold_grid() -> Vec<f64> {
    (1..20).map(|i| i as f64 * 0.05).collect()
}

/// Sweep `thresholds` in ascending order and return the one with
/// the highest positive-class F1 over (probabilities, labels).
///
/// `thresholds` must be sorted ascending by the caller (the
/// first-wins tie rule is stated in terms of the lowest
/// threshold). Fails with LengthMismatch if probabilities and
/// labels do not align 1:1; an empty candidate list yields the
/// argmax fallback of 0.5 with F1 0.
pub fn calibrate(
    probabilities: &[f64],
    labels:        &[usize],
    thresholds:    &[f64],
) -> PipelineResult<CalibrationResult> {
    if probabilities.len() != labels.len() {
        return Err(PipelineError::LengthMismatch {
            texts:  probabilities.len(),
            labels: labels.len(),
        });
    }

    let mut best: Option<CalibrationResult> = None;

    for &t in thresholds {
        let f1 = report(probabilities, labels, t)?.f1;

        // Strictly greater — ties keep the earliest candidate
        match best {
            Some(b) if f1 <= b.f1 => {}
            _ => best = Some(CalibrationResult { threshold: t, f1 }),
        }
    }

    let best = best.unwrap_or(CalibrationResult { threshold: 0.5, f1: 0.0 });

    tracing::info!(
        "Calibrated threshold {:.3} (positive-class F1 {:.4}) over {} candidates",
        best.threshold,
        best.f1,
        thresholds.len(),
    );

    Ok(best)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::metrics::report;

    #[test]
    fn test_default_grid_bounds() {
        let grid = default_threshold_grid();
        assert_eq!(grid.len(), 19);
        assert!((grid[0] - 0.05).abs() < 1e-9);
        assert!((grid[18] - 0.95).abs() < 1e-9);
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_endpoint_thresholds() {
        let probs  = [0.1, 0.6, 0.9, 0.05];
        let labels = [0, 1, 1, 0];

        // t = 0.0 predicts all-positive → recall 1
        let r = report(&probs, &labels, 0.0).unwrap();
        assert_eq!(r.recall, 1.0);
        assert_eq!(r.precision, 0.5);

        // t above the max probability predicts all-negative
        let r = report(&probs, &labels, 1.0).unwrap();
        assert_eq!(r.recall, 0.0);
        assert_eq!(r.f1, 0.0);
    }

    #[test]
    fn test_recall_monotonically_non_increasing() {
        let probs  = [0.05, 0.2, 0.4, 0.6, 0.8, 0.95];
        let labels = [0, 1, 0, 1, 1, 1];

        let mut last_recall = f64::INFINITY;
        for t in [0.0, 0.1, 0.3, 0.5, 0.7, 0.9, 1.0] {
            let r = report(&probs, &labels, t).unwrap();
            assert!(r.recall <= last_recall);
            last_recall = r.recall;
        }
    }

    #[test]
    fn test_hand_checked_sweep() {
        // Per-threshold, by hand:
        //   t=0.2: predicts [0,1,1,0] → P=1, R=1, F1=1
        //   t=0.5: predicts [0,1,1,0] → P=1, R=1, F1=1
        //   t=0.8: predicts [0,0,1,0] → P=1, R=0.5, F1=2/3
        let probs  = [0.1, 0.6, 0.9, 0.05];
        let labels = [0, 1, 1, 0];

        assert_eq!(report(&probs, &labels, 0.2).unwrap().f1, 1.0);
        assert_eq!(report(&probs, &labels, 0.5).unwrap().f1, 1.0);
        assert!((report(&probs, &labels, 0.8).unwrap().f1 - 2.0 / 3.0).abs() < 1e-9);

        // 0.2 and 0.5 tie at F1=1 — the first (lowest) wins
        let best = calibrate(&probs, &labels, &[0.2, 0.5, 0.8]).unwrap();
        assert_eq!(best.threshold, 0.2);
        assert_eq!(best.f1, 1.0);
    }

    #[test]
    fn test_strictly_greater_replaces() {
        // t=0.3 predicts [1,1,1] → P=2/3, R=1, F1=0.8
        // t=0.6 predicts [0,1,1] → P=1, R=1, F1=1  (better, later)
        let probs  = [0.4, 0.7, 0.9];
        let labels = [0, 1, 1];
        let best = calibrate(&probs, &labels, &[0.3, 0.6]).unwrap();
        assert_eq!(best.threshold, 0.6);
        assert_eq!(best.f1, 1.0);
    }

    #[test]
    fn test_degenerate_candidates_never_abort() {
        // Every candidate above 0.9 predicts nothing positive
        let probs  = [0.1, 0.2, 0.3];
        let labels = [1, 1, 0];
        let best = calibrate(&probs, &labels, &[0.95, 0.99]).unwrap();
        assert_eq!(best.f1, 0.0);
        // First candidate kept on an all-zero sweep
        assert_eq!(best.threshold, 0.95);
    }

    #[test]
    fn test_all_one_class_labels_never_abort() {
        let probs  = [0.9, 0.8];
        let labels = [0, 0];
        let best = calibrate(&probs, &labels, &default_threshold_grid()).unwrap();
        assert_eq!(best.f1, 0.0);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = calibrate(&[0.5, 0.6], &[1], &[0.5]).unwrap_err();
        assert!(matches!(err, PipelineError::LengthMismatch { .. }));
    }
}
