// ============================================================
// Layer 2 — CalibrateUseCase
// ============================================================
// Re-runs the threshold sweep over the validation scores a
// training run left behind, without retraining. Useful when
// the operating point should favour a different grid (e.g. a
// finer step around the current threshold) or after deciding
// the recall/precision trade-off differently.
//
// The sweep itself is the pure function in eval::threshold;
// this use case only wires saved scores in and the chosen
// threshold out.

use anyhow::{bail, Result};

use crate::eval::metrics::report;
use crate::eval::threshold::{calibrate, default_threshold_grid};
use crate::infra::checkpoint::CheckpointManager;

pub struct CalibrateUseCase {
    checkpoint_dir: String,
    /// Custom ascending grid; None uses the standard 0.05..0.95
    grid:           Option<Vec<f64>>,
}

impl CalibrateUseCase {
    pub fn new(checkpoint_dir: impl Into<String>, grid: Option<Vec<f64>>) -> Self {
        Self { checkpoint_dir: checkpoint_dir.into(), grid }
    }

    /// Build an ascending grid from start/end/step flags.
    pub fn grid_from_range(start: f64, end: f64, step: f64) -> Result<Vec<f64>> {
        if step <= 0.0 {
            bail!("Threshold step must be positive, got {step}");
        }
        if start > end {
            bail!("Threshold range start {start} exceeds end {end}");
        }
        let mut grid = Vec::new();
        let mut t = start;
        while t <= end + 1e-12 {
            grid.push(t);
            t += step;
        }
        Ok(grid)
    }

    pub fn execute(&self) -> Result<()> {
        let ckpt_manager = CheckpointManager::new(&self.checkpoint_dir)?;
        let (probabilities, labels) = ckpt_manager.load_validation_scores()?;
        if probabilities.is_empty() {
            bail!("Saved validation scores are empty — retrain first");
        }

        let grid = match &self.grid {
            Some(g) => g.clone(),
            None => default_threshold_grid(),
        };

        let best = calibrate(&probabilities, &labels, &grid)?;
        let at_best = report(&probabilities, &labels, best.threshold)?;
        println!("Calibrated operating: {}", at_best.summary());

        ckpt_manager.save_threshold(best.threshold)?;
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_from_range() {
        let grid = CalibrateUseCase::grid_from_range(0.1, 0.5, 0.2).unwrap();
        assert_eq!(grid.len(), 3);
        assert!((grid[0] - 0.1).abs() < 1e-9);
        assert!((grid[2] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_grid_rejects_bad_step() {
        assert!(CalibrateUseCase::grid_from_range(0.1, 0.5, 0.0).is_err());
        assert!(CalibrateUseCase::grid_from_range(0.5, 0.1, 0.1).is_err());
    }
}
