// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Metrics recorded per epoch:
//   - epoch:      the epoch number (1, 2, 3, ...)
//   - train_loss: average weighted cross-entropy on training
//   - val_loss:   average weighted cross-entropy on validation
//   - val_f1:     positive-class F1 on validation at the 0.5
//                 baseline (the calibrated operating point is
//                 chosen after training, not per epoch)
//
// Output file: {checkpoint_dir}/metrics.csv
//
// How to read the metrics:
//   - Loss should decrease each epoch
//   - val_loss rising while train_loss falls → overfitting
//   - val_f1 is the number that matters under 9:1 imbalance;
//     accuracy would look great for a model that predicts
//     all-negative
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

/// One row of metrics data for a single training epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average weighted cross-entropy over all training batches
    pub train_loss: f64,

    /// Average weighted cross-entropy on the validation set
    pub val_loss: f64,

    /// Positive-class F1 on validation at threshold 0.5
    pub val_f1: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, val_loss: f64, val_f1: f64) -> Self {
        Self { epoch, train_loss, val_loss, val_f1 }
    }

    /// True if this epoch improved over the previous best val_loss.
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }
}

/// Appends epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a logger, writing the CSV header if the file does
    /// not exist yet (appending across runs is allowed).
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,val_loss,val_f1")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new CSV row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        writeln!(
            f,
            "{},{:.6},{:.6},{:.6}",
            m.epoch, m.train_loss, m.val_loss, m.val_f1,
        )?;

        tracing::debug!(
            "Logged epoch {}: train_loss={:.4}, val_loss={:.4}, val_f1={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
            m.val_f1,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_improvement() {
        let m = EpochMetrics::new(2, 2.5, 2.3, 0.4);
        assert!(m.is_improvement(3.0));
        assert!(!m.is_improvement(2.0));
    }

    #[test]
    fn test_writes_header_and_rows() {
        let dir = std::env::temp_dir().join(format!(
            "qtl_screener_metrics_{}",
            std::process::id(),
        ));
        let logger = MetricsLogger::new(dir.display().to_string()).unwrap();
        logger.log(&EpochMetrics::new(1, 0.9, 0.8, 0.42)).unwrap();

        let content = std::fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "epoch,train_loss,val_loss,val_f1");
        assert!(lines[1].starts_with("1,0.9"));
        std::fs::remove_dir_all(dir).ok();
    }
}
