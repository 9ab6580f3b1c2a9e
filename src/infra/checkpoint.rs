// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model state using Burn's CompactRecorder.
//
// What lives in the checkpoint directory:
//   model_epoch_{n}.mpk.gz — classifier weights after epoch n
//   latest_epoch.json      — which epoch was last saved
//   train_config.json      — architecture + hyperparameters
//   threshold.json         — the calibrated decision threshold
//   val_scores.csv         — held-out (probability, label) rows
//                            so calibration can be re-run
//                            without retraining
//
// Why save the config separately?
//   Inference must rebuild the exact model architecture before
//   it can load weights into it; CompactRecorder is type-safe
//   and refuses mismatched records.
//
// The pretrained-encoder boundary:
//   load_encoder() loads an ENCODER-ONLY record (a named
//   artifact produced by a pretraining run) into a freshly
//   built encoder. The fusion head is never part of any such
//   artifact — its input dimension (H + D) is checkpoint-
//   incompatible, so it always keeps its fresh random init.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};
use std::{fs, path::PathBuf};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::{HybridClassifier, TextEncoder};

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a manager; the directory is created if missing.
    /// A directory that cannot be created fails here, at
    /// construction, rather than at the first save.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir).with_context(|| {
            format!("Cannot create checkpoint directory '{}'", dir.display())
        })?;
        Ok(Self { dir })
    }

    /// Save classifier weights for a given epoch and advance the
    /// latest-epoch pointer.
    pub fn save_model<B: AutodiffBackend>(
        &self,
        model: &HybridClassifier<B>,
        epoch: usize,
    ) -> Result<()> {
        let path = self.dir.join(format!("model_epoch_{epoch}"));

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        let latest_path = self.dir.join("latest_epoch.json");
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| "Failed to write latest_epoch.json")?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load classifier weights from the latest saved checkpoint
    /// into a model of matching architecture.
    pub fn load_model<B: Backend>(
        &self,
        model:  HybridClassifier<B>,
        device: &B::Device,
    ) -> Result<HybridClassifier<B>> {
        let epoch = self.latest_epoch()?;
        let path  = self.dir.join(format!("model_epoch_{epoch}"));

        tracing::info!("Loading checkpoint from epoch {}", epoch);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display()
                )
            })?;

        Ok(model.load_record(record))
    }

    /// Load a named pretrained ENCODER record into a freshly
    /// built encoder. The classifier's fusion head is untouched.
    pub fn load_encoder<B: Backend>(
        &self,
        encoder: TextEncoder<B>,
        name:    &str,
        device:  &B::Device,
    ) -> Result<TextEncoder<B>> {
        let path = self.dir.join(name);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load pretrained encoder '{}'", path.display())
            })?;

        Ok(encoder.load_record(record))
    }

    /// Save the training configuration. Must run before training
    /// so inference can always rebuild the architecture.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Make sure you have run 'train' before 'predict'.",
                path.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Persist the calibrated decision threshold.
    pub fn save_threshold(&self, threshold: f64) -> Result<()> {
        let path = self.dir.join("threshold.json");
        fs::write(&path, serde_json::to_string(&threshold)?)
            .with_context(|| format!("Cannot write threshold to '{}'", path.display()))?;

        tracing::info!("Saved decision threshold {:.3}", threshold);
        Ok(())
    }

    /// The calibrated threshold, or None if calibration has not
    /// been run (callers fall back to the 0.5 argmax baseline).
    pub fn load_threshold(&self) -> Result<Option<f64>> {
        let path = self.dir.join("threshold.json");
        if !path.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read threshold from '{}'", path.display()))?;
        Ok(Some(serde_json::from_str::<f64>(&s)?))
    }

    /// Persist held-out scores so calibration can be re-run
    /// without retraining.
    pub fn save_validation_scores(
        &self,
        probabilities: &[f64],
        labels:        &[usize],
    ) -> Result<()> {
        let path = self.dir.join("val_scores.csv");
        let mut rows = String::from("probability,label\n");
        for (p, l) in probabilities.iter().zip(labels) {
            rows.push_str(&format!("{p:.6},{l}\n"));
        }
        fs::write(&path, rows)
            .with_context(|| format!("Cannot write scores to '{}'", path.display()))?;

        tracing::debug!("Saved {} validation scores", probabilities.len());
        Ok(())
    }

    /// Read back (probabilities, labels) saved by a training run.
    pub fn load_validation_scores(&self) -> Result<(Vec<f64>, Vec<usize>)> {
        let path = self.dir.join("val_scores.csv");
        let content = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read '{}'. Run 'train' first to produce validation scores.",
                path.display()
            )
        })?;

        let mut probabilities = Vec::new();
        let mut labels        = Vec::new();
        for line in content.lines().skip(1) {
            let mut fields = line.split(',');
            let p: f64 = fields
                .next()
                .and_then(|f| f.parse().ok())
                .with_context(|| format!("Malformed score row '{line}'"))?;
            let l: usize = fields
                .next()
                .and_then(|f| f.parse().ok())
                .with_context(|| format!("Malformed score row '{line}'"))?;
            probabilities.push(p);
            labels.push(l);
        }

        Ok((probabilities, labels))
    }

    fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join("latest_epoch.json");
        let s = fs::read_to_string(&path)
            .with_context(|| "Cannot find 'latest_epoch.json'. Have you run 'train' first?")?;
        Ok(serde_json::from_str::<usize>(&s)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn temp_manager(tag: &str) -> (CheckpointManager, PathBuf) {
        let dir = std::env::temp_dir().join(format!(
            "qtl_screener_ckpt_{}_{}",
            std::process::id(),
            tag,
        ));
        (CheckpointManager::new(dir.display().to_string()).unwrap(), dir)
    }

    #[test]
    fn test_uncreatable_directory_fails_at_construction() {
        // A plain file occupying the target path makes
        // create_dir_all fail — new() must surface that immediately
        let file = std::env::temp_dir().join(format!(
            "qtl_screener_ckpt_blocker_{}",
            std::process::id(),
        ));
        std::fs::write(&file, "not a directory").unwrap();
        assert!(CheckpointManager::new(file.display().to_string()).is_err());
        std::fs::remove_file(file).ok();
    }

    #[test]
    fn test_threshold_round_trip() {
        let (m, dir) = temp_manager("threshold");
        assert!(m.load_threshold().unwrap().is_none());

        m.save_threshold(0.35).unwrap();
        assert_eq!(m.load_threshold().unwrap(), Some(0.35));
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_validation_scores_round_trip() {
        let (m, dir) = temp_manager("scores");
        m.save_validation_scores(&[0.9, 0.1], &[1, 0]).unwrap();

        let (probs, labels) = m.load_validation_scores().unwrap();
        assert_eq!(labels, vec![1, 0]);
        assert!((probs[0] - 0.9).abs() < 1e-6);
        assert!((probs[1] - 0.1).abs() < 1e-6);
        std::fs::remove_dir_all(dir).ok();
    }
}
