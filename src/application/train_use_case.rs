// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Read labeled abstracts        (Layer 4 - data)
//   Step 2: Load static embedding store   (Layer 4 - data)
//   Step 3: Build / load tokenizer        (Layer 6 - infra)
//   Step 4: Encode examples               (Layer 4 - data)
//   Step 5: Split train/validation        (Layer 4 - data)
//   Step 6: Save config                   (Layer 6 - infra)
//   Step 7: Run training loop             (Layer 5 - ml)
//   Step 8: Calibrate decision threshold  (Layer 5b - eval)
//   Step 9: Persist threshold + scores    (Layer 6 - infra)
//
// All four fatal taxonomy errors (corrupt embedding file,
// dimension mismatch, length mismatch, heterogeneous batch)
// surface during Steps 2-4 — before any training compute is
// spent.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::AbstractDataset,
    embedding_store::StaticEmbeddingStore,
    encoder::EncodedExampleBuilder,
    reader,
    splitter::split_train_val,
};
use crate::eval::metrics::{report, report_argmax};
use crate::eval::threshold::{calibrate, default_threshold_grid};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::MetricsLogger,
    tokenizer_store::TokenizerStore,
};
use crate::ml::model::{HybridClassifierConfig, TextEncoderConfig};
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run. Serialized to the
// checkpoint directory so predict can rebuild the architecture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_csv:           String,
    pub embeddings_path:    String,
    pub checkpoint_dir:     String,
    /// Named pretrained encoder artifact; None trains from scratch
    pub encoder_checkpoint: Option<String>,
    pub max_seq_len:        usize,
    pub static_dim:         usize,
    pub batch_size:         usize,
    pub epochs:             usize,
    pub lr:                 f64,
    pub d_model:            usize,
    pub num_heads:          usize,
    pub num_layers:         usize,
    pub d_ff:               usize,
    pub dropout:            f64,
    pub vocab_size:         usize,
    /// Cross-entropy weight for the negative (majority) class
    pub weight_negative:    f32,
    /// Cross-entropy weight for the positive (rare) class
    pub weight_positive:    f32,
    pub train_fraction:     f64,
    pub seed:               u64,
}

impl TrainConfig {
    /// The model architecture implied by this training config.
    pub fn model_config(&self) -> HybridClassifierConfig {
        HybridClassifierConfig::new(
            TextEncoderConfig::new(
                self.vocab_size,
                self.max_seq_len,
                self.d_model,
                self.num_heads,
                self.num_layers,
                self.d_ff,
                self.dropout,
            ),
            self.static_dim,
        )
        .with_dropout(self.dropout)
        .with_weight_negative(self.weight_negative)
        .with_weight_positive(self.weight_positive)
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_csv:           "data/labeled_abstracts.csv".to_string(),
            embeddings_path:    "data/glove.6B.300d.txt".to_string(),
            checkpoint_dir:     "checkpoints".to_string(),
            encoder_checkpoint: None,
            max_seq_len:        256,
            static_dim:         300,
            batch_size:         16,
            epochs:             4,
            lr:                 2e-5,
            d_model:            256,
            num_heads:          8,
            num_layers:         6,
            d_ff:               1024,
            dropout:            0.1,
            vocab_size:         30522,
            weight_negative:    1.0,
            weight_positive:    3.0,
            train_fraction:     0.8,
            seed:               42,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training + calibration pipeline.
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Read labeled abstracts ────────────────────────────────────
        let rows = reader::read_labeled(&cfg.data_csv)?;
        if rows.is_empty() {
            bail!("No labeled abstracts in '{}'", cfg.data_csv);
        }

        let mut texts  = Vec::with_capacity(rows.len());
        let mut labels = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            if row.category > 1 {
                bail!(
                    "Row {}: Category must be 0 or 1, got {}",
                    idx + 1,
                    row.category
                );
            }
            texts.push(row.full_text());
            labels.push(row.category);
        }

        let positives = labels.iter().filter(|&&l| l == 1).count();
        tracing::info!(
            "Corpus: {} abstracts, {} positive / {} negative",
            rows.len(),
            positives,
            rows.len() - positives,
        );

        // ── Step 2: Load the static embedding store (one-time, read-only) ─────
        let store = StaticEmbeddingStore::load(&cfg.embeddings_path)?;

        // ── Step 3: Build / load tokenizer ────────────────────────────────────
        let tok_store = TokenizerStore::new(&cfg.checkpoint_dir);
        let tokenizer = tok_store.load_or_build(&texts, cfg.vocab_size)?;

        // ── Step 4: Encode examples (both representations) ────────────────────
        let builder =
            EncodedExampleBuilder::new(&store, &tokenizer, cfg.max_seq_len, cfg.static_dim)?;
        let samples = builder.build_labeled(&texts, &labels)?;
        tracing::info!("Encoded {} examples", samples.len());

        // ── Step 5: Train / validation split ──────────────────────────────────
        let (train_samples, val_samples) =
            split_train_val(samples, cfg.train_fraction, cfg.seed);
        tracing::info!(
            "Split: {} train, {} validation",
            train_samples.len(),
            val_samples.len(),
        );

        let train_dataset = AbstractDataset::new(train_samples);
        let val_dataset   = AbstractDataset::new(val_samples);

        // ── Step 6: Save config for inference ─────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir)?;
        ckpt_manager.save_config(cfg)?;
        let logger = MetricsLogger::new(cfg.checkpoint_dir.clone())?;

        // ── Step 7: Run training loop ─────────────────────────────────────────
        let scores =
            run_training(cfg, train_dataset, val_dataset, &ckpt_manager, &logger)?;

        // ── Step 8: Calibrate the decision threshold ──────────────────────────
        let baseline = report_argmax(&scores.probabilities, &scores.labels)?;
        println!("Argmax baseline:      {}", baseline.summary());

        let best = calibrate(
            &scores.probabilities,
            &scores.labels,
            &default_threshold_grid(),
        )?;
        let calibrated = report(&scores.probabilities, &scores.labels, best.threshold)?;
        println!("Calibrated operating: {}", calibrated.summary());

        // ── Step 9: Persist scores and threshold ──────────────────────────────
        ckpt_manager.save_validation_scores(&scores.probabilities, &scores.labels)?;
        ckpt_manager.save_threshold(best.threshold)?;

        Ok(())
    }
}
