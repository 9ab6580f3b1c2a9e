// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
// Scores a table of unlabeled abstracts with a trained
// checkpoint and writes the two-column prediction table:
//
//   Step 1: Load the saved training config   (Layer 6)
//   Step 2: Read unlabeled abstracts         (Layer 4)
//   Step 3: Load embedding store + tokenizer (Layers 4/6)
//   Step 4: Encode (unlabeled — no Category) (Layer 4)
//   Step 5: Score with the checkpoint        (Layer 5)
//   Step 6: Apply the calibrated threshold   (Layer 3)
//   Step 7: Write identifier,predicted_label (Layer 4)
//
// The decision threshold comes from calibration — a flag can
// override it, and if neither exists the 0.5 argmax baseline
// is used (with a warning, since under 9:1 imbalance that is
// rarely the right operating point).

use anyhow::{bail, Result};

use crate::data::{
    embedding_store::StaticEmbeddingStore,
    encoder::EncodedExampleBuilder,
    reader,
};
use crate::domain::record::{AbstractRecord, PredictionRecord};
use crate::eval::metrics::ARGMAX_THRESHOLD;
use crate::infra::{checkpoint::CheckpointManager, tokenizer_store::TokenizerStore};
use crate::ml::predictor::Predictor;

pub struct PredictUseCase {
    checkpoint_dir:     String,
    input_csv:          String,
    output_csv:         String,
    /// Override for the embeddings path saved in the config
    embeddings_path:    Option<String>,
    /// Override for the calibrated threshold
    threshold_override: Option<f64>,
}

impl PredictUseCase {
    pub fn new(
        checkpoint_dir:     impl Into<String>,
        input_csv:          impl Into<String>,
        output_csv:         impl Into<String>,
        embeddings_path:    Option<String>,
        threshold_override: Option<f64>,
    ) -> Self {
        Self {
            checkpoint_dir:  checkpoint_dir.into(),
            input_csv:       input_csv.into(),
            output_csv:      output_csv.into(),
            embeddings_path,
            threshold_override,
        }
    }

    pub fn execute(&self) -> Result<()> {
        // ── Step 1: Rebuild configuration ─────────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&self.checkpoint_dir)?;
        let cfg = ckpt_manager.load_config()?;

        // ── Step 2: Read unlabeled abstracts ──────────────────────────────────
        let records = reader::read_unlabeled(&self.input_csv)?;
        if records.is_empty() {
            tracing::warn!("No input rows — writing an empty prediction table");
        }

        // ── Step 3: Embedding store + tokenizer (same artifacts as training) ──
        let embeddings_path = self
            .embeddings_path
            .as_deref()
            .unwrap_or(&cfg.embeddings_path);
        let store = StaticEmbeddingStore::load(embeddings_path)?;

        let tokenizer = TokenizerStore::new(&self.checkpoint_dir).load()?;

        // ── Step 4: Encode without labels ─────────────────────────────────────
        let texts: Vec<String> = records.iter().map(|r| r.full_text()).collect();
        let builder =
            EncodedExampleBuilder::new(&store, &tokenizer, cfg.max_seq_len, cfg.static_dim)?;
        let examples = builder.build_unlabeled(&texts)?;

        // ── Step 5: Score ─────────────────────────────────────────────────────
        let predictor     = Predictor::from_checkpoint(&ckpt_manager)?;
        let probabilities = predictor.predict_probabilities(&examples, cfg.batch_size)?;

        // ── Step 6: Apply the operating point ─────────────────────────────────
        let threshold = match (self.threshold_override, ckpt_manager.load_threshold()?) {
            (Some(t), _) => t,
            (None, Some(t)) => t,
            (None, None) => {
                tracing::warn!(
                    "No calibrated threshold found — falling back to the {:.1} argmax baseline",
                    ARGMAX_THRESHOLD,
                );
                ARGMAX_THRESHOLD
            }
        };
        tracing::info!("Predicting with threshold {:.3}", threshold);

        let predictions = pair_predictions(&records, &probabilities, threshold)?;

        // ── Step 7: Write output, preserving input order ──────────────────────
        reader::write_predictions(&self.output_csv, &predictions)?;

        let positives = predictions.iter().filter(|p| p.predicted_label == 1).count();
        println!(
            "Scored {} abstracts: {} flagged QTL trait-related ({} negative)",
            predictions.len(),
            positives,
            predictions.len() - positives,
        );
        Ok(())
    }
}

/// Pair every input record with its probability, in input order.
/// Refuses to produce a misaligned table: the output must carry
/// exactly one row per input record.
fn pair_predictions(
    records:       &[AbstractRecord],
    probabilities: &[f64],
    threshold:     f64,
) -> Result<Vec<PredictionRecord>> {
    if records.len() != probabilities.len() {
        bail!(
            "Scored {} probabilities for {} input rows — refusing to write a misaligned prediction table",
            probabilities.len(),
            records.len(),
        );
    }

    Ok(records
        .iter()
        .zip(probabilities)
        .map(|(r, &p)| PredictionRecord::from_probability(r.identifier.as_str(), p, threshold))
        .collect())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_one_row_per_record_in_order() {
        let records = vec![
            AbstractRecord::new("PM1", "QTL mapping", "in cattle"),
            AbstractRecord::new("PM2", "Other", "text"),
        ];
        let preds = pair_predictions(&records, &[0.9, 0.1], 0.5).unwrap();
        assert_eq!(preds.len(), 2);
        assert_eq!(preds[0].identifier, "PM1");
        assert_eq!(preds[0].predicted_label, 1);
        assert_eq!(preds[1].identifier, "PM2");
        assert_eq!(preds[1].predicted_label, 0);
    }

    #[test]
    fn test_missing_probability_refuses_to_write() {
        // A short score vector must abort, never silently drop rows
        let records = vec![
            AbstractRecord::new("PM1", "QTL mapping", "in cattle"),
            AbstractRecord::new("PM2", "Other", "text"),
        ];
        let err = pair_predictions(&records, &[0.9], 0.5).unwrap_err();
        assert!(err.to_string().contains("misaligned"));
    }
}
