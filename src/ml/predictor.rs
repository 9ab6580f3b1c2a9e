// ============================================================
// Layer 5 — Predictor
// ============================================================
// Inference engine: rebuilds the trained classifier from the
// latest checkpoint and scores encoded abstracts.
//
// The model instance here is read-only — it is loaded fresh
// from disk and never shares parameters with a live training
// run. Dropout is constructed at 0.0 and the inference backend
// carries no autodiff, so scoring is deterministic.
//
// Reference: Burn Book §5 (Records)

use anyhow::Result;
use burn::prelude::*;

use crate::data::batcher::collate;
use crate::data::dataset::EncodedExample;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::HybridClassifier;

type InferBackend = burn::backend::Wgpu;

pub struct Predictor {
    model:  HybridClassifier<InferBackend>,
    device: burn::backend::wgpu::WgpuDevice,
}

impl Predictor {
    /// Rebuild the model architecture from the saved training
    /// config, then restore the weights of the latest epoch.
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager) -> Result<Self> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        let cfg    = ckpt_manager.load_config()?;

        // Dropout 0 — inference never regularizes
        let model: HybridClassifier<InferBackend> =
            cfg.model_config().with_dropout(0.0).init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint");

        Ok(Self { model, device })
    }

    /// Positive-class probability for every example, in input
    /// order. Examples are scored in fixed-size batches.
    pub fn predict_probabilities(
        &self,
        examples:   &[EncodedExample],
        batch_size: usize,
    ) -> Result<Vec<f64>> {
        let mut probabilities = Vec::with_capacity(examples.len());

        for chunk in examples.chunks(batch_size.max(1)) {
            let batch = collate::<InferBackend>(chunk, &self.device)?;

            let logits = self.model.forward(
                batch.token_ids,
                batch.attention_mask,
                Some(batch.static_features),
            );

            // softmax column 1 = P(positive). A failed read must
            // abort — a short probability vector would misalign the
            // prediction table against its input rows.
            let [n, _] = logits.dims();
            let probs = burn::tensor::activation::softmax(logits, 1)
                .slice([0..n, 1..2])
                .reshape([n])
                .into_data()
                .to_vec::<f32>()
                .map_err(|e| anyhow::anyhow!("Cannot read probabilities from batch: {e:?}"))?;
            probabilities.extend(probs.iter().map(|&p| p as f64));
        }

        Ok(probabilities)
    }
}
