// ============================================================
// Layer 4 — Abstract Batcher
// ============================================================
// Stacks a Vec<EncodedExample> into GPU-ready tensors.
//
// How batching works here:
//   Input:  N EncodedExamples, ids/mask of length S, static
//           feature of length D
//   Output: AbstractBatch with
//             token_ids       [N, S]  Int
//             attention_mask  [N, S]  Int
//             static_features [N, D]  Float
//             labels          [N]     Int — present iff every
//                                     example carries a label
//
// We flatten each field into one long Vec, create a 1D tensor,
// then reshape — easy because the builder already padded every
// sequence to the same length.
//
// Label presence is a batch-level all-or-nothing property:
// collate() rejects mixed batches with HeterogeneousBatch.
// Datasets built through EncodedExampleBuilder are homogeneous
// by construction, so the Burn Batcher impl (which cannot
// return a Result) relies on that invariant.
//
// Input order is preserved — significant for reporting
// correspondence to identifiers, not for model correctness.
//
// Reference: Burn Book §4 (Batcher)
//            Rust Book §8 (Vectors)

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::dataset::EncodedExample;
use crate::domain::error::{PipelineError, PipelineResult};

// ─── AbstractBatch ────────────────────────────────────────────────────────────
/// A batch of encoded abstracts ready for the model forward pass.
/// All tensors have batch_size as their first dimension.
///
/// B is the Burn Backend (e.g. Wgpu, NdArray) — generic so the
/// same batcher works on any device.
#[derive(Debug, Clone)]
pub struct AbstractBatch<B: Backend> {
    /// Subword token ids — shape [batch_size, max_seq_len]
    pub token_ids: Tensor<B, 2, Int>,

    /// Attention masks — shape [batch_size, max_seq_len]
    /// 1 = real token, 0 = padding
    pub attention_mask: Tensor<B, 2, Int>,

    /// Averaged static-embedding features — [batch_size, static_dim]
    pub static_features: Tensor<B, 2>,

    /// Class labels — shape [batch_size]; None for inference
    /// batches. Never present for only a subset of the batch.
    pub labels: Option<Tensor<B, 1, Int>>,
}

/// Stack examples into one batch, preserving input order.
///
/// Fails with EmptyBatch on an empty slice and with
/// HeterogeneousBatch if some but not all examples carry labels.
pub fn collate<B: Backend>(
    items:  &[EncodedExample],
    device: &B::Device,
) -> PipelineResult<AbstractBatch<B>> {
    if items.is_empty() {
        return Err(PipelineError::EmptyBatch);
    }

    let batch_size = items.len();
    let labeled    = items.iter().filter(|s| s.is_labeled()).count();

    // All-or-nothing label rule
    if labeled != 0 && labeled != batch_size {
        return Err(PipelineError::HeterogeneousBatch {
            labeled,
            unlabeled: batch_size - labeled,
        });
    }

    // All sequences have the same length (pre-padded by the builder)
    let seq_len    = items[0].token_ids.len();
    let static_dim = items[0].static_feature.len();

    // ── Flatten token ids and masks (Burn uses i32 for Int tensors) ──────────
    let ids_flat: Vec<i32> = items
        .iter()
        .flat_map(|s| s.token_ids.iter().map(|&x| x as i32))
        .collect();

    let mask_flat: Vec<i32> = items
        .iter()
        .flat_map(|s| s.attention_mask.iter().map(|&x| x as i32))
        .collect();

    // ── Flatten static features ───────────────────────────────────────────────
    let static_flat: Vec<f32> = items
        .iter()
        .flat_map(|s| s.static_feature.iter().copied())
        .collect();

    // ── Create tensors ────────────────────────────────────────────────────────
    let token_ids = Tensor::<B, 1, Int>::from_ints(ids_flat.as_slice(), device)
        .reshape([batch_size, seq_len]);

    let attention_mask = Tensor::<B, 1, Int>::from_ints(mask_flat.as_slice(), device)
        .reshape([batch_size, seq_len]);

    let static_features = Tensor::<B, 1>::from_floats(static_flat.as_slice(), device)
        .reshape([batch_size, static_dim]);

    let labels = if labeled == batch_size && batch_size > 0 {
        let label_flat: Vec<i32> = items
            .iter()
            .map(|s| s.label.unwrap_or(0) as i32)
            .collect();
        Some(Tensor::<B, 1, Int>::from_ints(label_flat.as_slice(), device))
    } else {
        None
    };

    Ok(AbstractBatch {
        token_ids,
        attention_mask,
        static_features,
        labels,
    })
}

// ─── AbstractBatcher ──────────────────────────────────────────────────────────
/// The batcher struct — holds the target device so tensors are
/// created on the correct GPU/CPU.
#[derive(Clone, Debug)]
pub struct AbstractBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> AbstractBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

// ─── Burn Batcher Trait Implementation ────────────────────────────────────────
// This is what makes AbstractBatcher work with Burn's DataLoader.
impl<B: Backend> Batcher<EncodedExample, AbstractBatch<B>> for AbstractBatcher<B> {
    fn batch(&self, items: Vec<EncodedExample>) -> AbstractBatch<B> {
        // Datasets reaching the DataLoader are built through
        // EncodedExampleBuilder and therefore homogeneous, and the
        // DataLoader never emits empty batches; a failure here means
        // a corrupted dataset, not a user error.
        collate(&items, &self.device)
            .expect("dataset batches are non-empty and homogeneous")
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn example(ids: Vec<u32>, label: Option<usize>) -> EncodedExample {
        let mask = ids.iter().map(|&i| u32::from(i != 0)).collect();
        EncodedExample {
            token_ids:      ids,
            attention_mask: mask,
            static_feature: vec![0.25, 0.75],
            label,
        }
    }

    #[test]
    fn test_labeled_batch_shapes_and_order() {
        let device = Default::default();
        let items = vec![
            example(vec![5, 6, 0, 0], Some(1)),
            example(vec![7, 0, 0, 0], Some(0)),
            example(vec![8, 9, 9, 0], Some(1)),
        ];
        let batch = collate::<TestBackend>(&items, &device).unwrap();

        assert_eq!(batch.token_ids.dims(), [3, 4]);
        assert_eq!(batch.attention_mask.dims(), [3, 4]);
        assert_eq!(batch.static_features.dims(), [3, 2]);

        // Labels keep input order
        let labels = batch.labels.unwrap();
        assert_eq!(labels.dims(), [3]);
        let values: Vec<i32> = labels.into_data().convert::<i32>().to_vec().unwrap();
        assert_eq!(values, vec![1, 0, 1]);
    }

    #[test]
    fn test_unlabeled_batch_has_no_label_tensor() {
        let device = Default::default();
        let items = vec![
            example(vec![5, 0], None),
            example(vec![6, 7], None),
        ];
        let batch = collate::<TestBackend>(&items, &device).unwrap();
        assert!(batch.labels.is_none());
    }

    #[test]
    fn test_mixed_batch_rejected() {
        let device = Default::default();
        let items = vec![
            example(vec![5, 0], Some(1)),
            example(vec![6, 7], None),
        ];
        let err = collate::<TestBackend>(&items, &device).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::HeterogeneousBatch { labeled: 1, unlabeled: 1 }
        ));
    }

    #[test]
    fn test_empty_batch_rejected() {
        let device = Default::default();
        let err = collate::<TestBackend>(&[], &device).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyBatch));
    }

    #[test]
    fn test_token_ids_row_content() {
        let device = Default::default();
        let items  = vec![example(vec![5, 6, 0, 0], None)];
        let batch  = collate::<TestBackend>(&items, &device).unwrap();
        let values: Vec<i32> = batch.token_ids.into_data().convert::<i32>().to_vec().unwrap();
        assert_eq!(values, vec![5, 6, 0, 0]);
    }
}
