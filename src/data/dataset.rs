// ============================================================
// Layer 4 — Encoded Example & Dataset
// ============================================================
// One fully encoded abstract, ready for batching:
//   - token_ids / attention_mask: fixed length = max_seq_len
//     (truncated/padded by the EncodedExampleBuilder)
//   - static_feature: fixed length = the embedding store's D
//   - label: present for train/dev, absent for inference
//
// Examples are constructed once per dataset build and never
// mutated afterwards. A dataset is built either entirely
// labeled or entirely unlabeled (separate builder entry
// points), which is what lets the batcher treat the label
// tensor as an all-or-nothing batch property.
//
// Reference: Burn Book §4 (Datasets)

use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One encoded abstract with both representations:
/// subword ids for the contextual encoder and the averaged
/// static-embedding feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodedExample {
    pub token_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub static_feature: Vec<f32>,
    pub label:          Option<usize>,
}

impl EncodedExample {
    pub fn is_labeled(&self) -> bool {
        self.label.is_some()
    }

    /// Number of non-padding positions.
    pub fn real_token_count(&self) -> usize {
        self.attention_mask.iter().filter(|&&m| m == 1).count()
    }
}

pub struct AbstractDataset {
    samples: Vec<EncodedExample>,
}

impl AbstractDataset {
    pub fn new(samples: Vec<EncodedExample>) -> Self {
        Self { samples }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// The labels of all samples, in dataset order.
    /// Only meaningful for labeled datasets; unlabeled samples
    /// are skipped.
    pub fn labels(&self) -> Vec<usize> {
        self.samples.iter().filter_map(|s| s.label).collect()
    }
}

impl Dataset<EncodedExample> for AbstractDataset {
    fn get(&self, index: usize) -> Option<EncodedExample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn example(label: Option<usize>) -> EncodedExample {
        EncodedExample {
            token_ids:      vec![5, 6, 0, 0],
            attention_mask: vec![1, 1, 0, 0],
            static_feature: vec![0.5, 0.5],
            label,
        }
    }

    #[test]
    fn test_real_token_count() {
        assert_eq!(example(None).real_token_count(), 2);
    }

    #[test]
    fn test_dataset_get_and_len() {
        let ds = AbstractDataset::new(vec![example(Some(1)), example(Some(0))]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(0).unwrap().label, Some(1));
        assert!(ds.get(2).is_none());
    }

    #[test]
    fn test_labels_in_order() {
        let ds = AbstractDataset::new(vec![example(Some(1)), example(Some(0)), example(Some(1))]);
        assert_eq!(ds.labels(), vec![1, 0, 1]);
    }
}
