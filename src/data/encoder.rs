// ============================================================
// Layer 4 — Encoded Example Builder
// ============================================================
// Produces one EncodedExample per raw text:
//   1. Lowercase the text (the single normalization point —
//      both the tokenizer vocabulary and the embedding store
//      are keyed lowercase)
//   2. Subword-encode, truncate to max_seq_len, pad with id 0
//   3. attention_mask = 1 for real tokens, 0 for padding
//   4. static_feature = TextVectorizer mean over the store
//
// Every example in a dataset gets identical tensor shapes, so
// the batcher can stack without any further padding logic.
//
// Two entry points keep label presence an all-or-nothing
// dataset property by construction:
//   build_labeled(texts, labels)  → every example labeled
//   build_unlabeled(texts)        → no example labeled
//
// Fatal errors (abort before training):
//   LengthMismatch    — labels do not align 1:1 with texts
//   DimensionMismatch — store dimension ≠ configured static_dim
//
// Reference: Burn Book §4 (Datasets)
//            tokenizers crate documentation

use anyhow::Result;
use tokenizers::Tokenizer;

use crate::data::dataset::EncodedExample;
use crate::data::embedding_store::StaticEmbeddingStore;
use crate::data::vectorizer::TextVectorizer;
use crate::domain::error::PipelineError;

/// Padding token id — id 0 in the vocabulary, masked out of
/// attention so its value never reaches the pooled output.
pub const PAD_ID: u32 = 0;

#[derive(Debug)]
pub struct EncodedExampleBuilder<'a> {
    store:       &'a StaticEmbeddingStore,
    tokenizer:   &'a Tokenizer,
    vectorizer:  TextVectorizer,
    max_seq_len: usize,
}

impl<'a> EncodedExampleBuilder<'a> {
    /// Create a builder, verifying up front that the store's
    /// vector dimension matches the configured static dimension.
    /// A disagreement here is a configuration bug that must stop
    /// the pipeline before any encoding happens.
    pub fn new(
        store:       &'a StaticEmbeddingStore,
        tokenizer:   &'a Tokenizer,
        max_seq_len: usize,
        static_dim:  usize,
    ) -> Result<Self> {
        if store.dim() != static_dim {
            return Err(PipelineError::DimensionMismatch {
                expected: static_dim,
                actual:   store.dim(),
                context:  "embedding store vs configured static_dim".to_string(),
            }
            .into());
        }
        Ok(Self {
            store,
            tokenizer,
            vectorizer: TextVectorizer::new(),
            max_seq_len,
        })
    }

    /// Encode texts with a parallel label sequence (train/dev).
    pub fn build_labeled(
        &self,
        texts:  &[String],
        labels: &[usize],
    ) -> Result<Vec<EncodedExample>> {
        if texts.len() != labels.len() {
            return Err(PipelineError::LengthMismatch {
                texts:  texts.len(),
                labels: labels.len(),
            }
            .into());
        }

        texts
            .iter()
            .zip(labels)
            .map(|(text, &label)| self.encode_one(text, Some(label)))
            .collect()
    }

    /// Encode texts with no labels (inference).
    pub fn build_unlabeled(&self, texts: &[String]) -> Result<Vec<EncodedExample>> {
        texts.iter().map(|t| self.encode_one(t, None)).collect()
    }

    /// Encode a single text into ids + mask + static feature.
    fn encode_one(&self, text: &str, label: Option<usize>) -> Result<EncodedExample> {
        let lowered = text.to_lowercase();

        // ── Subword encoding ──────────────────────────────────────────────────
        let encoding = self
            .tokenizer
            .encode(lowered.as_str(), false)
            .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;

        let mut token_ids: Vec<u32> = encoding.get_ids().to_vec();
        token_ids.truncate(self.max_seq_len);

        // Mask marks real tokens before padding extends both
        // sequences to exactly max_seq_len
        let real_len = token_ids.len();
        let mut attention_mask = vec![1u32; real_len];
        while token_ids.len() < self.max_seq_len {
            token_ids.push(PAD_ID);
            attention_mask.push(0);
        }

        // ── Static-embedding feature ──────────────────────────────────────────
        let static_feature = self.vectorizer.vectorize(&lowered, self.store);

        Ok(EncodedExample {
            token_ids,
            attention_mask,
            static_feature,
            label,
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::PipelineError;

    fn toy_store() -> StaticEmbeddingStore {
        StaticEmbeddingStore::from_entries(vec![
            ("cow".to_string(),  vec![1.0, 0.0]),
            ("gene".to_string(), vec![0.0, 1.0]),
        ])
        .unwrap()
    }

    fn toy_tokenizer() -> Tokenizer {
        // Minimal lowercase word-level tokenizer: [PAD]=0, [UNK]=1
        let json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [],
            "normalizer": { "type": "Lowercase" },
            "pre_tokenizer": { "type": "Whitespace" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": { "[PAD]": 0, "[UNK]": 1, "cow": 2, "gene": 3, "milk": 4 },
                "unk_token": "[UNK]"
            }
        });
        Tokenizer::from_bytes(serde_json::to_vec(&json).unwrap().as_slice()).unwrap()
    }

    #[test]
    fn test_short_text_is_padded_to_max_len() {
        let store = toy_store();
        let tok   = toy_tokenizer();
        let b     = EncodedExampleBuilder::new(&store, &tok, 8, 2).unwrap();

        let out = b.build_unlabeled(&["cow".to_string()]).unwrap();
        assert_eq!(out[0].token_ids.len(), 8);
        assert_eq!(out[0].attention_mask.len(), 8);
        assert_eq!(out[0].attention_mask[0], 1);
        assert_eq!(out[0].attention_mask[1], 0);
        assert_eq!(out[0].token_ids[1], PAD_ID);
    }

    #[test]
    fn test_long_text_is_truncated_to_max_len() {
        let store = toy_store();
        let tok   = toy_tokenizer();
        let b     = EncodedExampleBuilder::new(&store, &tok, 4, 2).unwrap();

        // 1000 words in, exactly max_seq_len out — identical shape
        // to the one-word case above
        let long = vec!["cow"; 1000].join(" ");
        let out  = b.build_unlabeled(&[long]).unwrap();
        assert_eq!(out[0].token_ids.len(), 4);
        assert_eq!(out[0].attention_mask, vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_static_feature_is_mean_of_hits() {
        let store = toy_store();
        let tok   = toy_tokenizer();
        let b     = EncodedExampleBuilder::new(&store, &tok, 8, 2).unwrap();

        let out = b.build_unlabeled(&["cow gene unknown".to_string()]).unwrap();
        assert_eq!(out[0].static_feature, vec![0.5, 0.5]);
    }

    #[test]
    fn test_uppercase_input_hits_lowercase_store() {
        // The builder owns the lowercasing step
        let store = toy_store();
        let tok   = toy_tokenizer();
        let b     = EncodedExampleBuilder::new(&store, &tok, 8, 2).unwrap();

        let out = b.build_unlabeled(&["COW Gene".to_string()]).unwrap();
        assert_eq!(out[0].static_feature, vec![0.5, 0.5]);
    }

    #[test]
    fn test_labeled_examples_carry_labels() {
        let store = toy_store();
        let tok   = toy_tokenizer();
        let b     = EncodedExampleBuilder::new(&store, &tok, 8, 2).unwrap();

        let out = b
            .build_labeled(&["cow".to_string(), "gene".to_string()], &[1, 0])
            .unwrap();
        assert_eq!(out[0].label, Some(1));
        assert_eq!(out[1].label, Some(0));
    }

    #[test]
    fn test_unlabeled_examples_carry_no_label() {
        let store = toy_store();
        let tok   = toy_tokenizer();
        let b     = EncodedExampleBuilder::new(&store, &tok, 8, 2).unwrap();

        let out = b.build_unlabeled(&["cow".to_string()]).unwrap();
        assert!(out[0].label.is_none());
    }

    #[test]
    fn test_label_length_mismatch_is_fatal() {
        let store = toy_store();
        let tok   = toy_tokenizer();
        let b     = EncodedExampleBuilder::new(&store, &tok, 8, 2).unwrap();

        let err = b
            .build_labeled(&["cow".to_string(), "gene".to_string()], &[1])
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::LengthMismatch { texts: 2, labels: 1 })
        ));
    }

    #[test]
    fn test_store_dimension_mismatch_is_fatal() {
        let store = toy_store(); // dim = 2
        let tok   = toy_tokenizer();
        let err   = EncodedExampleBuilder::new(&store, &tok, 8, 300).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::DimensionMismatch { expected: 300, actual: 2, .. })
        ));
    }
}
