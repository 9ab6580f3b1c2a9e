// ============================================================
// Layer 4 — Text Vectorizer
// ============================================================
// Converts raw text into one fixed-dimension feature vector by
// averaging the static embeddings of its tokens.
//
// Algorithm:
//   1. Split the text on whitespace
//   2. Look each token up in the StaticEmbeddingStore
//   3. Element-wise arithmetic mean over all hits
//   4. Zero hits → the all-zero vector of dimension store.dim()
//
// Out-of-vocabulary tokens are silently excluded from the
// average — they are a normal outcome, never an error.
//
// The vectorizer does NOT lowercase. The store's keys are
// lowercase, so callers must normalize consistently before
// calling (the EncodedExampleBuilder does). Keeping the
// normalization in exactly one place avoids subtle
// double-lowercasing disagreements between train and predict.
//
// Deterministic: same text + same store → same vector. The mean
// is order-invariant, so token permutations cannot change it.
//
// Reference: Rust Book §13 (Iterators)

use crate::data::embedding_store::StaticEmbeddingStore;

#[derive(Debug)]
pub struct TextVectorizer;

impl TextVectorizer {
    pub fn new() -> Self {
        Self
    }

    /// Average the static embeddings of all in-vocabulary tokens.
    /// Returns the all-zero vector of length store.dim() when no
    /// token hits the store.
    pub fn vectorize(&self, text: &str, store: &StaticEmbeddingStore) -> Vec<f32> {
        let dim = store.dim();
        let mut sum  = vec![0.0f32; dim];
        let mut hits = 0usize;

        for token in text.split_whitespace() {
            if let Some(vector) = store.lookup(token) {
                for (acc, v) in sum.iter_mut().zip(vector) {
                    *acc += v;
                }
                hits += 1;
            }
        }

        // Entirely OOV text degrades gracefully to the zero vector
        if hits == 0 {
            return sum;
        }

        let n = hits as f32;
        for acc in sum.iter_mut() {
            *acc /= n;
        }
        sum
    }
}

impl Default for TextVectorizer {
    fn default() -> Self {
        Self::new()
    }
}
