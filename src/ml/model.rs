// ============================================================
// Layer 5 — Hybrid Classifier Model
// ============================================================
// Two submodels composed into one Burn Module:
//
//   TextEncoder       token ids → transformer stack → mask-aware
//                     mean pooling → pooled vector [batch, H]
//   HybridClassifier  concat(pooled, static feature) →
//                     Linear(H + D, 2) → logits
//
// The fusion head's input width depends on BOTH H and D, so its
// weights can never come from an encoder-only checkpoint — only
// the encoder participates in pretrained-weight loading.
//
// Reference: Vaswani et al. (2017) "Attention Is All You Need",
//            Burn Book §3 (Modules)

use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
};

// ─── Text Encoder ─────────────────────────────────────────────────────────────

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct TextEncoderConfig {
    pub vocab_size:  usize,
    pub max_seq_len: usize,
    pub d_model:     usize,
    pub num_heads:   usize,
    pub num_layers:  usize,
    pub d_ff:        usize,
    pub dropout:     f64,
}

impl TextEncoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> TextEncoder<B> {
        let token_embedding    = EmbeddingConfig::new(self.vocab_size, self.d_model).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_seq_len, self.d_model).init(device);
        let blocks: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let final_norm = LayerNormConfig::new(self.d_model).init(device);
        let dropout    = DropoutConfig::new(self.dropout).init();
        TextEncoder {
            token_embedding,
            position_embedding,
            blocks,
            final_norm,
            dropout,
            max_seq_len: self.max_seq_len,
        }
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.d_model).init(device);
        let norm1   = LayerNormConfig::new(self.d_model).init(device);
        let norm2   = LayerNormConfig::new(self.d_model).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2, dropout }
    }
}

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    /// Pre-norm-free block: attention + residual, FFN + residual.
    /// pad_mask marks padding positions so attention never reads them.
    pub fn forward(&self, x: Tensor<B, 3>, pad_mask: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let attn_input  = MhaInput::self_attn(x.clone()).mask_pad(pad_mask);
        let attn_output = self.self_attn.forward(attn_input).context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone()))
        );
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

/// The contextual encoder: embeds a token sequence and reduces
/// it to one pooled vector per example.
///
/// Pooling is a mask-aware mean over the unpadded positions —
/// padding contributes nothing, so a short abstract and the same
/// abstract re-padded to a longer max_seq_len pool identically.
#[derive(Module, Debug)]
pub struct TextEncoder<B: Backend> {
    pub token_embedding:    Embedding<B>,
    pub position_embedding: Embedding<B>,
    pub blocks:             Vec<EncoderBlock<B>>,
    pub final_norm:         LayerNorm<B>,
    pub dropout:            Dropout,
    pub max_seq_len:        usize,
}

impl<B: Backend> TextEncoder<B> {
    /// token_ids, attention_mask: [batch, seq_len] → pooled: [batch, d_model]
    pub fn forward(
        &self,
        token_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
    ) -> Tensor<B, 2> {
        let [batch_size, seq_len] = token_ids.dims();

        let tok_emb = self.token_embedding.forward(token_ids);

        // Self-attention is permutation-invariant, so position must be injected explicitly.
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &tok_emb.device())
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        // True at padding positions
        let pad_mask = attention_mask.clone().equal_elem(0);

        let mut x = self.dropout.forward(tok_emb + pos_emb);
        for block in &self.blocks {
            x = block.forward(x, pad_mask.clone());
        }
        let x = self.final_norm.forward(x); // [batch, seq_len, d_model]

        // ── Mask-aware mean pooling ───────────────────────────────────────────
        // sum(hidden * mask) / count(mask), with the count clamped
        // to 1 so an all-padding row yields zeros instead of NaN
        let mask_f  = attention_mask.float();                    // [batch, seq_len]
        let weights = mask_f.clone().unsqueeze_dim::<3>(2);      // [batch, seq_len, 1]
        let summed  = (x * weights).sum_dim(1).squeeze::<2>(1);  // [batch, d_model]
        let counts  = mask_f.sum_dim(1).clamp_min(1.0);          // [batch, 1]
        summed / counts
    }
}

// ─── Hybrid Classifier ────────────────────────────────────────────────────────

#[derive(Config, Debug)]
pub struct HybridClassifierConfig {
    /// Architecture of the contextual encoder
    pub encoder: TextEncoderConfig,

    /// Dimension D of the static-embedding feature
    pub static_dim: usize,

    /// Dropout applied to the pooled output during training
    #[config(default = 0.1)]
    pub dropout: f64,

    /// Cross-entropy weight for the negative (majority) class
    #[config(default = 1.0)]
    pub weight_negative: f32,

    /// Cross-entropy weight for the positive (rare) class.
    /// Default 3.0 counters the ~9:1 imbalance with a preference
    /// for recall on the rare class.
    #[config(default = 3.0)]
    pub weight_positive: f32,
}

impl HybridClassifierConfig {
    /// Phase two of the two-phase construction: compose the
    /// encoder (whose weights may afterwards be replaced from a
    /// pretrained checkpoint) with a FRESH, randomly initialized
    /// fusion head. The head's input dimension (H + D) never
    /// matches any encoder checkpoint, so it is never loaded.
    pub fn init<B: Backend>(&self, device: &B::Device) -> HybridClassifier<B> {
        let encoder     = self.encoder.init(device);
        let dropout     = DropoutConfig::new(self.dropout).init();
        let fusion_head =
            LinearConfig::new(self.encoder.d_model + self.static_dim, 2).init(device);
        HybridClassifier {
            encoder,
            dropout,
            fusion_head,
            static_dim:      self.static_dim,
            weight_negative: self.weight_negative,
            weight_positive: self.weight_positive,
        }
    }
}

/// Forward output: logits always, loss only when labels were
/// supplied.
pub struct ClassifierOutput<B: Backend> {
    pub loss:   Option<Tensor<B, 1>>,
    pub logits: Tensor<B, 2>,
}

/// Fuses the encoder's pooled representation (H) with the
/// averaged static-embedding feature (D) by concatenation,
/// then applies a single learned linear decision layer.
#[derive(Module, Debug)]
pub struct HybridClassifier<B: Backend> {
    pub encoder:         TextEncoder<B>,
    pub dropout:         Dropout,
    pub fusion_head:     Linear<B>,
    pub static_dim:      usize,
    pub weight_negative: f32,
    pub weight_positive: f32,
}

impl<B: Backend> HybridClassifier<B> {
    /// (token_ids, attention_mask, static_features) → logits [batch, 2]
    ///
    /// Absent static features are tolerated and substituted with
    /// zeros of the configured dimension. Dropout on the pooled
    /// output is active only under an autodiff backend (training);
    /// it is a no-op at inference.
    ///
    /// # Panics
    /// Panics if a supplied static feature tensor's second
    /// dimension disagrees with the configured static_dim —
    /// that is a configuration bug, not a recoverable input error.
    pub fn forward(
        &self,
        token_ids:       Tensor<B, 2, Int>,
        attention_mask:  Tensor<B, 2, Int>,
        static_features: Option<Tensor<B, 2>>,
    ) -> Tensor<B, 2> {
        let [batch_size, _] = token_ids.dims();
        let device = token_ids.device();

        let pooled = self.encoder.forward(token_ids, attention_mask);
        let pooled = self.dropout.forward(pooled);

        let static_features = match static_features {
            Some(features) => {
                let [_, dim] = features.dims();
                assert_eq!(
                    dim, self.static_dim,
                    "static feature dimension {dim} does not match configured {}",
                    self.static_dim,
                );
                features
            }
            None => Tensor::zeros([batch_size, self.static_dim], &device),
        };

        // [batch, H] ++ [batch, D] → [batch, H + D]
        let fused = Tensor::cat(vec![pooled, static_features], 1);
        self.fusion_head.forward(fused)
    }

    /// Forward pass with optional class-weighted cross-entropy.
    /// Loss is absent exactly when labels are absent.
    pub fn forward_classification(
        &self,
        token_ids:       Tensor<B, 2, Int>,
        attention_mask:  Tensor<B, 2, Int>,
        static_features: Option<Tensor<B, 2>>,
        labels:          Option<Tensor<B, 1, Int>>,
    ) -> ClassifierOutput<B> {
        let logits = self.forward(token_ids, attention_mask, static_features);

        let loss = labels.map(|labels| {
            CrossEntropyLossConfig::new()
                .with_weights(Some(vec![self.weight_negative, self.weight_positive]))
                .init(&logits.device())
                .forward(logits.clone(), labels)
        });

        ClassifierOutput { loss, logits }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn tiny_config() -> HybridClassifierConfig {
        HybridClassifierConfig::new(
            TextEncoderConfig::new(16, 4, 8, 2, 1, 16, 0.0),
            2, // static_dim
        )
    }

    fn ids(device: &<TestBackend as Backend>::Device) -> Tensor<TestBackend, 2, Int> {
        Tensor::<TestBackend, 1, Int>::from_ints([3, 5, 0, 0, 7, 2, 4, 0].as_slice(), device)
            .reshape([2, 4])
    }

    fn mask(device: &<TestBackend as Backend>::Device) -> Tensor<TestBackend, 2, Int> {
        Tensor::<TestBackend, 1, Int>::from_ints([1, 1, 0, 0, 1, 1, 1, 0].as_slice(), device)
            .reshape([2, 4])
    }

    #[test]
    fn test_logit_shape_is_batch_by_two() {
        let device = Default::default();
        let model  = tiny_config().init::<TestBackend>(&device);

        let statics =
            Tensor::<TestBackend, 1>::from_floats([0.5, 0.5, 0.1, 0.9].as_slice(), &device)
                .reshape([2, 2]);

        let logits = model.forward(ids(&device), mask(&device), Some(statics));
        assert_eq!(logits.dims(), [2, 2]);
    }

    #[test]
    fn test_missing_static_features_equal_zero_features() {
        // Zero substitution must be indistinguishable from an
        // explicit zero vector (dropout is a no-op on NdArray)
        let device = Default::default();
        let model  = tiny_config().init::<TestBackend>(&device);

        let zeros = Tensor::<TestBackend, 2>::zeros([2, 2], &device);
        let with_zeros = model
            .forward(ids(&device), mask(&device), Some(zeros))
            .into_data()
            .to_vec::<f32>()
            .unwrap();
        let with_none = model
            .forward(ids(&device), mask(&device), None)
            .into_data()
            .to_vec::<f32>()
            .unwrap();

        for (a, b) in with_zeros.iter().zip(&with_none) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    #[should_panic(expected = "static feature dimension")]
    fn test_wrong_static_dimension_panics() {
        let device = Default::default();
        let model  = tiny_config().init::<TestBackend>(&device);

        let bad = Tensor::<TestBackend, 2>::zeros([2, 5], &device);
        let _ = model.forward(ids(&device), mask(&device), Some(bad));
    }

    #[test]
    fn test_loss_present_iff_labels_present() {
        let device = Default::default();
        let model  = tiny_config().init::<TestBackend>(&device);

        let labels = Tensor::<TestBackend, 1, Int>::from_ints([1, 0].as_slice(), &device);
        let out = model.forward_classification(ids(&device), mask(&device), None, Some(labels));
        assert!(out.loss.is_some());
        assert_eq!(out.logits.dims(), [2, 2]);

        let loss_value: f32 = out.loss.unwrap().into_scalar().elem();
        assert!(loss_value.is_finite());
        assert!(loss_value > 0.0);

        let out = model.forward_classification(ids(&device), mask(&device), None, None);
        assert!(out.loss.is_none());
    }

    #[test]
    fn test_padding_content_cannot_leak_into_logits() {
        // Same real tokens, different values at masked positions →
        // identical logits (attention masks pads as keys, pooling
        // zero-weights them)
        let device = Default::default();
        let model  = tiny_config().init::<TestBackend>(&device);

        let pad_mask =
            Tensor::<TestBackend, 1, Int>::from_ints([1, 1, 0, 0].as_slice(), &device)
                .reshape([1, 4]);
        let ids_zero_pads =
            Tensor::<TestBackend, 1, Int>::from_ints([3, 5, 0, 0].as_slice(), &device)
                .reshape([1, 4]);
        let ids_junk_pads =
            Tensor::<TestBackend, 1, Int>::from_ints([3, 5, 9, 11].as_slice(), &device)
                .reshape([1, 4]);

        let a = model
            .forward(ids_zero_pads, pad_mask.clone(), None)
            .into_data()
            .to_vec::<f32>()
            .unwrap();
        let b = model
            .forward(ids_junk_pads, pad_mask, None)
            .into_data()
            .to_vec::<f32>()
            .unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-6);
        }
    }
}
