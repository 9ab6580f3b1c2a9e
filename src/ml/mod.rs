// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// No other layer imports from burn directly except the
// data-layer batcher (which produces the tensors this layer
// consumes).
//
// Why isolate Burn code here?
//   - If Burn's API changes, we only update this layer
//   - eval/ and domain/ stay testable without a GPU
//   - The model architecture is clearly separated from data
//     loading and application logic
//
// What's in this layer:
//
//   model.rs     — The hybrid classifier:
//                  • contextual text encoder (token + position
//                    embeddings, self-attention blocks, final
//                    layer norm, mask-aware mean pooling)
//                  • dropout on the pooled output
//                  • concatenation with the static-embedding
//                    feature
//                  • fresh linear fusion head → 2 logits
//                  • class-weighted cross-entropy loss
//
//   trainer.rs   — The synchronous training loop:
//                  forward, weighted loss, backward, Adam step,
//                  per-epoch validation scores, metrics CSV row,
//                  checkpoint per epoch
//
//   predictor.rs — The inference engine:
//                  rebuilds the model from a checkpoint and
//                  produces positive-class probabilities
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Vaswani et al. (2017) Attention Is All You Need
//            Devlin et al. (2019) BERT

/// The hybrid transformer + static-embedding classifier
pub mod model;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Inference engine — loads checkpoint and scores abstracts
pub mod predictor;
