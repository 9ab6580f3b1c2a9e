// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns that don't belong to any specific
// business layer:
//
//   checkpoint.rs      — Saving and loading model weights with
//                        Burn's CompactRecorder, the training
//                        config JSON (so inference can rebuild
//                        the exact architecture), the latest-
//                        epoch pointer, the calibrated decision
//                        threshold, and the pretrained-encoder
//                        load used by two-phase construction.
//
//   tokenizer_store.rs — Subword tokenizer persistence: load a
//                        saved tokenizer.json, or build a
//                        lowercase word-level vocabulary from
//                        the training corpus and save it so
//                        train and predict share one vocabulary.
//
//   metrics.rs         — Per-epoch metrics CSV logger for
//                        learning-curve analysis.
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Model/config/threshold checkpoint saving and loading
pub mod checkpoint;

/// Tokenizer building, saving, and loading
pub mod tokenizer_store;

/// Training metrics CSV logger
pub mod metrics;
