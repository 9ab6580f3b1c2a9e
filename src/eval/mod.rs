// ============================================================
// Layer 5b — Evaluation Layer
// ============================================================
// Pure metric math — no tensors, no I/O, no hidden state.
//
// Two modules:
//
//   metrics.rs   — confusion counts and the classification
//                  report (accuracy, positive-class precision/
//                  recall/F1, per-class support) at a given
//                  decision threshold
//
//   threshold.rs — the calibration sweep that picks the
//                  operating-point threshold maximizing
//                  positive-class F1 on held-out scores
//
// Why a separate layer?
//   Under 9:1 imbalance the naive 0.5 cutoff is rarely the
//   right operating point. Calibration is the piece of this
//   system most worth getting exactly right, so it lives in
//   pure functions that are trivially unit-testable against
//   hand-computed values.

/// Confusion counts and the classification report
pub mod metrics;

/// Decision-threshold calibration sweep
pub mod threshold;
