// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// a specific goal (training, predicting, or re-calibrating).
//
// Rules for this layer:
//   - No ML math or model code here
//   - No UI or printing here beyond result summaries (Layer 1)
//   - No direct tensor work (that's Layer 5)
//   - Only workflow coordination
//
// Think of this layer as the "director" — it tells other
// layers what to do but doesn't do the work itself.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The training + calibration workflow
pub mod train_use_case;

// The batch prediction workflow
pub mod predict_use_case;

// Re-sweep thresholds over saved validation scores
pub mod calibrate_use_case;
