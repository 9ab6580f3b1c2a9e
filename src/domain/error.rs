// ============================================================
// Layer 3 — Pipeline Error Taxonomy
// ============================================================
// Fatal configuration/input errors that must abort pipeline
// construction before any training begins. None of these are
// recoverable at runtime — rebuilding the input is the only
// remediation, so there is no retry logic anywhere.
//
// What is deliberately NOT an error:
//   - Out-of-vocabulary tokens during vectorization
//     (silently excluded from the average; an entirely OOV
//     text degrades to a zero vector)
//   - A threshold that predicts zero positives during the
//     calibration sweep (its F1 is defined as 0)
//
// Reference: Rust Book §9 (Error Handling)
//            thiserror crate documentation

use thiserror::Error;

/// Fatal errors raised while building the screening pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A line of the static embedding file could not be parsed as
    /// `token` followed by D numeric values.
    #[error("corrupt embedding file '{path}' at line {line}: {reason}")]
    CorruptEmbeddingFile {
        path:   String,
        line:   usize,
        reason: String,
    },

    /// Two vectors that must share a dimension do not.
    #[error("dimension mismatch: expected {expected}, got {actual} ({context})")]
    DimensionMismatch {
        expected: usize,
        actual:   usize,
        context:  String,
    },

    /// A label sequence does not align 1:1 with its text sequence.
    #[error("length mismatch: {texts} texts but {labels} labels")]
    LengthMismatch { texts: usize, labels: usize },

    /// A batch mixes labeled and unlabeled examples. Labels are an
    /// all-or-nothing property of a batch, never per-example.
    #[error("heterogeneous batch: {labeled} labeled and {unlabeled} unlabeled examples")]
    HeterogeneousBatch { labeled: usize, unlabeled: usize },

    /// A batch with no examples reached collation. There is no
    /// sequence length or feature dimension to stack against.
    #[error("empty batch: collation requires at least one example")]
    EmptyBatch,
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_problem() {
        let e = PipelineError::LengthMismatch { texts: 10, labels: 8 };
        assert_eq!(e.to_string(), "length mismatch: 10 texts but 8 labels");

        let e = PipelineError::HeterogeneousBatch { labeled: 3, unlabeled: 1 };
        assert!(e.to_string().contains("3 labeled"));
    }
}
