// ============================================================
// Layer 3 — Abstract Record Domain Types
// ============================================================
// Represents the input rows of the screening pipeline.
//
// Two kinds of input exist:
//   - LabeledAbstract:  used for training/validation, carries a
//     Category column (1 = QTL trait-related, 0 = not related)
//   - AbstractRecord:   used for inference, carries an identifier
//     instead of a label so predictions can be reported per row
//
// Missing Title or Abstract cells are treated as empty strings,
// never as an error — curated exports routinely have blank cells
// and a blank abstract is still a classifiable (negative-looking)
// input.
//
// Reference: Rust Book §5 (Structs and Methods)
//            Rust Book §10 (Derive Macros)

use serde::{Deserialize, Serialize};

/// An unlabeled abstract row for inference.
/// The identifier is carried through the whole pipeline so the
/// prediction output can be joined back to the source table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbstractRecord {
    /// Row identifier (e.g. a PubMed id) — kept for traceability
    #[serde(rename = "Id", alias = "PMID", alias = "identifier")]
    pub identifier: String,

    /// Paper title; empty string when the cell is blank
    #[serde(rename = "Title", default)]
    pub title: String,

    /// Paper abstract; empty string when the cell is blank
    #[serde(rename = "Abstract", default)]
    pub abstract_text: String,
}

/// A labeled abstract row for training and validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledAbstract {
    /// Paper title; empty string when the cell is blank
    #[serde(rename = "Title", default)]
    pub title: String,

    /// Paper abstract; empty string when the cell is blank
    #[serde(rename = "Abstract", default)]
    pub abstract_text: String,

    /// Binary class: 1 = QTL trait-related, 0 = not related
    #[serde(rename = "Category")]
    pub category: usize,
}

impl AbstractRecord {
    pub fn new(
        identifier:    impl Into<String>,
        title:         impl Into<String>,
        abstract_text: impl Into<String>,
    ) -> Self {
        Self {
            identifier:    identifier.into(),
            title:         title.into(),
            abstract_text: abstract_text.into(),
        }
    }

    /// Title and abstract joined into the single text the model sees.
    pub fn full_text(&self) -> String {
        join_title_abstract(&self.title, &self.abstract_text)
    }
}

impl LabeledAbstract {
    pub fn new(
        title:         impl Into<String>,
        abstract_text: impl Into<String>,
        category:      usize,
    ) -> Self {
        Self {
            title:         title.into(),
            abstract_text: abstract_text.into(),
            category,
        }
    }

    /// Title and abstract joined into the single text the model sees.
    pub fn full_text(&self) -> String {
        join_title_abstract(&self.title, &self.abstract_text)
    }
}

/// Join title and abstract with a single space, tolerating either
/// side being empty so we never produce leading/trailing whitespace.
fn join_title_abstract(title: &str, abstract_text: &str) -> String {
    match (title.is_empty(), abstract_text.is_empty()) {
        (true, true)  => String::new(),
        (true, false) => abstract_text.to_string(),
        (false, true) => title.to_string(),
        (false, false) => format!("{} {}", title, abstract_text),
    }
}

/// One final prediction for one input row.
/// predicted_label derives from probability via the calibrated
/// threshold — it is NOT fixed at 0.5.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// Identifier copied from the input row
    pub identifier: String,

    /// Positive-class probability in [0, 1]
    pub probability: f64,

    /// 1 iff probability >= decision threshold
    pub predicted_label: usize,
}

impl PredictionRecord {
    /// Derive a prediction from a probability and a threshold.
    pub fn from_probability(
        identifier:  impl Into<String>,
        probability: f64,
        threshold:   f64,
    ) -> Self {
        Self {
            identifier:      identifier.into(),
            probability,
            predicted_label: usize::from(probability >= threshold),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_text_joins_title_and_abstract() {
        let r = AbstractRecord::new("A1", "QTL mapping", "in dairy cattle");
        assert_eq!(r.full_text(), "QTL mapping in dairy cattle");
    }

    #[test]
    fn test_full_text_with_missing_title() {
        let r = LabeledAbstract::new("", "in dairy cattle", 1);
        assert_eq!(r.full_text(), "in dairy cattle");
    }

    #[test]
    fn test_full_text_both_missing() {
        let r = LabeledAbstract::new("", "", 0);
        assert_eq!(r.full_text(), "");
    }

    #[test]
    fn test_prediction_uses_threshold_not_half() {
        // 0.4 is below the naive 0.5 but above a calibrated 0.3
        let p = PredictionRecord::from_probability("A1", 0.4, 0.3);
        assert_eq!(p.predicted_label, 1);

        let p = PredictionRecord::from_probability("A1", 0.4, 0.5);
        assert_eq!(p.predicted_label, 0);
    }

    #[test]
    fn test_prediction_threshold_is_inclusive() {
        let p = PredictionRecord::from_probability("A1", 0.5, 0.5);
        assert_eq!(p.predicted_label, 1);
    }
}
