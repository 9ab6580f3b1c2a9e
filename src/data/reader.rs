// ============================================================
// Layer 4 — Abstract CSV Reader / Prediction Writer
// ============================================================
// Reads the curated abstract tables off disk and writes the
// final prediction table.
//
// Input formats (UTF-8 CSV with a header row):
//   labeled:    Title, Abstract, Category        (train/dev)
//   unlabeled:  Id, Title, Abstract              (inference)
//
// Missing Title/Abstract cells deserialize to empty strings —
// blank cells are common in curated exports and are valid
// (classifiable) inputs, not errors. A malformed row, on the
// other hand, is fatal: predictions must stay 1:1 with input
// rows, so silently skipping a row would misalign the output.
//
// Output format:
//   identifier, predicted_label — one row per input, in input
//   order.
//
// Reference: Rust Book §12 (I/O)
//            csv crate documentation (serde integration)

use anyhow::{Context, Result};
use std::path::Path;

use crate::domain::record::{AbstractRecord, LabeledAbstract, PredictionRecord};

/// Read all labeled abstracts from a CSV file, in file order.
pub fn read_labeled(path: impl AsRef<Path>) -> Result<Vec<LabeledAbstract>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Cannot open labeled CSV '{}'", path.display()))?;

    let mut rows = Vec::new();
    for (idx, row) in reader.deserialize::<LabeledAbstract>().enumerate() {
        let row = row.with_context(|| {
            format!("Malformed labeled row {} in '{}'", idx + 1, path.display())
        })?;
        rows.push(row);
    }

    tracing::info!("Read {} labeled abstracts from '{}'", rows.len(), path.display());
    Ok(rows)
}

/// Read all unlabeled abstracts from a CSV file, in file order.
pub fn read_unlabeled(path: impl AsRef<Path>) -> Result<Vec<AbstractRecord>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Cannot open abstracts CSV '{}'", path.display()))?;

    let mut rows = Vec::new();
    for (idx, row) in reader.deserialize::<AbstractRecord>().enumerate() {
        let row = row.with_context(|| {
            format!("Malformed row {} in '{}'", idx + 1, path.display())
        })?;
        rows.push(row);
    }

    tracing::info!("Read {} abstracts from '{}'", rows.len(), path.display());
    Ok(rows)
}

/// Write the two-column prediction table, one row per input
/// record, preserving input order.
pub fn write_predictions(
    path:        impl AsRef<Path>,
    predictions: &[PredictionRecord],
) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot create predictions CSV '{}'", path.display()))?;

    writer.write_record(["identifier", "predicted_label"])?;
    for p in predictions {
        writer.write_record([p.identifier.as_str(), &p.predicted_label.to_string()])?;
    }
    writer.flush()?;

    tracing::info!("Wrote {} predictions to '{}'", predictions.len(), path.display());
    Ok(())
}
