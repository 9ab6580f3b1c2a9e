// ============================================================
// Layer 4 — Static Embedding Store
// ============================================================
// Loads a large pretrained word → vector table (GloVe-style)
// from a plain text file, one entry per line:
//
//   token v1 v2 ... vD
//
// No header, UTF-8, whitespace separated. Files of this kind
// routinely hold hundreds of thousands of entries, so loading
// is a single pass over a buffered reader with one HashMap
// insert per line (O(1) amortized).
//
// The store is built once and read-only afterwards. It is
// passed by reference to every consumer — never a process-wide
// singleton — so sharing it across vectorization calls needs
// no locking.
//
// Keys are expected to be lowercase in the file; the store does
// not normalize. Callers must lowercase their text before
// looking tokens up.
//
// Reference: Rust Book §8 (HashMaps)
//            Rust Book §12 (I/O and File Handling)
//            Pennington et al. (2014) GloVe paper

use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::domain::error::{PipelineError, PipelineResult};

/// An immutable word → vector mapping with a single fixed
/// dimension shared by every vector.
#[derive(Debug)]
pub struct StaticEmbeddingStore {
    vectors: HashMap<String, Vec<f32>>,
    dim:     usize,
}

impl StaticEmbeddingStore {
    /// Load the full table from a text file in one pass.
    ///
    /// The first parsed line fixes the vector dimension D.
    /// Fails with CorruptEmbeddingFile if any line has fewer than
    /// two fields or a non-numeric value, and DimensionMismatch
    /// if a later line has a vector length other than D.
    pub fn load(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path     = path.as_ref();
        let path_str = path.display().to_string();

        let file = File::open(path).map_err(|e| PipelineError::CorruptEmbeddingFile {
            path:   path_str.clone(),
            line:   0,
            reason: format!("cannot open file: {e}"),
        })?;
        let reader = BufReader::new(file);

        let mut vectors: HashMap<String, Vec<f32>> = HashMap::new();
        let mut dim: Option<usize> = None;

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line    = line.map_err(|e| PipelineError::CorruptEmbeddingFile {
                path:   path_str.clone(),
                line:   line_no,
                reason: format!("unreadable line: {e}"),
            })?;

            // Blank lines (usually a trailing newline) are skipped
            if line.trim().is_empty() {
                continue;
            }

            let mut fields = line.split_whitespace();

            // First field is the token itself
            let token = fields
                .next()
                .ok_or_else(|| PipelineError::CorruptEmbeddingFile {
                    path:   path_str.clone(),
                    line:   line_no,
                    reason: "empty entry".to_string(),
                })?;

            // Remaining fields are the vector components
            let mut vector = Vec::with_capacity(dim.unwrap_or(0));
            for field in fields {
                let value: f32 =
                    field
                        .parse()
                        .map_err(|_| PipelineError::CorruptEmbeddingFile {
                            path:   path_str.clone(),
                            line:   line_no,
                            reason: format!("non-numeric value '{field}'"),
                        })?;
                vector.push(value);
            }

            if vector.is_empty() {
                return Err(PipelineError::CorruptEmbeddingFile {
                    path:   path_str,
                    line:   line_no,
                    reason: format!("token '{token}' has no vector values"),
                });
            }

            // The first entry fixes D; every later entry must match
            match dim {
                None => dim = Some(vector.len()),
                Some(d) if d != vector.len() => {
                    return Err(PipelineError::DimensionMismatch {
                        expected: d,
                        actual:   vector.len(),
                        context:  format!("embedding file line {line_no}"),
                    });
                }
                Some(_) => {}
            }

            vectors.insert(token.to_string(), vector);
        }

        let dim = dim.unwrap_or(0);
        tracing::info!(
            "Loaded {} static embeddings (dim={}) from '{}'",
            vectors.len(),
            dim,
            path_str,
        );

        Ok(Self { vectors, dim })
    }

    /// Build a store directly from in-memory entries.
    /// Used by tests and by callers that synthesize small tables.
    pub fn from_entries(entries: Vec<(String, Vec<f32>)>) -> PipelineResult<Self> {
        let mut vectors = HashMap::new();
        let mut dim: Option<usize> = None;

        for (token, vector) in entries {
            match dim {
                None => dim = Some(vector.len()),
                Some(d) if d != vector.len() => {
                    return Err(PipelineError::DimensionMismatch {
                        expected: d,
                        actual:   vector.len(),
                        context:  format!("entry '{token}'"),
                    });
                }
                Some(_) => {}
            }
            vectors.insert(token, vector);
        }

        Ok(Self { vectors, dim: dim.unwrap_or(0) })
    }

    /// Point lookup. A miss is a normal outcome (OOV token),
    /// never an error, and never inserts a default.
    pub fn lookup(&self, token: &str) -> Option<&[f32]> {
        self.vectors.get(token).map(|v| v.as_slice())
    }

    /// The shared vector dimension D.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}
