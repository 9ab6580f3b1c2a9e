// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from raw CSV rows all the way
// to GPU-ready tensor batches.
//
// The pipeline flows in this order:
//
//   abstracts CSV
//       │
//       ▼
//   reader            → reads rows into domain records
//       │
//       ▼
//   StaticEmbeddingStore → word → pretrained vector table
//       │
//       ▼
//   TextVectorizer    → averages word vectors per abstract
//       │
//       ▼
//   EncodedExampleBuilder → subword ids + mask + static feature
//       │
//       ▼
//   AbstractDataset   → implements Burn's Dataset trait
//       │
//       ▼
//   AbstractBatcher   → stacks examples into tensor batches
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Each module is responsible for exactly one step.
// This makes each step independently testable and replaceable.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Reads labeled/unlabeled abstract CSVs and writes predictions
pub mod reader;

/// Loads the pretrained word → vector table from disk
pub mod embedding_store;

/// Averages static word vectors into one feature per text
pub mod vectorizer;

/// Builds fully encoded examples (ids + mask + static feature)
pub mod encoder;

/// Implements Burn's Dataset trait for encoded examples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
