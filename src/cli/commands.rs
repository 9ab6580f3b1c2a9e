// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands — `train`, `predict` and
// `calibrate` — and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;

/// The top-level subcommands available to the user.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the hybrid classifier on labeled abstracts and
    /// calibrate the decision threshold
    Train(TrainArgs),

    /// Score unlabeled abstracts with a trained checkpoint
    Predict(PredictArgs),

    /// Re-sweep decision thresholds over saved validation scores
    Calibrate(CalibrateArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Labeled CSV with Title, Abstract, Category columns
    #[arg(long, default_value = "data/labeled_abstracts.csv")]
    pub data_csv: String,

    /// Pretrained static embedding file (token + D floats per line)
    #[arg(long, default_value = "data/glove.6B.300d.txt")]
    pub embeddings: String,

    /// Directory for checkpoints, tokenizer and threshold
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Named pretrained encoder artifact in the checkpoint dir;
    /// omitted → the encoder trains from random initialization
    #[arg(long)]
    pub encoder_checkpoint: Option<String>,

    /// Maximum number of subword tokens per abstract
    #[arg(long, default_value_t = 256)]
    pub max_seq_len: usize,

    /// Dimension of the static embedding vectors (D)
    #[arg(long, default_value_t = 300)]
    pub static_dim: usize,

    /// Number of abstracts per forward pass
    #[arg(long, default_value_t = 16)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 4)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 2e-5)]
    pub lr: f64,

    /// Hidden dimension of the encoder (H)
    #[arg(long, default_value_t = 256)]
    pub d_model: usize,

    /// Number of attention heads (d_model must be divisible by this)
    #[arg(long, default_value_t = 8)]
    pub num_heads: usize,

    /// Number of stacked encoder layers
    #[arg(long, default_value_t = 6)]
    pub num_layers: usize,

    /// Inner dimension of the encoder feed-forward network
    #[arg(long, default_value_t = 1024)]
    pub d_ff: usize,

    /// Dropout probability on the pooled output and inside the encoder
    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Maximum vocabulary size when building a new tokenizer
    #[arg(long, default_value_t = 30522)]
    pub vocab_size: usize,

    /// Cross-entropy weight for the negative (majority) class
    #[arg(long, default_value_t = 1.0)]
    pub weight_negative: f32,

    /// Cross-entropy weight for the positive (rare) class —
    /// the default 3.0 counters the ~9:1 imbalance
    #[arg(long, default_value_t = 3.0)]
    pub weight_positive: f32,

    /// Fraction of abstracts used for training (rest validates)
    #[arg(long, default_value_t = 0.8)]
    pub train_fraction: f64,

    /// Seed for the shuffled split and batch shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 — the
/// application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_csv:           a.data_csv,
            embeddings_path:    a.embeddings,
            checkpoint_dir:     a.checkpoint_dir,
            encoder_checkpoint: a.encoder_checkpoint,
            max_seq_len:        a.max_seq_len,
            static_dim:         a.static_dim,
            batch_size:         a.batch_size,
            epochs:             a.epochs,
            lr:                 a.lr,
            d_model:            a.d_model,
            num_heads:          a.num_heads,
            num_layers:         a.num_layers,
            d_ff:               a.d_ff,
            dropout:            a.dropout,
            vocab_size:         a.vocab_size,
            weight_negative:    a.weight_negative,
            weight_positive:    a.weight_positive,
            train_fraction:     a.train_fraction,
            seed:               a.seed,
        }
    }
}

/// All arguments for the `predict` command.
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Unlabeled CSV with Id, Title, Abstract columns
    #[arg(long)]
    pub input_csv: String,

    /// Where to write the identifier,predicted_label table
    #[arg(long, default_value = "predictions.csv")]
    pub output_csv: String,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Embedding file override (defaults to the path used in training)
    #[arg(long)]
    pub embeddings: Option<String>,

    /// Decision threshold override (defaults to the calibrated one)
    #[arg(long)]
    pub threshold: Option<f64>,
}

/// All arguments for the `calibrate` command.
#[derive(Args, Debug)]
pub struct CalibrateArgs {
    /// Directory where training saved its validation scores
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Lowest candidate threshold
    #[arg(long, default_value_t = 0.05)]
    pub start: f64,

    /// Highest candidate threshold
    #[arg(long, default_value_t = 0.95)]
    pub end: f64,

    /// Step between candidates
    #[arg(long, default_value_t = 0.05)]
    pub step: f64,
}
