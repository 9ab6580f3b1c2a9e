// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `train`     — trains the hybrid classifier and calibrates
//                    the decision threshold
//   2. `predict`   — scores unlabeled abstracts with a checkpoint
//   3. `calibrate` — re-sweeps thresholds without retraining
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{CalibrateArgs, Commands, PredictArgs, TrainArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "qtl-screener",
    version = "0.1.0",
    about = "Flag scientific abstracts as QTL trait-related with a hybrid transformer + static-embedding classifier."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    ///
    /// The match moves the args out of `self`, so the handlers are
    /// associated functions rather than methods — nothing else of
    /// the Cli survives the dispatch.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)     => Self::run_train(args),
            Commands::Predict(args)   => Self::run_predict(args),
            Commands::Calibrate(args) => Self::run_calibrate(args),
        }
    }

    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Starting training on '{}'", args.data_csv);

        let use_case = TrainUseCase::new(args.into());
        use_case.execute()?;

        println!("Training complete. Checkpoint, threshold and scores saved.");
        Ok(())
    }

    fn run_predict(args: PredictArgs) -> Result<()> {
        use crate::application::predict_use_case::PredictUseCase;

        let use_case = PredictUseCase::new(
            args.checkpoint_dir,
            args.input_csv,
            args.output_csv,
            args.embeddings,
            args.threshold,
        );
        use_case.execute()
    }

    fn run_calibrate(args: CalibrateArgs) -> Result<()> {
        use crate::application::calibrate_use_case::CalibrateUseCase;

        let grid = CalibrateUseCase::grid_from_range(args.start, args.end, args.step)?;
        let use_case = CalibrateUseCase::new(args.checkpoint_dir, Some(grid));
        use_case.execute()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_consumes_cli_and_dispatches_owned_args() {
        // Dispatch must reach the use case after the subcommand args
        // are moved out of the Cli. Calibrate with an empty checkpoint
        // directory surfaces the use case's "no scores saved" error.
        let dir = std::env::temp_dir().join(format!(
            "qtl_screener_cli_{}",
            std::process::id(),
        ));
        let cli = Cli::try_parse_from([
            "qtl-screener",
            "calibrate",
            "--checkpoint-dir",
            dir.to_str().unwrap(),
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Calibrate(_)));
        assert!(cli.run().is_err());
        std::fs::remove_dir_all(dir).ok();
    }
}
