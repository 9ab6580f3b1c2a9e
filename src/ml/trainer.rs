// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Synchronous train + validation loop using Burn's DataLoader
// and Adam. One batch is the atomic unit of work: forward,
// weighted loss, backward and parameter update all complete
// before the next batch begins. Mid-run failure is fatal for
// the run — the per-epoch checkpoints are the recovery unit.
//
// Backend split (the key Burn insight):
//   - Training uses MyBackend (Autodiff<Wgpu>) for gradients
//   - model.valid() returns the model on MyInnerBackend (Wgpu)
//     with dropout disabled for deterministic evaluation
//   - The validation batcher must also use MyInnerBackend
//
// Each epoch logs average train loss, validation loss and the
// positive-class F1 at the naive 0.5 baseline; the calibrated
// operating point is chosen AFTER training from the validation
// scores this function returns.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::AbstractBatcher, dataset::AbstractDataset};
use crate::eval::metrics::report_argmax;
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::HybridClassifier;

type MyBackend      = burn::backend::Autodiff<burn::backend::Wgpu>;
type MyInnerBackend = burn::backend::Wgpu;

/// Held-out scores from the final epoch, in validation-set
/// order — the input to threshold calibration.
pub struct ValidationScores {
    pub probabilities: Vec<f64>,
    pub labels:        Vec<usize>,
}

pub fn run_training(
    cfg:           &TrainConfig,
    train_dataset: AbstractDataset,
    val_dataset:   AbstractDataset,
    ckpt_manager:  &CheckpointManager,
    logger:        &MetricsLogger,
) -> Result<ValidationScores> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);

    // ── Build model (two-phase construction) ─────────────────────────────────
    // Phase 1: encoder (optionally overwritten from a pretrained
    // checkpoint). Phase 2: fresh fusion head — never loaded.
    let mut model: HybridClassifier<MyBackend> = cfg.model_config().init(&device);
    if let Some(name) = &cfg.encoder_checkpoint {
        model.encoder = ckpt_manager.load_encoder(model.encoder, name, &device)?;
        tracing::info!("Encoder initialized from pretrained checkpoint '{name}'");
    }
    tracing::info!(
        "Model ready: {} encoder layers, d_model={}, static_dim={}",
        cfg.num_layers,
        cfg.d_model,
        cfg.static_dim,
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let optim_cfg = AdamConfig::new().with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = AbstractBatcher::<MyBackend>::new(device.clone());
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend — no autodiff overhead) ──────────
    let val_batcher = AbstractBatcher::<MyInnerBackend>::new(device.clone());
    let val_loader  = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    let mut last_scores = ValidationScores {
        probabilities: Vec::new(),
        labels:        Vec::new(),
    };

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let output = model.forward_classification(
                batch.token_ids,
                batch.attention_mask,
                Some(batch.static_features),
                batch.labels,
            );
            // Training datasets are labeled by construction
            let loss = output
                .loss
                .expect("labeled dataset produces labeled batches");

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_loss_sum += loss_val;
            train_batches  += 1;

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else {
            f64::NAN
        };

        // ── Validation phase ──────────────────────────────────────────────────
        // model.valid() → HybridClassifier<MyInnerBackend>,
        // dropout disabled for deterministic scores
        let model_valid = model.valid();

        let mut val_loss_sum = 0.0f64;
        let mut val_batches  = 0usize;
        let mut probabilities: Vec<f64> = Vec::new();
        let mut labels: Vec<usize>      = Vec::new();

        for batch in val_loader.iter() {
            let batch_labels = batch
                .labels
                .clone()
                .expect("labeled dataset produces labeled batches");

            let output = model_valid.forward_classification(
                batch.token_ids,
                batch.attention_mask,
                Some(batch.static_features),
                batch.labels,
            );
            let batch_loss: f64 = output
                .loss
                .expect("labeled dataset produces labeled batches")
                .into_scalar()
                .elem::<f64>();
            val_loss_sum += batch_loss;
            val_batches  += 1;

            // Positive-class probabilities: softmax column 1. Both
            // reads propagate failure — scores and labels must stay
            // 1:1 or calibration would pair the wrong examples.
            let [batch_size, _] = output.logits.dims();
            let probs = burn::tensor::activation::softmax(output.logits, 1)
                .slice([0..batch_size, 1..2])
                .reshape([batch_size])
                .into_data()
                .to_vec::<f32>()
                .map_err(|e| anyhow::anyhow!("Cannot read validation probabilities: {e:?}"))?;
            probabilities.extend(probs.iter().map(|&p| p as f64));

            let label_values = batch_labels
                .into_data()
                .convert::<i32>()
                .to_vec::<i32>()
                .map_err(|e| anyhow::anyhow!("Cannot read validation labels: {e:?}"))?;
            labels.extend(label_values.iter().map(|&l| l as usize));
        }

        let avg_val_loss = if val_batches > 0 {
            val_loss_sum / val_batches as f64
        } else {
            f64::NAN
        };

        // Positive-class F1 at the uncalibrated 0.5 baseline
        let baseline = report_argmax(&probabilities, &labels)?;

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | val_f1@0.5={:.4} | val_recall={:.4}",
            epoch, cfg.epochs, avg_train_loss, avg_val_loss, baseline.f1, baseline.recall,
        );

        logger.log(&EpochMetrics::new(
            epoch,
            avg_train_loss,
            avg_val_loss,
            baseline.f1,
        ))?;

        ckpt_manager.save_model(&model, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);

        last_scores = ValidationScores { probabilities, labels };
    }

    tracing::info!("Training complete");
    Ok(last_scores)
}
