use crate::artifacts::ModelId;
use crate::dataset::TrainingDataset;
use crate::progress::{ProgressEvent, ProgressSink};
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const BASE_EPOCHS: u32 = 15;
const SMALL_DATASET_EPOCHS: u32 = 10;
const LARGE_DATASET_EPOCHS: u32 = 25;
const MANY_CLASSES_BONUS: u32 = 5;
const MAX_EPOCHS: u32 = 30;

/// Metrics recorded for one synthetic epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochMetrics {
    pub epoch: u32,
    pub loss: f64,
    pub accuracy: f64,
    pub val_loss: f64,
    pub val_accuracy: f64,
}

/// Four equal-length metric sequences indexed by epoch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingHistory {
    pub loss: Vec<f64>,
    pub accuracy: Vec<f64>,
    pub val_loss: Vec<f64>,
    pub val_accuracy: Vec<f64>,
}

impl TrainingHistory {
    pub fn push(&mut self, metrics: &EpochMetrics) {
        self.loss.push(metrics.loss);
        self.accuracy.push(metrics.accuracy);
        self.val_loss.push(metrics.val_loss);
        self.val_accuracy.push(metrics.val_accuracy);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.loss.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loss.is_empty()
    }

    /// The last recorded epoch tuple, if any epoch ran.
    #[must_use]
    pub fn final_metrics(&self) -> Option<EpochMetrics> {
        let last = self.len().checked_sub(1)?;
        Some(EpochMetrics {
            epoch: last as u32,
            loss: self.loss[last],
            accuracy: self.accuracy[last],
            val_loss: self.val_loss[last],
            val_accuracy: self.val_accuracy[last],
        })
    }
}

/// How many synthetic epochs a dataset gets.
///
/// Pure function of dataset shape: base 15, small datasets (<50 images) drop
/// to 10, large ones (>200) rise to 25, more than 5 classes adds 5, capped
/// at 30.
#[must_use]
pub fn compute_epoch_count(dataset: &TrainingDataset) -> u32 {
    let total = dataset.total_images();
    let mut epochs = BASE_EPOCHS;
    if total < 50 {
        epochs = SMALL_DATASET_EPOCHS;
    }
    if total > 200 {
        epochs = LARGE_DATASET_EPOCHS;
    }
    if dataset.num_classes() > 5 {
        epochs += MANY_CLASSES_BONUS;
    }
    epochs.min(MAX_EPOCHS)
}

/// Run the synthetic epoch loop over a validated dataset.
///
/// Each epoch sleeps a randomized 100-500ms (the loop's only suspension
/// point) and appends one metrics tuple following a sigmoid learning curve:
/// accuracy climbs from chance level toward a target derived from dataset
/// size, loss decays toward a floor, and the validation variants add
/// multiplicative noise. All values are rounded to 4 decimal places.
///
/// The caller owns the random source, so a fixed-seed `StdRng` reproduces the
/// exact metric sequence. There is no cancellation: a started loop runs to
/// completion.
pub async fn run_epoch_loop(
    dataset: &TrainingDataset,
    model_id: &ModelId,
    rng: &mut StdRng,
    progress: &dyn ProgressSink,
) -> TrainingHistory {
    let epoch_count = compute_epoch_count(dataset);
    let total_images = dataset.total_images() as f64;
    let base_accuracy = 1.0 / dataset.num_classes() as f64;
    let target_accuracy = (0.85 + total_images / 1000.0).min(0.95);

    debug!(
        "starting epoch loop for {model_id}: {epoch_count} epochs over {} images",
        dataset.total_images()
    );
    progress.on_event(ProgressEvent::Started { model_id: model_id.clone(), epochs: epoch_count });

    let mut history = TrainingHistory::default();
    for epoch in 0..epoch_count {
        let delay = rng.random_range(100..=500);
        tokio::time::sleep(Duration::from_millis(delay)).await;

        let fraction = f64::from(epoch) / f64::from(epoch_count);
        let curve = sigmoid(8.0 * (fraction - 0.5));
        let accuracy = base_accuracy + (target_accuracy - base_accuracy) * curve;
        let loss = (2.5 * (1.0 - curve)).max(0.05);
        let val_accuracy = accuracy * (0.90 + rng.random::<f64>() * 0.08);
        let val_loss = loss * (1.10 + rng.random::<f64>() * 0.20);

        let metrics = EpochMetrics {
            epoch,
            loss: round4(loss),
            accuracy: round4(accuracy),
            val_loss: round4(val_loss),
            val_accuracy: round4(val_accuracy),
        };
        history.push(&metrics);
        progress.on_event(ProgressEvent::Epoch { model_id: model_id.clone(), metrics });
    }

    progress.on_event(ProgressEvent::Finished { model_id: model_id.clone() });
    history
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}
