use crate::artifacts::ModelId;
use crate::executor::EpochMetrics;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Started { model_id: ModelId, epochs: u32 },
    Epoch { model_id: ModelId, metrics: EpochMetrics },
    Finished { model_id: ModelId },
}

pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: ProgressEvent);
}

#[derive(Debug, Default)]
pub struct StdoutProgressSink;

impl ProgressSink for StdoutProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Started { model_id, epochs } => {
                println!("[train:{model_id}] started ({epochs} epochs)");
            }
            ProgressEvent::Epoch { model_id, metrics } => {
                println!(
                    "[train:{model_id}] epoch {}: loss={:.4} acc={:.4} val_loss={:.4} val_acc={:.4}",
                    metrics.epoch + 1,
                    metrics.loss,
                    metrics.accuracy,
                    metrics.val_loss,
                    metrics.val_accuracy
                );
            }
            ProgressEvent::Finished { model_id } => println!("[train:{model_id}] finished"),
        }
    }
}

/// Sink that discards every event.
#[derive(Debug, Default)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn on_event(&self, _event: ProgressEvent) {}
}

/// Snapshot returned by progress polling.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub status: String,
    pub epoch: u32,
    pub total_epochs: u32,
    pub accuracy: f64,
    pub loss: f64,
}

/// Polling stub: there is no job table behind this. The id is accepted for
/// interface compatibility but never consulted, so the snapshot is
/// synthesized and unrelated to any actual run. Concurrent runs cannot be
/// distinguished or cancelled through it.
#[must_use]
pub fn progress_snapshot(_training_id: &str) -> ProgressSnapshot {
    let mut rng = rand::rng();
    let total_epochs = 30;
    let epoch = rng.random_range(1..=total_epochs);
    ProgressSnapshot {
        status: "training".to_string(),
        epoch,
        total_epochs,
        accuracy: rng.random_range(0.5..0.95),
        loss: rng.random_range(0.1..1.5),
    }
}
