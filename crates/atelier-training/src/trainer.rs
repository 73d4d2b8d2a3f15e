use crate::artifacts::{ModelBundle, ModelId, build_bundle};
use crate::dataset::TrainingDataset;
use crate::error::{TrainingError, TrainingResult};
use crate::executor::run_epoch_loop;
use crate::progress::ProgressSink;
use crate::validator::{ValidatorConfig, validate};
use async_trait::async_trait;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

/// Output of a training run: the generated id plus the artifact bundle.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub model_id: ModelId,
    pub bundle: ModelBundle,
}

#[async_trait]
pub trait Trainer: Send + Sync {
    fn id(&self) -> &'static str;

    async fn run(
        &self,
        dataset: &TrainingDataset,
        progress: &dyn ProgressSink,
    ) -> TrainingResult<TrainedModel>;
}

/// The one trainer implementation: validates the dataset, walks the synthetic
/// epoch loop, and assembles the artifact bundle.
///
/// A fixed seed makes a whole run reproducible, metrics and weights both.
#[derive(Debug, Clone, Default)]
pub struct SyntheticTrainer {
    config: ValidatorConfig,
    model_name: Option<String>,
    seed: Option<u64>,
}

impl SyntheticTrainer {
    #[must_use]
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config, model_name: None, seed: None }
    }

    #[must_use]
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn rng(&self) -> StdRng {
        self.seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64)
    }
}

#[async_trait]
impl Trainer for SyntheticTrainer {
    fn id(&self) -> &'static str {
        "synthetic"
    }

    async fn run(
        &self,
        dataset: &TrainingDataset,
        progress: &dyn ProgressSink,
    ) -> TrainingResult<TrainedModel> {
        let report = validate(dataset, &self.config);
        if let Some(error) = report.error {
            return Err(TrainingError::InvalidDataset(error));
        }

        let model_id = ModelId::generate();
        let name = self.model_name.clone().unwrap_or_else(|| model_id.0.clone());
        let mut rng = self.rng();

        let history = run_epoch_loop(dataset, &model_id, &mut rng, progress).await;
        let bundle = build_bundle(&name, &dataset.labels(), &history, &mut rng);

        info!(
            "trained {model_id}: {} classes, {} epochs, final accuracy {:.4}",
            bundle.metadata.num_classes,
            bundle.metadata.epochs,
            bundle.metadata.final_metrics.accuracy
        );
        Ok(TrainedModel { model_id, bundle })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::total_params;
    use crate::dataset::TrainingClass;
    use crate::executor::compute_epoch_count;
    use crate::progress::NullProgressSink;
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD as BASE64;

    fn fruit_dataset() -> TrainingDataset {
        let image = |seed: u8| format!("data:image/jpeg;base64,{}", BASE64.encode([seed, 1, 2]));
        TrainingDataset {
            classes: vec![
                TrainingClass {
                    name: "Apples".to_string(),
                    images: (0..12).map(|i| image(i)).collect(),
                },
                TrainingClass {
                    name: "Oranges".to_string(),
                    images: (100..112).map(|i| image(i)).collect(),
                },
            ],
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_rejects_invalid_dataset() {
        let trainer = SyntheticTrainer::default();
        let dataset = TrainingDataset { classes: vec![] };
        let err = trainer.run(&dataset, &NullProgressSink).await.unwrap_err();
        assert!(matches!(err, TrainingError::InvalidDataset(_)));
        assert!(err.to_string().contains("need at least 2 classes"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_produces_consistent_bundle() {
        let dataset = fruit_dataset();
        let trainer = SyntheticTrainer::default().with_model_name("fruit").with_seed(42);
        let trained = trainer.run(&dataset, &NullProgressSink).await.unwrap();

        // 24 images puts this in the small-dataset epoch band.
        let epochs = compute_epoch_count(&dataset) as usize;
        assert_eq!(epochs, 10);
        assert_eq!(trained.bundle.metadata.epochs, epochs);
        assert_eq!(trained.bundle.metadata.training_history.len(), epochs);
        assert_eq!(trained.bundle.weights.len(), 4 * total_params(2));
        assert_eq!(trained.bundle.metadata.labels, vec!["Apples", "Oranges"]);
        assert!(trained.model_id.0.starts_with("model-"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_seeded_runs_match() {
        let dataset = fruit_dataset();
        let trainer = SyntheticTrainer::default().with_model_name("fruit").with_seed(7);
        let first = trainer.run(&dataset, &NullProgressSink).await.unwrap();
        let second = trainer.run(&dataset, &NullProgressSink).await.unwrap();
        assert_eq!(first.bundle.weights, second.bundle.weights);
        assert_eq!(
            first.bundle.metadata.training_history,
            second.bundle.metadata.training_history
        );
    }
}
