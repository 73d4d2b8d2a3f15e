//! Atelier Training
//!
//! Simulated training primitives for:
//! - Validating labeled image datasets (`validate`)
//! - Producing a synthetic per-epoch metrics history (`run_epoch_loop`)
//! - Generating model artifact bundles (`build_bundle`)
//! - Driving a whole run through the `Trainer` seam
//!
//! No real machine learning happens here: metrics follow a parametrized
//! curve and weights are randomly initialized, never fitted.

pub mod artifacts;
pub mod builders;
pub mod dataset;
pub mod error;
pub mod executor;
pub mod progress;
pub mod trainer;
pub mod validator;

pub use artifacts::{
    ModelBundle, ModelId, ModelMetadata, ModelTopology, TensorSpec, build_bundle, total_params,
};
pub use builders::{DatasetBuildOptions, build_dataset_from_dir};
pub use dataset::{TrainingClass, TrainingDataset};
pub use error::{TrainingError, TrainingResult};
pub use executor::{EpochMetrics, TrainingHistory, compute_epoch_count, run_epoch_loop};
pub use progress::{
    NullProgressSink, ProgressEvent, ProgressSink, ProgressSnapshot, StdoutProgressSink,
    progress_snapshot,
};
pub use trainer::{SyntheticTrainer, TrainedModel, Trainer};
pub use validator::{ValidationReport, ValidatorConfig, validate};
