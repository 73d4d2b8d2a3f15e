use crate::executor::TrainingHistory;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Fixed input geometry every generated classifier declares.
pub const INPUT_WIDTH: usize = 224;
pub const INPUT_HEIGHT: usize = 224;
pub const INPUT_CHANNELS: usize = 3;

const CONV_FILTERS: [usize; 3] = [32, 64, 128];
const KERNEL_SIZE: usize = 3;
const DROPOUT_RATE: f64 = 0.5;

/// Bytes per stored weight (little-endian float32).
pub const BYTES_PER_PARAM: usize = 4;

/// Canonical file names inside a bundle directory.
pub const MODEL_FILE: &str = "model.json";
pub const WEIGHTS_FILE: &str = "model.weights.bin";
pub const METADATA_FILE: &str = "metadata.json";
pub const README_FILE: &str = "README.txt";

/// Storage identifier for a model, derived from the creation timestamp.
///
/// Uniqueness is assumed, not verified: two models generated in the same
/// millisecond collide and the later save wins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelId(pub String);

impl ModelId {
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("model-{}", Utc::now().timestamp_millis()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ModelId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ModelId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One tensor entry in the weights manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorSpec {
    pub name: String,
    pub shape: Vec<usize>,
    pub dtype: String,
}

/// A manifest group: which weight files exist and which tensors they hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightsManifestGroup {
    pub paths: Vec<String>,
    pub weights: Vec<TensorSpec>,
}

/// Contents of `model.json`: a layers-model style topology descriptor plus
/// the weights manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelTopology {
    pub model_topology: Value,
    pub format: String,
    pub generated_by: String,
    pub converted_by: Option<String>,
    pub weights_manifest: Vec<WeightsManifestGroup>,
}

/// Final-epoch metrics surfaced in metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalMetrics {
    pub accuracy: f64,
    pub loss: f64,
    pub val_accuracy: f64,
    pub val_loss: f64,
}

/// Stand-in metrics for a bundle generated from an empty history.
const FALLBACK_METRICS: FinalMetrics =
    FinalMetrics { accuracy: 0.85, loss: 0.25, val_accuracy: 0.80, val_loss: 0.30 };

/// How consumers are expected to prepare inputs before inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreprocessingConfig {
    pub target_width: usize,
    pub target_height: usize,
    pub channels: usize,
    /// Pixel value range after scaling.
    pub normalization: [f64; 2],
    pub channel_ordering: String,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            target_width: INPUT_WIDTH,
            target_height: INPUT_HEIGHT,
            channels: INPUT_CHANNELS,
            normalization: [0.0, 1.0],
            channel_ordering: "channels_last".to_string(),
        }
    }
}

/// File-name map recorded in metadata so consumers can locate bundle parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleFiles {
    pub model: String,
    pub weights: String,
    pub metadata: String,
    pub readme: String,
}

impl Default for BundleFiles {
    fn default() -> Self {
        Self {
            model: MODEL_FILE.to_string(),
            weights: WEIGHTS_FILE.to_string(),
            metadata: METADATA_FILE.to_string(),
            readme: README_FILE.to_string(),
        }
    }
}

/// Contents of `metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetadata {
    pub name: String,
    pub labels: Vec<String>,
    pub num_classes: usize,
    pub input_shape: [usize; 3],
    pub output_shape: [usize; 1],
    pub epochs: usize,
    pub training_history: TrainingHistory,
    pub final_metrics: FinalMetrics,
    pub weights_size_bytes: usize,
    pub created_at: DateTime<Utc>,
    pub preprocessing: PreprocessingConfig,
    pub files: BundleFiles,
}

/// The four-file artifact produced by one training run.
///
/// Immutable once persisted; there is no versioning or in-place update.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelBundle {
    pub topology: ModelTopology,
    pub weights: Vec<u8>,
    pub metadata: ModelMetadata,
    pub readme: String,
}

impl ModelBundle {
    /// The tensor descriptors riding inside the topology file.
    #[must_use]
    pub fn manifest(&self) -> &[TensorSpec] {
        self.topology
            .weights_manifest
            .first()
            .map_or(&[], |group| group.weights.as_slice())
    }
}

/// Analytic parameter count of the fixed architecture for a class count:
/// three 3x3 convolutions (32, 64, 128 filters) plus a dense softmax head fed
/// by global average pooling.
#[must_use]
pub fn total_params(num_classes: usize) -> usize {
    let mut params = 0;
    let mut in_channels = INPUT_CHANNELS;
    for filters in CONV_FILTERS {
        params += KERNEL_SIZE * KERNEL_SIZE * in_channels * filters + filters;
        in_channels = filters;
    }
    // Dense head: GAP leaves one feature per final conv filter.
    params + in_channels * num_classes + num_classes
}

/// Fill the flat weight buffer with `total_params` little-endian float32
/// values drawn uniformly from `[-limit, limit]`.
///
/// The bound uses the aggregate parameter count rather than per-layer
/// fan-in/fan-out, so this only approximates a fan-bounded initializer. The
/// weights are never fitted.
#[must_use]
pub fn generate_weights(num_classes: usize, rng: &mut StdRng) -> Vec<u8> {
    let count = total_params(num_classes);
    let limit = (6.0 / (count as f64 / 4.0)).sqrt();
    let mut buffer = Vec::with_capacity(count * BYTES_PER_PARAM);
    for _ in 0..count {
        let weight = rng.random_range(-limit..=limit) as f32;
        buffer.extend_from_slice(&weight.to_le_bytes());
    }
    buffer
}

/// Tensor descriptors for the fixed architecture, in layer order.
///
/// The declared shapes are descriptive only: nothing reconciles them against
/// how the flat buffer was filled, and only the total byte length is
/// guaranteed to agree with `generate_weights`.
#[must_use]
pub fn build_weights_manifest(num_classes: usize) -> Vec<TensorSpec> {
    let mut specs = Vec::new();
    let mut in_channels = INPUT_CHANNELS;
    for (index, filters) in CONV_FILTERS.iter().enumerate() {
        specs.push(TensorSpec {
            name: format!("conv{}/kernel", index + 1),
            shape: vec![KERNEL_SIZE, KERNEL_SIZE, in_channels, *filters],
            dtype: "float32".to_string(),
        });
        specs.push(TensorSpec {
            name: format!("conv{}/bias", index + 1),
            shape: vec![*filters],
            dtype: "float32".to_string(),
        });
        in_channels = *filters;
    }
    specs.push(TensorSpec {
        name: "predictions/kernel".to_string(),
        shape: vec![in_channels, num_classes],
        dtype: "float32".to_string(),
    });
    specs.push(TensorSpec {
        name: "predictions/bias".to_string(),
        shape: vec![num_classes],
        dtype: "float32".to_string(),
    });
    specs
}

/// The fixed layer stack, parameterized only by class count.
fn build_layer_stack(model_name: &str, num_classes: usize) -> Value {
    let layers = json!([
        {
            "class_name": "Conv2D",
            "config": {
                "name": "conv1",
                "filters": CONV_FILTERS[0],
                "kernel_size": [KERNEL_SIZE, KERNEL_SIZE],
                "activation": "relu",
                "padding": "same",
                "batch_input_shape": [null, INPUT_HEIGHT, INPUT_WIDTH, INPUT_CHANNELS],
            }
        },
        {
            "class_name": "MaxPooling2D",
            "config": { "name": "pool1", "pool_size": [2, 2] }
        },
        {
            "class_name": "Conv2D",
            "config": {
                "name": "conv2",
                "filters": CONV_FILTERS[1],
                "kernel_size": [KERNEL_SIZE, KERNEL_SIZE],
                "activation": "relu",
                "padding": "same",
            }
        },
        {
            "class_name": "MaxPooling2D",
            "config": { "name": "pool2", "pool_size": [2, 2] }
        },
        {
            "class_name": "Conv2D",
            "config": {
                "name": "conv3",
                "filters": CONV_FILTERS[2],
                "kernel_size": [KERNEL_SIZE, KERNEL_SIZE],
                "activation": "relu",
                "padding": "same",
            }
        },
        {
            "class_name": "GlobalAveragePooling2D",
            "config": { "name": "global_pool" }
        },
        {
            "class_name": "Dropout",
            "config": { "name": "dropout", "rate": DROPOUT_RATE }
        },
        {
            "class_name": "Dense",
            "config": {
                "name": "predictions",
                "units": num_classes,
                "activation": "softmax",
            }
        },
    ]);

    json!({
        "class_name": "Sequential",
        "config": { "name": model_name, "layers": layers }
    })
}

/// Build the `model.json` descriptor for a class count.
#[must_use]
pub fn build_topology(model_name: &str, num_classes: usize) -> ModelTopology {
    ModelTopology {
        model_topology: build_layer_stack(model_name, num_classes),
        format: "layers-model".to_string(),
        generated_by: format!("atelier {}", env!("CARGO_PKG_VERSION")),
        converted_by: None,
        weights_manifest: vec![WeightsManifestGroup {
            paths: vec![WEIGHTS_FILE.to_string()],
            weights: build_weights_manifest(num_classes),
        }],
    }
}

/// Assemble a complete bundle from class labels and a finished run's history.
///
/// An empty history falls back to stand-in final metrics rather than failing;
/// the history itself is embedded as-is.
#[must_use]
pub fn build_bundle(
    model_name: &str,
    labels: &[String],
    history: &TrainingHistory,
    rng: &mut StdRng,
) -> ModelBundle {
    let num_classes = labels.len();
    let topology = build_topology(model_name, num_classes);
    let weights = generate_weights(num_classes, rng);

    let final_metrics = history.final_metrics().map_or(FALLBACK_METRICS, |m| FinalMetrics {
        accuracy: m.accuracy,
        loss: m.loss,
        val_accuracy: m.val_accuracy,
        val_loss: m.val_loss,
    });

    let metadata = ModelMetadata {
        name: model_name.to_string(),
        labels: labels.to_vec(),
        num_classes,
        input_shape: [INPUT_HEIGHT, INPUT_WIDTH, INPUT_CHANNELS],
        output_shape: [num_classes],
        epochs: history.len(),
        training_history: history.clone(),
        final_metrics,
        weights_size_bytes: weights.len(),
        created_at: Utc::now(),
        preprocessing: PreprocessingConfig::default(),
        files: BundleFiles::default(),
    };

    let readme = build_readme(&metadata);
    ModelBundle { topology, weights, metadata, readme }
}

/// Human-readable `README.txt` rendered from the metadata. Never parsed back.
fn build_readme(metadata: &ModelMetadata) -> String {
    let metrics = metadata.final_metrics;
    let mut out = String::new();
    out.push_str(&metadata.name);
    out.push('\n');
    out.push_str(&"=".repeat(metadata.name.len()));
    out.push_str("\n\n");
    out.push_str(&format!(
        "Image classification model over {} classes, trained for {} epochs.\n\n",
        metadata.num_classes, metadata.epochs
    ));
    out.push_str("Classes:\n");
    for label in &metadata.labels {
        out.push_str(&format!("  - {label}\n"));
    }
    out.push_str("\nFinal metrics:\n");
    out.push_str(&format!("  accuracy:     {:.4}\n", metrics.accuracy));
    out.push_str(&format!("  loss:         {:.4}\n", metrics.loss));
    out.push_str(&format!("  val accuracy: {:.4}\n", metrics.val_accuracy));
    out.push_str(&format!("  val loss:     {:.4}\n", metrics.val_loss));
    out.push_str("\nFiles:\n");
    out.push_str("  model.json         - topology and weights manifest\n");
    out.push_str("  model.weights.bin  - little-endian float32 weight buffer\n");
    out.push_str("  metadata.json      - labels, preprocessing and training history\n");
    out.push_str("  README.txt         - this file\n\n");
    out.push_str(&format!(
        "Inputs are resized to {}x{} RGB (channels-last) and scaled to the\n[0, 1] range before inference.\n\n",
        metadata.preprocessing.target_width, metadata.preprocessing.target_height
    ));
    out.push_str(&format!(
        "Generated by atelier on {}.\n",
        metadata.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    out
}
