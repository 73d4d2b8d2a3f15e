use crate::dataset::{TrainingDataset, decode_image};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A dataset always needs at least two classes to classify between.
const MIN_CLASSES: usize = 2;

/// Tunable validation thresholds.
///
/// `min_images_per_class` is deliberately configuration rather than a
/// constant: deployments have run with both 10 and 20 here, and neither value
/// is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub min_images_per_class: usize,
    pub min_total_images: usize,
    /// Largest allowed ratio between the biggest and smallest class.
    pub max_class_imbalance: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self { min_images_per_class: 10, min_total_images: 10, max_class_imbalance: 5.0 }
    }
}

/// Outcome of dataset validation.
///
/// Invalid datasets carry the first violated rule as a single message.
/// Validation itself never fails; malformed input is a value, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationReport {
    fn valid() -> Self {
        Self { is_valid: true, error: None }
    }

    fn invalid(message: impl Into<String>) -> Self {
        Self { is_valid: false, error: Some(message.into()) }
    }
}

/// Check a dataset before any training work begins.
///
/// Rules run in a fixed order and the report names only the first violation:
/// class count, then per-class checks (name, image count, image encoding),
/// then dataset-wide checks (total size, balance, unique names). Downstream
/// components assume a dataset that passed here.
#[must_use]
pub fn validate(dataset: &TrainingDataset, config: &ValidatorConfig) -> ValidationReport {
    if dataset.num_classes() < MIN_CLASSES {
        return ValidationReport::invalid("need at least 2 classes");
    }

    for class in &dataset.classes {
        let name = class.name.trim();
        if name.is_empty() {
            return ValidationReport::invalid("every class needs a non-empty name");
        }
        if class.images.is_empty() {
            return ValidationReport::invalid(format!("class '{name}' has no images"));
        }
        if class.images.len() < config.min_images_per_class {
            return ValidationReport::invalid(format!(
                "class '{name}' needs at least {} images, got {}",
                config.min_images_per_class,
                class.images.len()
            ));
        }
        for (idx, image) in class.images.iter().enumerate() {
            if decode_image(image).is_none() {
                return ValidationReport::invalid(format!(
                    "class '{name}' image {} is not a valid base64 image data-URL",
                    idx + 1
                ));
            }
        }
    }

    let total = dataset.total_images();
    if total < config.min_total_images {
        return ValidationReport::invalid(format!(
            "need at least {} images in total, got {total}",
            config.min_total_images
        ));
    }

    let counts = dataset.image_counts();
    let largest = counts.iter().copied().max().unwrap_or(0);
    let smallest = counts.iter().copied().min().unwrap_or(0);
    if largest as f64 / smallest as f64 > config.max_class_imbalance {
        return ValidationReport::invalid(format!(
            "class sizes are too imbalanced (largest has {largest} images, smallest has {smallest})"
        ));
    }

    let mut seen = HashSet::new();
    for class in &dataset.classes {
        if !seen.insert(class.name.trim().to_lowercase()) {
            return ValidationReport::invalid(format!(
                "duplicate class name '{}'",
                class.name.trim()
            ));
        }
    }

    ValidationReport::valid()
}
