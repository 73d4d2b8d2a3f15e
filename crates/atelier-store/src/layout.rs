use atelier_training::ModelId;
use atelier_training::artifacts::{METADATA_FILE, MODEL_FILE, README_FILE, WEIGHTS_FILE};
use std::path::{Path, PathBuf};

/// Lightweight index file enabling listing without reading full bundles.
pub const INFO_FILE: &str = "model-info.json";

/// Filesystem layout for stored bundles: one subdirectory per model id under
/// a root, holding the four bundle files plus `model-info.json`.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn model_dir(&self, id: &ModelId) -> PathBuf {
        self.root.join(id.as_str())
    }

    #[must_use]
    pub fn topology_path(&self, id: &ModelId) -> PathBuf {
        self.model_dir(id).join(MODEL_FILE)
    }

    #[must_use]
    pub fn weights_path(&self, id: &ModelId) -> PathBuf {
        self.model_dir(id).join(WEIGHTS_FILE)
    }

    #[must_use]
    pub fn metadata_path(&self, id: &ModelId) -> PathBuf {
        self.model_dir(id).join(METADATA_FILE)
    }

    #[must_use]
    pub fn readme_path(&self, id: &ModelId) -> PathBuf {
        self.model_dir(id).join(README_FILE)
    }

    #[must_use]
    pub fn info_path(&self, id: &ModelId) -> PathBuf {
        self.model_dir(id).join(INFO_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_paths() {
        let temp = TempDir::new().unwrap();
        let layout = StoreLayout::new(temp.path().to_path_buf());
        let id = ModelId::from("model-1700000000000");

        assert_eq!(layout.model_dir(&id), temp.path().join("model-1700000000000"));
        assert!(layout.topology_path(&id).ends_with("model-1700000000000/model.json"));
        assert!(layout.weights_path(&id).ends_with("model.weights.bin"));
        assert!(layout.info_path(&id).ends_with("model-info.json"));
    }
}
