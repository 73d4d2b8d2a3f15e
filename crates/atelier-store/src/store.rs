use crate::error::{StoreError, StoreResult};
use crate::layout::{INFO_FILE, StoreLayout};
use atelier_training::artifacts::{METADATA_FILE, MODEL_FILE, README_FILE, WEIGHTS_FILE};
use atelier_training::{ModelBundle, ModelId, ModelMetadata, ModelTopology};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Index record written as `model-info.json` alongside each bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub id: ModelId,
    pub name: String,
    pub labels: Vec<String>,
    pub num_classes: usize,
    pub created_at: DateTime<Utc>,
    /// Bytes across the four bundle files (the index file itself not counted).
    pub size_bytes: u64,
    pub final_accuracy: f64,
}

/// Filesystem-backed store for model bundles.
///
/// One subdirectory per model id. Bundles are immutable once published; a
/// duplicate save silently replaces the previous bundle, and ids are never
/// checked for collisions.
#[derive(Debug, Clone)]
pub struct ModelStore {
    layout: StoreLayout,
}

impl ModelStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: &Path) -> StoreResult<Self> {
        fs::create_dir_all(root)?;
        Ok(Self { layout: StoreLayout::new(root.to_path_buf()) })
    }

    #[must_use]
    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Persist a bundle under `id`, returning the derived index record.
    ///
    /// All five files are staged in a temporary directory under the root and
    /// published with a single rename, so concurrent saves of the same id
    /// cannot interleave files from two runs. Replacing an existing bundle
    /// removes the old directory first; a reader racing that replacement can
    /// observe NotFound but never a mixed bundle.
    pub fn save_model(&self, id: &ModelId, bundle: &ModelBundle) -> StoreResult<ModelInfo> {
        let topology_json = serde_json::to_string_pretty(&bundle.topology)?;
        let metadata_json = serde_json::to_string_pretty(&bundle.metadata)?;
        let size_bytes = (topology_json.len()
            + metadata_json.len()
            + bundle.readme.len()
            + bundle.weights.len()) as u64;

        let info = ModelInfo {
            id: id.clone(),
            name: bundle.metadata.name.clone(),
            labels: bundle.metadata.labels.clone(),
            num_classes: bundle.metadata.num_classes,
            created_at: bundle.metadata.created_at,
            size_bytes,
            final_accuracy: bundle.metadata.final_metrics.accuracy,
        };
        let info_json = serde_json::to_string_pretty(&info)?;

        let staging = self.layout.root().join(format!(".staging-{id}-{}", Uuid::new_v4()));
        fs::create_dir_all(&staging)?;
        let staged = write_bundle_files(
            &staging,
            &topology_json,
            &bundle.weights,
            &metadata_json,
            &bundle.readme,
            &info_json,
        );
        if let Err(err) = staged {
            let _ = fs::remove_dir_all(&staging);
            return Err(err);
        }

        let dest = self.layout.model_dir(id);
        if dest.exists() {
            debug!("replacing existing bundle for {id}");
            fs::remove_dir_all(&dest)?;
        }
        fs::rename(&staging, &dest)?;

        info!("saved model {id} ({size_bytes} bytes)");
        Ok(info)
    }

    /// Load the full bundle stored under `id`.
    ///
    /// A missing directory or any missing required file is `NotFound`; a file
    /// that exists but does not parse is `Corrupt`.
    pub fn load_model(&self, id: &ModelId) -> StoreResult<ModelBundle> {
        let topology_path = self.layout.topology_path(id);
        let topology_bytes = self.read_required(id, &topology_path)?;
        let topology: ModelTopology = serde_json::from_slice(&topology_bytes)
            .map_err(|source| StoreError::Corrupt { path: topology_path, source })?;

        let weights = self.read_required(id, &self.layout.weights_path(id))?;

        let metadata_path = self.layout.metadata_path(id);
        let metadata_bytes = self.read_required(id, &metadata_path)?;
        let metadata: ModelMetadata = serde_json::from_slice(&metadata_bytes)
            .map_err(|source| StoreError::Corrupt { path: metadata_path, source })?;

        let readme_bytes = self.read_required(id, &self.layout.readme_path(id))?;
        let readme = String::from_utf8_lossy(&readme_bytes).into_owned();

        Ok(ModelBundle { topology, weights, metadata, readme })
    }

    /// Presence-only adapter over `load_model`: absent models come back as
    /// `Ok(None)` rather than an error.
    pub fn try_load_model(&self, id: &ModelId) -> StoreResult<Option<ModelBundle>> {
        match self.load_model(id) {
            Ok(bundle) => Ok(Some(bundle)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// List index records for every stored model, newest first.
    ///
    /// Each index file is read independently; an entry that cannot be read or
    /// parsed is logged and skipped, never failing the whole listing.
    pub fn list_models(&self) -> StoreResult<Vec<ModelInfo>> {
        let entries = match fs::read_dir(self.layout.root()) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut models = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            // Dot-prefixed directories are in-flight staging, not models.
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let info_path = path.join(INFO_FILE);
            match read_info(&info_path) {
                Ok(info) => models.push(info),
                Err(err) => {
                    warn!("skipping unreadable model index {}: {err}", info_path.display());
                }
            }
        }

        models.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(models)
    }

    /// Remove a stored model. `Ok(false)` when nothing was stored under the
    /// id; there is no distinguishing error for that case.
    pub fn delete_model(&self, id: &ModelId) -> StoreResult<bool> {
        let dir = self.layout.model_dir(id);
        if !dir.exists() {
            debug!("delete requested for absent model {id}");
            return Ok(false);
        }
        fs::remove_dir_all(&dir)?;
        info!("deleted model {id}");
        Ok(true)
    }

    fn read_required(&self, id: &ModelId, path: &Path) -> StoreResult<Vec<u8>> {
        match fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(id.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn write_bundle_files(
    dir: &Path,
    topology_json: &str,
    weights: &[u8],
    metadata_json: &str,
    readme: &str,
    info_json: &str,
) -> StoreResult<()> {
    fs::write(dir.join(MODEL_FILE), topology_json)?;
    fs::write(dir.join(WEIGHTS_FILE), weights)?;
    fs::write(dir.join(METADATA_FILE), metadata_json)?;
    fs::write(dir.join(README_FILE), readme)?;
    fs::write(dir.join(INFO_FILE), info_json)?;
    Ok(())
}

fn read_info(path: &Path) -> StoreResult<ModelInfo> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes)
        .map_err(|source| StoreError::Corrupt { path: path.to_path_buf(), source })
}
