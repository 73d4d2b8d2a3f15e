use crate::error::{StoreError, StoreResult};
use crate::store::ModelStore;
use atelier_training::ModelId;
use serde::Serialize;
use std::path::Path;
use walkdir::WalkDir;

/// Placeholder headroom figure. This is NOT an OS query; callers must not
/// treat it as actual free disk space.
pub const AVAILABLE_SPACE_BYTES: u64 = 10 * 1024 * 1024 * 1024;

/// Aggregate statistics over everything under the store root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    pub model_count: usize,
    pub total_size_bytes: u64,
    pub available_space_bytes: u64,
}

/// Size breakdown for one stored model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStats {
    pub id: ModelId,
    pub size_bytes: u64,
    pub file_count: usize,
}

/// Walk the whole store and aggregate counts and sizes.
pub fn storage_stats(store: &ModelStore) -> StoreResult<StorageStats> {
    let root = store.layout().root();
    let mut model_count = 0;
    match std::fs::read_dir(root) {
        Ok(entries) => {
            for entry in entries {
                let entry = entry?;
                if entry.path().is_dir() && !entry.file_name().to_string_lossy().starts_with('.') {
                    model_count += 1;
                }
            }
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(err.into()),
    }

    Ok(StorageStats {
        model_count,
        total_size_bytes: dir_size(root),
        available_space_bytes: AVAILABLE_SPACE_BYTES,
    })
}

/// Size and file count for one model's directory.
pub fn model_stats(store: &ModelStore, id: &ModelId) -> StoreResult<ModelStats> {
    let dir = store.layout().model_dir(id);
    if !dir.is_dir() {
        return Err(StoreError::NotFound(id.clone()));
    }

    let mut size_bytes = 0;
    let mut file_count = 0;
    for entry in WalkDir::new(&dir).into_iter().filter_map(Result::ok) {
        if entry.file_type().is_file() {
            file_count += 1;
            size_bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
        }
    }

    Ok(ModelStats { id: id.clone(), size_bytes, file_count })
}

/// Depth-first sum of file sizes. Entries that vanish mid-walk are skipped.
fn dir_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum()
}
