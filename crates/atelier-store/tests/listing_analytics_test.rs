//! Listing resilience and storage statistics.

use atelier_store::{AVAILABLE_SPACE_BYTES, ModelStore, StoreError, model_stats, storage_stats};
use atelier_training::{ModelBundle, ModelId, TrainingHistory, build_bundle};
use chrono::{Duration, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::TempDir;

fn bundle_created_at(name: &str, minutes_ago: i64) -> ModelBundle {
    let labels = vec!["a".to_string(), "b".to_string()];
    let mut rng = StdRng::seed_from_u64(minutes_ago as u64);
    let mut bundle = build_bundle(name, &labels, &TrainingHistory::default(), &mut rng);
    bundle.metadata.created_at = Utc::now() - Duration::minutes(minutes_ago);
    bundle
}

#[test]
fn test_list_on_empty_store_is_empty() {
    let temp = TempDir::new().unwrap();
    let store = ModelStore::open(temp.path()).unwrap();
    assert!(store.list_models().unwrap().is_empty());
}

#[test]
fn test_list_sorts_newest_first() {
    let temp = TempDir::new().unwrap();
    let store = ModelStore::open(temp.path()).unwrap();
    for (name, age) in [("oldest", 30), ("newest", 1), ("middle", 10)] {
        let id = ModelId::from(format!("model-{name}"));
        store.save_model(&id, &bundle_created_at(name, age)).unwrap();
    }

    let names: Vec<String> =
        store.list_models().unwrap().into_iter().map(|info| info.name).collect();
    assert_eq!(names, vec!["newest", "middle", "oldest"]);
}

#[test]
fn test_list_skips_unreadable_index_entries() {
    let temp = TempDir::new().unwrap();
    let store = ModelStore::open(temp.path()).unwrap();
    let good = ModelId::from("model-good");
    let bad = ModelId::from("model-bad");
    store.save_model(&good, &bundle_created_at("good", 1)).unwrap();
    store.save_model(&bad, &bundle_created_at("bad", 2)).unwrap();

    std::fs::write(temp.path().join(bad.as_str()).join("model-info.json"), "garbage").unwrap();

    let listed = store.list_models().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, good);
}

#[test]
fn test_list_skips_missing_index_and_stray_files() {
    let temp = TempDir::new().unwrap();
    let store = ModelStore::open(temp.path()).unwrap();
    let id = ModelId::from("model-ok");
    store.save_model(&id, &bundle_created_at("ok", 1)).unwrap();

    // A bundle directory that lost its index, and a stray file in the root.
    std::fs::create_dir(temp.path().join("model-no-index")).unwrap();
    std::fs::write(temp.path().join("stray.txt"), "ignore me").unwrap();

    let listed = store.list_models().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id);
}

#[test]
fn test_storage_stats_counts_models_and_bytes() {
    let temp = TempDir::new().unwrap();
    let store = ModelStore::open(temp.path()).unwrap();
    store.save_model(&ModelId::from("model-a"), &bundle_created_at("a", 1)).unwrap();
    store.save_model(&ModelId::from("model-b"), &bundle_created_at("b", 2)).unwrap();

    let stats = storage_stats(&store).unwrap();
    assert_eq!(stats.model_count, 2);
    // Two weight buffers alone dominate the on-disk footprint.
    assert!(stats.total_size_bytes > 2 * 374_024);
    assert_eq!(stats.available_space_bytes, AVAILABLE_SPACE_BYTES);
}

#[test]
fn test_model_stats_counts_the_five_files() {
    let temp = TempDir::new().unwrap();
    let store = ModelStore::open(temp.path()).unwrap();
    let id = ModelId::from("model-a");
    store.save_model(&id, &bundle_created_at("a", 1)).unwrap();

    let stats = model_stats(&store, &id).unwrap();
    assert_eq!(stats.file_count, 5);
    assert!(stats.size_bytes > 374_024);
}

#[test]
fn test_model_stats_for_missing_model_is_not_found() {
    let temp = TempDir::new().unwrap();
    let store = ModelStore::open(temp.path()).unwrap();
    let result = model_stats(&store, &ModelId::from("model-missing"));
    assert!(matches!(result, Err(StoreError::NotFound(_))));
}
