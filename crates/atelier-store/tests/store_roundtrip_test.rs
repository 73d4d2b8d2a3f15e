//! Save/load/delete behavior of the filesystem model store.

use atelier_store::{ModelStore, StoreError};
use atelier_training::{ModelBundle, ModelId, TrainingHistory, build_bundle};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tempfile::TempDir;

fn sample_bundle(name: &str, seed: u64) -> ModelBundle {
    let labels = vec!["Apples".to_string(), "Oranges".to_string()];
    let mut rng = StdRng::seed_from_u64(seed);
    build_bundle(name, &labels, &TrainingHistory::default(), &mut rng)
}

#[test]
fn test_save_then_load_round_trips() {
    let temp = TempDir::new().unwrap();
    let store = ModelStore::open(temp.path()).unwrap();
    let id = ModelId::from("model-1700000000001");
    let bundle = sample_bundle("fruit", 1);

    let info = store.save_model(&id, &bundle).unwrap();
    assert_eq!(info.id, id);
    assert_eq!(info.num_classes, 2);
    assert!(info.size_bytes > bundle.weights.len() as u64);

    let loaded = store.load_model(&id).unwrap();
    assert_eq!(loaded, bundle);
}

#[test]
fn test_bundle_directory_holds_five_files() {
    let temp = TempDir::new().unwrap();
    let store = ModelStore::open(temp.path()).unwrap();
    let id = ModelId::from("model-1700000000002");
    store.save_model(&id, &sample_bundle("fruit", 2)).unwrap();

    let dir = temp.path().join(id.as_str());
    for file in ["model.json", "model.weights.bin", "metadata.json", "README.txt", "model-info.json"]
    {
        assert!(dir.join(file).is_file(), "missing {file}");
    }
    // Staging directories must not survive a successful save.
    let leftovers: Vec<_> = std::fs::read_dir(temp.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with('.'))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_load_missing_model_is_not_found() {
    let temp = TempDir::new().unwrap();
    let store = ModelStore::open(temp.path()).unwrap();
    let id = ModelId::from("model-does-not-exist");

    assert!(matches!(store.load_model(&id), Err(StoreError::NotFound(_))));
    assert!(store.try_load_model(&id).unwrap().is_none());
}

#[test]
fn test_load_with_missing_weights_file_is_not_found() {
    let temp = TempDir::new().unwrap();
    let store = ModelStore::open(temp.path()).unwrap();
    let id = ModelId::from("model-1700000000003");
    store.save_model(&id, &sample_bundle("fruit", 3)).unwrap();

    std::fs::remove_file(temp.path().join(id.as_str()).join("model.weights.bin")).unwrap();
    assert!(matches!(store.load_model(&id), Err(StoreError::NotFound(_))));
}

#[test]
fn test_load_with_garbled_metadata_is_corrupt() {
    let temp = TempDir::new().unwrap();
    let store = ModelStore::open(temp.path()).unwrap();
    let id = ModelId::from("model-1700000000004");
    store.save_model(&id, &sample_bundle("fruit", 4)).unwrap();

    std::fs::write(temp.path().join(id.as_str()).join("metadata.json"), "{not json").unwrap();
    assert!(matches!(store.load_model(&id), Err(StoreError::Corrupt { .. })));
}

#[test]
fn test_duplicate_save_replaces_the_bundle() {
    let temp = TempDir::new().unwrap();
    let store = ModelStore::open(temp.path()).unwrap();
    let id = ModelId::from("model-1700000000005");

    store.save_model(&id, &sample_bundle("first", 5)).unwrap();
    store.save_model(&id, &sample_bundle("second", 6)).unwrap();

    let loaded = store.load_model(&id).unwrap();
    assert_eq!(loaded.metadata.name, "second");
}

#[test]
fn test_delete_then_load_is_not_found() {
    let temp = TempDir::new().unwrap();
    let store = ModelStore::open(temp.path()).unwrap();
    let id = ModelId::from("model-1700000000006");
    store.save_model(&id, &sample_bundle("fruit", 7)).unwrap();

    assert!(store.delete_model(&id).unwrap());
    assert!(matches!(store.load_model(&id), Err(StoreError::NotFound(_))));
}

#[test]
fn test_delete_missing_model_reports_false() {
    let temp = TempDir::new().unwrap();
    let store = ModelStore::open(temp.path()).unwrap();
    let deleted = store.delete_model(&ModelId::from("does-not-exist")).unwrap();
    assert!(!deleted);
}
