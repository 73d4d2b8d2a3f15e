use anyhow::{Context, Result, bail};
use atelier_store::{ModelStore, StoreError, model_stats, package_bundle, storage_stats};
use atelier_training::{
    DatasetBuildOptions, ModelId, StdoutProgressSink, SyntheticTrainer, Trainer, ValidatorConfig,
    build_dataset_from_dir,
};
use std::path::{Path, PathBuf};

pub async fn train(
    store_root: &Path,
    data: &Path,
    name: Option<String>,
    seed: Option<u64>,
    config: Option<&Path>,
) -> Result<()> {
    let config = match config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            toml::from_str::<ValidatorConfig>(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ValidatorConfig::default(),
    };

    let dataset = build_dataset_from_dir(data, &DatasetBuildOptions::default())?;
    println!(
        "dataset: {} classes, {} images",
        dataset.num_classes(),
        dataset.total_images()
    );

    let mut trainer = SyntheticTrainer::new(config);
    if let Some(name) = name {
        trainer = trainer.with_model_name(name);
    }
    if let Some(seed) = seed {
        trainer = trainer.with_seed(seed);
    }

    let trained = trainer.run(&dataset, &StdoutProgressSink).await?;
    let store = ModelStore::open(store_root)?;
    let info = store.save_model(&trained.model_id, &trained.bundle)?;
    println!(
        "saved {} ({} classes, final accuracy {:.4}, {})",
        info.id,
        info.num_classes,
        info.final_accuracy,
        human_size(info.size_bytes)
    );
    Ok(())
}

pub fn list(store_root: &Path) -> Result<()> {
    let store = ModelStore::open(store_root)?;
    let models = store.list_models()?;
    if models.is_empty() {
        println!("no models stored");
        return Ok(());
    }
    for info in models {
        println!(
            "{}  {}  {} classes  acc {:.4}  {}",
            info.id,
            info.created_at.format("%Y-%m-%d %H:%M"),
            info.num_classes,
            info.final_accuracy,
            human_size(info.size_bytes)
        );
    }
    Ok(())
}

pub fn export(store_root: &Path, id: &str, output: Option<PathBuf>) -> Result<()> {
    let store = ModelStore::open(store_root)?;
    let id = ModelId::from(id);
    let bundle = match store.load_model(&id) {
        Ok(bundle) => bundle,
        Err(StoreError::NotFound(_)) => bail!("model {id} is not stored"),
        Err(err) => return Err(err.into()),
    };

    let artifact = package_bundle(&bundle)?;
    let path = output
        .unwrap_or_else(|| PathBuf::from(format!("{id}.{}", artifact.file_extension())));
    std::fs::write(&path, artifact.bytes())
        .with_context(|| format!("writing {}", path.display()))?;
    println!("wrote {} ({})", path.display(), artifact.content_type());
    Ok(())
}

pub fn delete(store_root: &Path, id: &str) -> Result<()> {
    let store = ModelStore::open(store_root)?;
    let id = ModelId::from(id);
    if store.delete_model(&id)? {
        println!("deleted {id}");
    } else {
        println!("model {id} is not stored");
    }
    Ok(())
}

pub fn stats(store_root: &Path) -> Result<()> {
    let store = ModelStore::open(store_root)?;
    let stats = storage_stats(&store)?;
    println!("models:          {}", stats.model_count);
    println!("total size:      {}", human_size(stats.total_size_bytes));
    println!("available space: {} (stub figure)", human_size(stats.available_space_bytes));

    for info in store.list_models()? {
        let per_model = model_stats(&store, &info.id)?;
        println!(
            "  {}  {} files  {}",
            per_model.id,
            per_model.file_count,
            human_size(per_model.size_bytes)
        );
    }
    Ok(())
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
