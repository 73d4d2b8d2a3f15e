use crate::dataset::{ACCEPTED_IMAGE_TYPES, TrainingClass, TrainingDataset};
use crate::error::{TrainingError, TrainingResult};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::path::Path;
use tracing::debug;

/// Options for building a dataset from a directory tree.
#[derive(Debug, Clone)]
pub struct DatasetBuildOptions {
    /// Cap per class; extra files are ignored in name order.
    pub max_images_per_class: usize,
}

impl Default for DatasetBuildOptions {
    fn default() -> Self {
        Self { max_images_per_class: 500 }
    }
}

/// Build a `TrainingDataset` from a directory whose immediate subdirectories
/// are classes holding raster image files.
///
/// Files are read in name order and encoded as base64 data-URLs with the MIME
/// subtype derived from the extension. Files with other extensions are
/// skipped. The result is not validated here; pass it to the validator.
pub fn build_dataset_from_dir(
    root: &Path,
    options: &DatasetBuildOptions,
) -> TrainingResult<TrainingDataset> {
    if !root.is_dir() {
        return Err(TrainingError::Dataset(format!(
            "dataset root is not a directory: {}",
            root.display()
        )));
    }

    let mut class_dirs: Vec<_> = std::fs::read_dir(root)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|entry| entry.path().is_dir())
        .collect();
    class_dirs.sort_by_key(std::fs::DirEntry::file_name);

    let mut classes = Vec::new();
    for dir in class_dirs {
        let name = dir.file_name().to_string_lossy().into_owned();
        let images = read_class_images(&dir.path(), options)?;
        debug!("class '{name}': {} images", images.len());
        classes.push(TrainingClass { name, images });
    }

    Ok(TrainingDataset { classes })
}

fn read_class_images(class_dir: &Path, options: &DatasetBuildOptions) -> TrainingResult<Vec<String>> {
    let mut files: Vec<_> = std::fs::read_dir(class_dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    let mut images = Vec::new();
    for path in files {
        let Some(subtype) = image_subtype(&path) else {
            debug!("skipping non-image file {}", path.display());
            continue;
        };
        let bytes = std::fs::read(&path)?;
        images.push(format!("data:image/{subtype};base64,{}", BASE64.encode(bytes)));
        if images.len() >= options.max_images_per_class {
            break;
        }
    }
    Ok(images)
}

/// Map a file extension to an accepted data-URL subtype.
fn image_subtype(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    if ext == "jpg" {
        return Some("jpeg");
    }
    ACCEPTED_IMAGE_TYPES.into_iter().find(|t| *t == ext.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::decode_image;
    use tempfile::TempDir;

    #[test]
    fn test_build_dataset_from_class_dirs() {
        let temp = TempDir::new().unwrap();
        for (class, count) in [("apples", 3), ("oranges", 2)] {
            let dir = temp.path().join(class);
            std::fs::create_dir(&dir).unwrap();
            for i in 0..count {
                std::fs::write(dir.join(format!("img-{i}.png")), [0x89, 0x50, i as u8]).unwrap();
            }
        }
        std::fs::write(temp.path().join("notes.txt"), "not a class").unwrap();

        let dataset = build_dataset_from_dir(temp.path(), &DatasetBuildOptions::default()).unwrap();
        assert_eq!(dataset.num_classes(), 2);
        assert_eq!(dataset.labels(), vec!["apples", "oranges"]);
        assert_eq!(dataset.image_counts(), vec![3, 2]);
        for class in &dataset.classes {
            for image in &class.images {
                assert!(decode_image(image).is_some());
            }
        }
    }

    #[test]
    fn test_skips_unsupported_extensions_and_maps_jpg() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("mixed");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("a.jpg"), [1, 2]).unwrap();
        std::fs::write(dir.join("b.tiff"), [3, 4]).unwrap();
        std::fs::write(dir.join("c.webp"), [5, 6]).unwrap();

        let dataset = build_dataset_from_dir(temp.path(), &DatasetBuildOptions::default()).unwrap();
        assert_eq!(dataset.classes[0].images.len(), 2);
        assert!(dataset.classes[0].images[0].starts_with("data:image/jpeg;base64,"));
        assert!(dataset.classes[0].images[1].starts_with("data:image/webp;base64,"));
    }

    #[test]
    fn test_respects_per_class_cap() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("many");
        std::fs::create_dir(&dir).unwrap();
        for i in 0..5u8 {
            std::fs::write(dir.join(format!("{i}.png")), [i]).unwrap();
        }

        let options = DatasetBuildOptions { max_images_per_class: 3 };
        let dataset = build_dataset_from_dir(temp.path(), &options).unwrap();
        assert_eq!(dataset.classes[0].images.len(), 3);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        assert!(build_dataset_from_dir(&missing, &DatasetBuildOptions::default()).is_err());
    }
}
