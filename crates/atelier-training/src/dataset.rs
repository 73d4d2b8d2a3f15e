use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

/// Raster subtypes accepted in image data-URLs.
pub const ACCEPTED_IMAGE_TYPES: [&str; 6] = ["png", "jpeg", "jpg", "gif", "webp", "bmp"];

/// One labeled class of training images.
///
/// Images arrive as base64 data-URLs (`data:image/png;base64,...`). A class
/// is consumed by a single training run and not retained afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingClass {
    pub name: String,
    pub images: Vec<String>,
}

/// The caller-supplied dataset for one training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingDataset {
    pub classes: Vec<TrainingClass>,
}

impl TrainingDataset {
    #[must_use]
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn total_images(&self) -> usize {
        self.classes.iter().map(|c| c.images.len()).sum()
    }

    #[must_use]
    pub fn image_counts(&self) -> Vec<usize> {
        self.classes.iter().map(|c| c.images.len()).collect()
    }

    /// Trimmed class names in dataset order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.classes.iter().map(|c| c.name.trim().to_string()).collect()
    }
}

/// A syntactically parsed image data-URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUrl<'a> {
    /// The `image/<subtype>` part, e.g. `png`.
    pub subtype: &'a str,
    /// The raw base64 payload after `;base64,`.
    pub payload: &'a str,
}

/// Parse `data:image/<subtype>;base64,<payload>` without decoding the payload.
///
/// Returns `None` for any other scheme, an unaccepted subtype, or an empty
/// payload.
#[must_use]
pub fn parse_data_url(url: &str) -> Option<DataUrl<'_>> {
    let rest = url.strip_prefix("data:image/")?;
    let (subtype, payload) = rest.split_once(";base64,")?;
    if !ACCEPTED_IMAGE_TYPES.contains(&subtype) {
        return None;
    }
    if payload.is_empty() {
        return None;
    }
    Some(DataUrl { subtype, payload })
}

/// Decode the payload of an image data-URL. `None` when the URL is malformed
/// or the payload is not valid base64.
#[must_use]
pub fn decode_image(url: &str) -> Option<Vec<u8>> {
    let parsed = parse_data_url(url)?;
    BASE64.decode(parsed.payload).ok()
}
