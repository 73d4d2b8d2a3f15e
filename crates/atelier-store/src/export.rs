use crate::error::{StoreError, StoreResult};
use atelier_training::ModelBundle;
use atelier_training::artifacts::{METADATA_FILE, MODEL_FILE, README_FILE, WEIGHTS_FILE};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::io::{Cursor, Write};
use tracing::warn;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Downloadable rendering of a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportArtifact {
    /// Zip archive of the four bundle files.
    Zip(Vec<u8>),
    /// Degraded form used when archiving fails: the bundle as one JSON
    /// document with the weights base64-encoded.
    Json(Vec<u8>),
}

impl ExportArtifact {
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Zip(bytes) | Self::Json(bytes) => bytes,
        }
    }

    #[must_use]
    pub fn file_extension(&self) -> &'static str {
        match self {
            Self::Zip(_) => "zip",
            Self::Json(_) => "json",
        }
    }

    /// Content type the transport should attach to a download response.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Zip(_) => "application/zip",
            Self::Json(_) => "application/json",
        }
    }
}

/// Package a bundle for download.
///
/// Archive entries are written in a fixed order: topology, metadata, readme,
/// weights. A packaging failure degrades to the JSON rendering instead of
/// surfacing an error; only a failure to produce that fallback too is an Err.
pub fn package_bundle(bundle: &ModelBundle) -> StoreResult<ExportArtifact> {
    match build_zip(bundle) {
        Ok(bytes) => Ok(ExportArtifact::Zip(bytes)),
        Err(err) => {
            warn!("zip packaging failed, falling back to JSON bundle: {err}");
            Ok(ExportArtifact::Json(json_fallback(bundle)?))
        }
    }
}

fn build_zip(bundle: &ModelBundle) -> StoreResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(MODEL_FILE, options).map_err(|err| StoreError::Archive(err.to_string()))?;
    zip.write_all(serde_json::to_string_pretty(&bundle.topology)?.as_bytes())?;

    zip.start_file(METADATA_FILE, options).map_err(|err| StoreError::Archive(err.to_string()))?;
    zip.write_all(serde_json::to_string_pretty(&bundle.metadata)?.as_bytes())?;

    zip.start_file(README_FILE, options).map_err(|err| StoreError::Archive(err.to_string()))?;
    zip.write_all(bundle.readme.as_bytes())?;

    zip.start_file(WEIGHTS_FILE, options).map_err(|err| StoreError::Archive(err.to_string()))?;
    zip.write_all(&bundle.weights)?;

    let cursor = zip.finish().map_err(|err| StoreError::Archive(err.to_string()))?;
    Ok(cursor.into_inner())
}

fn json_fallback(bundle: &ModelBundle) -> StoreResult<Vec<u8>> {
    let document = serde_json::json!({
        "modelTopology": bundle.topology,
        "metadata": bundle.metadata,
        "readme": bundle.readme,
        "weightsBase64": BASE64.encode(&bundle.weights),
    });
    Ok(serde_json::to_vec_pretty(&document)?)
}
