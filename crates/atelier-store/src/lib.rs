//! Atelier Store
//!
//! Filesystem persistence for model artifact bundles:
//! - One directory per model id with the four bundle files plus an index
//!   record (`ModelStore`)
//! - Aggregate size/count statistics (`storage_stats`)
//! - Download packaging with a JSON degradation path (`package_bundle`)

pub mod analytics;
pub mod error;
pub mod export;
pub mod layout;
pub mod store;

pub use analytics::{AVAILABLE_SPACE_BYTES, ModelStats, StorageStats, model_stats, storage_stats};
pub use error::{StoreError, StoreResult};
pub use export::{ExportArtifact, package_bundle};
pub use layout::{INFO_FILE, StoreLayout};
pub use store::{ModelInfo, ModelStore};
