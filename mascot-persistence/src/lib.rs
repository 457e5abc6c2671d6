//! Storage for the mascot collection: record encodings, key-value
//! backends, the repository with its degraded-save fallback and legacy
//! migration, and a background writer that keeps I/O off the frame loop.

pub mod error;
pub mod repository;
pub mod serializer;
pub mod store;
pub mod writer;

pub use error::PersistenceError;
pub use repository::{MascotRepository, SaveOutcome};
pub use serializer::{serializer_for, BinarySerializer, JsonSerializer, Serializer};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use writer::{BackgroundWriter, WriterHandle, WriterStats};

use log::info;
use mascot_config::{PersistenceSettings, StorageBackend};

/// Builds the repository described by the configuration.
pub fn open_repository(settings: &PersistenceSettings) -> Result<MascotRepository, PersistenceError> {
    let store: Box<dyn KeyValueStore> = match &settings.backend {
        StorageBackend::File { path } => Box::new(FileStore::open(path)?),
        StorageBackend::Memory { quota_bytes } => Box::new(MemoryStore::new(*quota_bytes)),
    };
    info!("Persistence: {:?} backend, {:?} format", settings.backend, settings.format);
    Ok(MascotRepository::new(
        store,
        serializer_for(settings.format),
        settings.degrade_threshold_bytes,
    ))
}
