//! Record encodings. JSON matches what a browser store would hold;
//! bincode is the compact alternative.

use crate::error::PersistenceError;
use mascot_config::StorageFormat;
use mascot_simulation::MascotRecord;

pub trait Serializer: Send + Sync {
    fn encode(&self, records: &[MascotRecord]) -> Result<Vec<u8>, PersistenceError>;
    fn decode(&self, bytes: &[u8]) -> Result<Vec<MascotRecord>, PersistenceError>;
}

pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn encode(&self, records: &[MascotRecord]) -> Result<Vec<u8>, PersistenceError> {
        Ok(serde_json::to_vec(records)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<MascotRecord>, PersistenceError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

pub struct BinarySerializer;

impl Serializer for BinarySerializer {
    fn encode(&self, records: &[MascotRecord]) -> Result<Vec<u8>, PersistenceError> {
        Ok(bincode::serialize(records)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<MascotRecord>, PersistenceError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

pub fn serializer_for(format: StorageFormat) -> Box<dyn Serializer> {
    match format {
        StorageFormat::Json => Box::new(JsonSerializer),
        StorageFormat::Binary => Box::new(BinarySerializer),
    }
}
