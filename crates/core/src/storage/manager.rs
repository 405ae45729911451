use crate::errors::CoreError;

use super::database::{Database, LegacyDatabase};
use super::format;

/// A decoded store image, tagged with its schema generation.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreImage {
    Legacy(LegacyDatabase),
    Current(Database),
}

/// Encoding and decoding of whole store images.
pub struct StorageManager;

impl StorageManager {
    /// Serialize a current-generation database to raw bytes.
    ///
    /// Flow: Database → bincode → CNFO v2 bytes
    pub fn encode(db: &Database) -> Result<Vec<u8>, CoreError> {
        let payload = bincode::serialize(db)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize store: {e}")))?;
        Ok(format::write_file(format::CURRENT_VERSION, &payload))
    }

    /// Serialize a legacy-generation database. Only needed to produce
    /// fixtures and for tooling that downgrades a store for inspection.
    pub fn encode_legacy(db: &LegacyDatabase) -> Result<Vec<u8>, CoreError> {
        let payload = bincode::serialize(db)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize legacy store: {e}")))?;
        Ok(format::write_file(format::LEGACY_VERSION, &payload))
    }

    /// Parse raw bytes into whichever generation they hold.
    ///
    /// Flow: CNFO bytes → parse header → bincode (legacy or current) → StoreImage
    pub fn decode(data: &[u8]) -> Result<StoreImage, CoreError> {
        let (header, payload) = format::read_file(data)?;
        match header.version {
            format::LEGACY_VERSION => {
                let legacy: LegacyDatabase = bincode::deserialize(payload).map_err(|e| {
                    CoreError::Deserialization(format!("Failed to deserialize legacy store: {e}"))
                })?;
                Ok(StoreImage::Legacy(legacy))
            }
            format::CURRENT_VERSION => {
                let db: Database = bincode::deserialize(payload).map_err(|e| {
                    CoreError::Deserialization(format!("Failed to deserialize store: {e}"))
                })?;
                Ok(StoreImage::Current(db))
            }
            other => Err(CoreError::UnsupportedVersion(other)),
        }
    }
}
