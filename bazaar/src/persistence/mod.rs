pub mod sled_store;

pub use sled_store::{SledCouponRepository, SledOrderRepository, SledProductRepository};

use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::{Error, Result};
use std::path::Path;

/// Open (or create) the document database backing every repository.
/// Creates the parent directory if it doesn't exist.
pub fn open_database(path: impl AsRef<Path>) -> Result<sled::Db> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| Error::Storage(format!("Failed to create directory: {}", e)))?;
    }

    sled::open(path).map_err(|e| Error::Storage(format!("Failed to open Sled database: {}", e)))
}

pub(crate) fn storage_error(e: sled::Error) -> Error {
    Error::Storage(e.to_string())
}

pub(crate) fn open_tree(db: &sled::Db, name: &str) -> Result<sled::Tree> {
    db.open_tree(name).map_err(storage_error)
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Read every record of a tree
pub(crate) fn load_all<T: DeserializeOwned>(tree: &sled::Tree) -> Result<Vec<T>> {
    let mut records = Vec::new();

    for item in tree.iter() {
        let (_, value) = item.map_err(storage_error)?;
        records.push(decode(&value)?);
    }

    Ok(records)
}
