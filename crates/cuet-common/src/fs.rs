use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::CommonError;

/// Read and decode a JSON document from disk.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CommonError> {
    let raw = std::fs::read(path).map_err(|source| CommonError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_slice(&raw).map_err(|source| CommonError::Json {
        path: path.display().to_string(),
        source,
    })
}
