/// Error types shared across CUET assistant crates.
///
/// These errors represent failures in infrastructure components (reference data files)
/// that are not specific to one request. Application-specific errors should be defined
/// in each binary crate and wrap `CommonError` via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
