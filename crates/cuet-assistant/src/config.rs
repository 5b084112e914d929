use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::AppError;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_CUET_DATA_PATH: &str = "data/cuet-data.json";
const DEFAULT_NIRF_DATA_PATH: &str = "data/nirf_rankings_2025.json";

/// Service configuration loaded from environment variables.
///
/// Upstream model settings (`GEMINI_*`) are read separately by
/// `GeminiClientConfig::from_env`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Socket address the HTTP server binds to.
    pub listen_addr: SocketAddr,
    /// Path to the CUET universities/courses JSON document.
    pub cuet_data_path: PathBuf,
    /// Path to the NIRF rankings JSON document.
    pub nirf_data_path: PathBuf,
}

impl Config {
    /// Optional:
    /// - `CUET_LISTEN_ADDR` (default: "0.0.0.0:3000")
    /// - `CUET_DATA_PATH` (default: "data/cuet-data.json")
    /// - `NIRF_DATA_PATH` (default: "data/nirf_rankings_2025.json")
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let raw_addr =
            lookup("CUET_LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = raw_addr.parse::<SocketAddr>().map_err(|e| {
            AppError::Config(format!("CUET_LISTEN_ADDR is not a socket address ({raw_addr}): {e}"))
        })?;

        let cuet_data_path = lookup("CUET_DATA_PATH")
            .unwrap_or_else(|| DEFAULT_CUET_DATA_PATH.to_string())
            .into();
        let nirf_data_path = lookup("NIRF_DATA_PATH")
            .unwrap_or_else(|| DEFAULT_NIRF_DATA_PATH.to_string())
            .into();

        Ok(Self {
            listen_addr,
            cuet_data_path,
            nirf_data_path,
        })
    }
}
