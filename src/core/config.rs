use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::io::earthengine::rest::DEFAULT_API_BASE;

/// File name of the rendered map inside the static directory.
pub const ARTIFACT_FILE_NAME: &str = "map_output.html";

/// Service settings, filled from the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service-account JSON key
    pub key_file: PathBuf,
    /// Listen address, `host:port`
    pub bind: String,
    /// Directory served verbatim; the map artifact is written here
    pub static_dir: PathBuf,
    /// URL path the static directory is mounted at
    pub static_prefix: String,
    /// Externally reachable origin used to build `map_url`
    pub public_url: String,
    /// Earth Engine REST endpoint
    pub api_base: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            key_file: PathBuf::from("service-account.json"),
            bind: "127.0.0.1:8000".to_string(),
            static_dir: PathBuf::from("carte"),
            static_prefix: "/carte".to_string(),
            public_url: "http://127.0.0.1:8000".to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Where every request writes its map; shared by all requests.
    pub fn artifact_path(&self) -> PathBuf {
        self.static_dir.join(ARTIFACT_FILE_NAME)
    }

    /// Public URL of the artifact: origin, mount prefix and file name joined verbatim.
    pub fn artifact_url(&self) -> String {
        format!(
            "{}/{}/{}",
            self.public_url.trim_end_matches('/'),
            self.static_prefix.trim_matches('/'),
            ARTIFACT_FILE_NAME
        )
    }
}
