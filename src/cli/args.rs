use clap::Parser;
use std::path::PathBuf;

use sarmap::core::config::ServiceConfig;
use sarmap::io::earthengine::rest::DEFAULT_API_BASE;

#[derive(Parser)]
#[command(name = "sarmap", version, about = "SARMAP map service")]
pub struct CliArgs {
    /// Service account JSON key for Earth Engine
    #[arg(long, default_value = "service-account.json")]
    pub key_file: PathBuf,

    /// Address to listen on (host:port)
    #[arg(long, default_value = "127.0.0.1:8000")]
    pub bind: String,

    /// Directory served as static files; the rendered map is written here
    #[arg(long, default_value = "carte")]
    pub static_dir: PathBuf,

    /// URL path the static directory is mounted at
    #[arg(long, default_value = "/carte")]
    pub static_prefix: String,

    /// Public origin used to build the returned map URL
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    pub public_url: String,

    /// Earth Engine REST endpoint
    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    pub log: bool,
}

impl CliArgs {
    pub fn to_config(&self) -> ServiceConfig {
        ServiceConfig {
            key_file: self.key_file.clone(),
            bind: self.bind.clone(),
            static_dir: self.static_dir.clone(),
            static_prefix: self.static_prefix.clone(),
            public_url: self.public_url.clone(),
            api_base: self.api_base.clone(),
        }
    }
}
