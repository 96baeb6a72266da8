use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use sarmap::api::MapService;
use sarmap::io::earthengine::{EARTH_ENGINE_READONLY_SCOPE, RestEarthEngine, Session};
use sarmap::server::create_router;

use super::args::CliArgs;
use super::errors::AppError;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub async fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(args.log);
    let config = args.to_config();

    let addr: SocketAddr = config
        .bind
        .parse()
        .map_err(|_| AppError::InvalidBindAddress {
            addr: config.bind.clone(),
        })?;
    if !config.static_prefix.starts_with('/') || config.static_prefix.trim_matches('/').is_empty()
    {
        return Err(AppError::InvalidStaticPrefix {
            prefix: config.static_prefix.clone(),
        }
        .into());
    }

    std::fs::create_dir_all(&config.static_dir).map_err(AppError::from)?;

    info!("Loading service account key from {:?}", config.key_file);
    let session = Session::initialize(&config.key_file, &[EARTH_ENGINE_READONLY_SCOPE])
        .await
        .map_err(AppError::from)?;
    let engine = RestEarthEngine::with_api_base(Arc::new(session), config.api_base.as_str())
        .map_err(AppError::from)?;

    let service = Arc::new(MapService::from_config(engine, &config));
    let app = create_router(service, &config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(AppError::from)?;
    info!("Serving on http://{}", addr);
    info!("Static files: {:?} at {}", config.static_dir, config.static_prefix);
    info!("Map URL: {}", config.artifact_url());

    axum::serve(listener, app).await.map_err(AppError::from)?;
    Ok(())
}
