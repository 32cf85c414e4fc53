use parsang_engine::{load_viewer_config, ConfigError, ViewerConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub(crate) struct AppWiring {
    pub(crate) config: ViewerConfig,
}

pub(crate) fn build_app() -> Result<AppWiring, ConfigError> {
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "=== Parsang Map Startup ===");

    let config = load_viewer_config(|key| std::env::var(key).ok())?;
    info!(
        save_dir = %config.sources.save_dir.display(),
        save_uid = config.sources.save_uid.as_deref().unwrap_or("none"),
        level_aware = config.map.level_aware,
        "config_resolved"
    );
    Ok(AppWiring { config })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
