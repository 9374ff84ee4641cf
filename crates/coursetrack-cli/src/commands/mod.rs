pub mod complete;
pub mod config;
pub mod daemon;
pub mod open;
pub mod reconcile;
pub mod repair;
pub mod show;

use color_eyre::Result;
use learn_sync_config::{Config, PathManager, StoreBackend};
use learn_sync_core::{DocumentStore, JsonFileStore, MemoryStore, ServiceOptions, WatchlistService};
use std::sync::Arc;
use tracing::debug;

pub type Service = WatchlistService<dyn DocumentStore>;

/// Load the config file, falling back to defaults when none exists yet
pub fn load_config() -> Result<Config> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    let config = Config::load_or_default(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;
    Ok(config)
}

pub fn build_service(config: &Config, dry_run: bool) -> Result<Service> {
    let store: Arc<dyn DocumentStore> = match config.store.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Json => {
            let data_dir = config
                .store
                .data_dir
                .clone()
                .unwrap_or_else(|| PathManager::default().store_dir());
            debug!(data_dir = %data_dir.display(), "Opening JSON document store");
            let store = JsonFileStore::new(&data_dir)
                .map_err(|e| color_eyre::eyre::eyre!("Failed to open store at {}: {}", data_dir.display(), e))?;
            Arc::new(store)
        }
    };

    let mut service = WatchlistService::new(store, ServiceOptions::from(&config.reconcile));
    service.set_dry_run(dry_run);
    Ok(service)
}
