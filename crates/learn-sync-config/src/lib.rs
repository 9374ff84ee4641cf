pub mod config;
pub mod paths;

pub use config::{Config, ReconcileConfig, SchedulerConfig, StoreBackend, StoreConfig, default_scheduler_config};
pub use paths::{PathManager, container_base_path};
