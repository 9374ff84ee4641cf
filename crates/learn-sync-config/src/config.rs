use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub reconcile: ReconcileConfig,
    #[serde(default)]
    pub scheduler: Option<SchedulerConfig>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// One JSON document per learner on disk
    Json,
    /// Process-local and lost on exit. Each CLI command is its own process, so
    /// this is only usable when a `Config` is built in code (tests, embedding);
    /// `validate` refuses it
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_backend")]
    pub backend: StoreBackend,
    /// Overrides the platform data directory for the JSON backend
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Recompute the learner's watchlist right after a quiz completion is recorded,
    /// instead of waiting for the next course open or scheduled run
    #[serde(default = "default_true")]
    pub recompute_on_completion: bool,

    /// Read-reconcile-write attempts before giving up on a contended user record
    #[serde(default = "default_max_write_attempts")]
    pub max_write_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Six-field cron expression (seconds first), evaluated in UTC
    #[serde(default = "default_schedule")]
    pub schedule: String,
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

fn default_true() -> bool {
    true
}

fn default_store_backend() -> StoreBackend {
    StoreBackend::Json
}

fn default_max_write_attempts() -> u32 {
    3
}

fn default_schedule() -> String {
    "0 0 */6 * * *".to_string() // Every 6 hours (seconds field first)
}

pub fn default_scheduler_config() -> SchedulerConfig {
    SchedulerConfig {
        schedule: default_schedule(),
        run_on_startup: default_true(),
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            data_dir: None,
        }
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            recompute_on_completion: default_true(),
            max_write_attempts: default_max_write_attempts(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file if present, falling back to defaults when it does not exist
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.reconcile.max_write_attempts == 0 {
            return Err(anyhow::anyhow!("reconcile.max_write_attempts must be at least 1"));
        }

        if let Some(ref scheduler) = self.scheduler {
            if scheduler.schedule.trim().is_empty() {
                return Err(anyhow::anyhow!("scheduler.schedule cannot be empty"));
            }
        }

        if self.store.backend == StoreBackend::Memory {
            return Err(anyhow::anyhow!(
                "store.backend = \"memory\" keeps nothing between commands; use \"json\""
            ));
        }

        Ok(())
    }
}
