use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

pub const DEFAULT_START_YEAR: i32 = 2010;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourceConfig {
    pub base_url: String,
}

impl SourceConfig {
    fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourcesConfig {
    #[serde(default = "SourcesConfig::default_ecb")]
    pub ecb: SourceConfig,
    #[serde(default = "SourcesConfig::default_nbp")]
    pub nbp: SourceConfig,
    #[serde(default = "SourcesConfig::default_rba")]
    pub rba: SourceConfig,
}

impl SourcesConfig {
    fn default_ecb() -> SourceConfig {
        SourceConfig::new("https://www.ecb.europa.eu/stats/eurofxref")
    }

    fn default_nbp() -> SourceConfig {
        SourceConfig::new("https://static.nbp.pl/dane/kursy/Archiwum")
    }

    fn default_rba() -> SourceConfig {
        SourceConfig::new("https://www.rba.gov.au/statistics/tables/xls-hist")
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        SourcesConfig {
            ecb: Self::default_ecb(),
            nbp: Self::default_nbp(),
            rba: Self::default_rba(),
        }
    }
}

fn default_start_year() -> i32 {
    DEFAULT_START_YEAR
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub rates_dir: Option<String>,
    #[serde(default = "default_start_year")]
    pub start_year: i32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub sources: SourcesConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            rates_dir: None,
            start_year: DEFAULT_START_YEAR,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            sources: SourcesConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the default config file, or built-in defaults when it does not
    /// exist yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "fxarchive", "fxarchive")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn rates_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.rates_dir {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("org", "fxarchive", "fxarchive")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().join("rates"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
