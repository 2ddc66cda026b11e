use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use config::{Config, ConfigError, Environment, File};

pub const DEFAULT_EXTENSIONS: [&str; 9] = [
    "jpg", "jpeg", "cr2", "cr3", "nef", "arw", "orf", "rw2", "dng",
];

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub exiftool_path: String,
    pub extract_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    pub supported_extensions: HashSet<String>,
    pub num_workers: usize,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            exiftool_path: "exiftool".to_string(),
            extract_timeout_secs: 30,
            probe_timeout_secs: 10,
            supported_extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            num_workers: 4,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let defaults = AppConfig::default();

        let s = Config::builder()
            .set_default("exiftool_path", defaults.exiftool_path)?
            .set_default("extract_timeout_secs", defaults.extract_timeout_secs)?
            .set_default("probe_timeout_secs", defaults.probe_timeout_secs)?
            .set_default(
                "supported_extensions",
                DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
            )?
            .set_default("num_workers", defaults.num_workers as u64)?
            .set_default("log_level", defaults.log_level)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("SHUTTER"))
            .build()?;

        let mut config: AppConfig = s.try_deserialize()?;
        config.supported_extensions = config
            .supported_extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .collect();
        Ok(config)
    }

    pub fn extract_timeout(&self) -> Duration {
        Duration::from_secs(self.extract_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Whether `path` carries one of the configured extensions (case-insensitive).
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| self.supported_extensions.contains(&ext.to_lowercase()))
            .unwrap_or(false)
    }
}
