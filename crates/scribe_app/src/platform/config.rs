use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use ron::extensions::Extensions;
use scribe_core::MonitorConfig;
use scribe_engine::EngineSettings;
use scribe_logging::{scribe_debug, scribe_info};
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_FILENAME: &str = "scribe.ron";
const DEFAULT_OUTPUT_DIR: &str = "output";

/// One layer of optional settings. The config file and the command line each
/// produce one; unset fields fall through to the layer below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: Option<String>,
    pub submit_path: Option<String>,
    pub logs_path: Option<String>,
    pub artifact_path: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub log_interval_ms: Option<u64>,
    pub artifact_interval_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    pub max_artifact_bytes: Option<u64>,
    pub stale_after_failures: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub engine: EngineSettings,
    pub monitor: MonitorConfig,
    pub output_dir: PathBuf,
}

/// Reads the config layer from `explicit`, or from `./scribe.ron` if that exists.
///
/// An explicit path that cannot be read is an error; a missing default file is not.
pub fn load_file_config(explicit: Option<&Path>) -> anyhow::Result<FileConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILENAME);
            if !default.exists() {
                scribe_debug!("No {} found, using defaults", DEFAULT_CONFIG_FILENAME);
                return Ok(FileConfig::default());
            }
            default
        }
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = parse_file_config(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    scribe_info!("Loaded config from {:?}", path);
    Ok(config)
}

fn parse_file_config(content: &str) -> Result<FileConfig, ron::error::SpannedError> {
    ron::Options::default()
        .with_default_extension(Extensions::IMPLICIT_SOME)
        .from_str(content)
}

impl FileConfig {
    /// Stacks `overrides` on top of `self`.
    pub fn merged_with(self, overrides: FileConfig) -> FileConfig {
        FileConfig {
            server: overrides.server.or(self.server),
            submit_path: overrides.submit_path.or(self.submit_path),
            logs_path: overrides.logs_path.or(self.logs_path),
            artifact_path: overrides.artifact_path.or(self.artifact_path),
            output_dir: overrides.output_dir.or(self.output_dir),
            log_interval_ms: overrides.log_interval_ms.or(self.log_interval_ms),
            artifact_interval_ms: overrides.artifact_interval_ms.or(self.artifact_interval_ms),
            request_timeout_ms: overrides.request_timeout_ms.or(self.request_timeout_ms),
            connect_timeout_ms: overrides.connect_timeout_ms.or(self.connect_timeout_ms),
            max_artifact_bytes: overrides.max_artifact_bytes.or(self.max_artifact_bytes),
            stale_after_failures: overrides.stale_after_failures.or(self.stale_after_failures),
        }
    }

    /// Fills every unset field from the built-in defaults.
    pub fn resolve(self) -> ResolvedConfig {
        let defaults = EngineSettings::default();
        let millis = |value: Option<u64>, fallback: Duration| {
            value.map(Duration::from_millis).unwrap_or(fallback)
        };

        let engine = EngineSettings {
            base_url: self.server.unwrap_or(defaults.base_url),
            submit_path: self.submit_path.unwrap_or(defaults.submit_path),
            logs_path: self.logs_path.unwrap_or(defaults.logs_path),
            artifact_path: self.artifact_path.unwrap_or(defaults.artifact_path),
            connect_timeout: millis(self.connect_timeout_ms, defaults.connect_timeout),
            request_timeout: millis(self.request_timeout_ms, defaults.request_timeout),
            log_poll_interval: millis(self.log_interval_ms, defaults.log_poll_interval),
            artifact_poll_interval: millis(
                self.artifact_interval_ms,
                defaults.artifact_poll_interval,
            ),
            max_artifact_bytes: self.max_artifact_bytes.unwrap_or(defaults.max_artifact_bytes),
        };

        let mut monitor = MonitorConfig::default();
        if let Some(threshold) = self.stale_after_failures {
            monitor.stale_after_failures = threshold;
        }

        ResolvedConfig {
            engine,
            monitor,
            output_dir: self
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        }
    }
}
