//! Top-level method configuration and run-level settings.

use crate::error::ConfigError;
use crate::optimizer::{OptimizerGroupConfig, default_optimizers};
use crate::pipeline::PipelineConfig;
use crate::trainer::TrainerConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Process topology for (possibly distributed) training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MachineConfig {
    pub seed: u64,
    pub num_gpus: u32,
    pub num_machines: u32,
    pub machine_rank: u32,
    pub dist_url: String,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            num_gpus: 1,
            num_machines: 1,
            machine_rank: 0,
            dist_url: "auto".to_string(),
        }
    }
}

impl MachineConfig {
    /// Total number of training processes across all machines; `None` on overflow.
    pub fn world_size(&self) -> Option<u32> {
        self.num_gpus.checked_mul(self.num_machines)
    }
}

/// Training-run log output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log directory, relative to the run's base directory.
    pub relative_log_dir: PathBuf,
    pub steps_per_log: u64,
    /// Number of recent step timings kept for averaged reporting.
    pub max_buffer_size: u32,
    pub enable_profiler: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            relative_log_dir: PathBuf::from("logs"),
            steps_per_log: 10,
            max_buffer_size: 20,
            enable_profiler: true,
        }
    }
}

/// Live viewer connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub enable: bool,
    pub websocket_port: u16,
    pub num_rays_per_chunk: u32,
    pub max_num_display_images: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            enable: false,
            websocket_port: 7007,
            num_rays_per_chunk: 32768,
            max_num_display_images: 512,
        }
    }
}

/// One complete, named experiment configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodConfig {
    pub method_name: String,
    /// Experiment grouping for output directories; defaults to the method name.
    #[serde(default)]
    pub experiment_name: Option<String>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub machine: MachineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub viewer: ViewerConfig,
    #[serde(default)]
    pub trainer: TrainerConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Parameter-group name to optimizer and schedule.
    #[serde(default = "default_optimizers")]
    pub optimizers: BTreeMap<String, OptimizerGroupConfig>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

impl MethodConfig {
    /// A method with default settings for every component.
    pub fn new(method_name: impl Into<String>) -> Self {
        Self {
            method_name: method_name.into(),
            experiment_name: None,
            output_dir: default_output_dir(),
            machine: MachineConfig::default(),
            logging: LoggingConfig::default(),
            viewer: ViewerConfig::default(),
            trainer: TrainerConfig::default(),
            pipeline: PipelineConfig::default(),
            optimizers: default_optimizers(),
        }
    }

    /// The experiment name, falling back to the method name when unset.
    pub fn experiment_name(&self) -> &str {
        self.experiment_name.as_deref().unwrap_or(&self.method_name)
    }

    /// `output_dir/<experiment>/<method>/<timestamp>`.
    pub fn base_dir(&self, timestamp: &str) -> PathBuf {
        self.output_dir
            .join(self.experiment_name())
            .join(&self.method_name)
            .join(timestamp)
    }

    pub fn checkpoint_dir(&self, timestamp: &str) -> PathBuf {
        self.base_dir(timestamp).join(&self.trainer.relative_model_dir)
    }

    pub fn log_dir(&self, timestamp: &str) -> PathBuf {
        self.base_dir(timestamp).join(&self.logging.relative_log_dir)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the config as pretty JSON, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json_pretty()?)?;
        debug!("Saved method config '{}' to {}", self.method_name, path.display());
        Ok(())
    }

    /// Read a config previously written by [`MethodConfig::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        debug!("Loaded method config '{}' from {}", config.method_name, path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelKind;

    #[test]
    fn test_experiment_name_defaults_to_method_name() {
        let config = MethodConfig::new("vanilla_nerf");
        assert_eq!(config.experiment_name(), "vanilla_nerf");

        let config = MethodConfig {
            experiment_name: Some("lego".to_string()),
            ..MethodConfig::new("vanilla_nerf")
        };
        assert_eq!(config.experiment_name(), "lego");
    }

    #[test]
    fn test_run_directories() {
        let config = MethodConfig::new("mipnerf");
        let base = config.base_dir("2022-08-01_120000");
        assert_eq!(base, PathBuf::from("outputs/mipnerf/mipnerf/2022-08-01_120000"));
        assert_eq!(
            config.checkpoint_dir("t"),
            PathBuf::from("outputs/mipnerf/mipnerf/t/radiance_models")
        );
        assert_eq!(
            config.log_dir("t"),
            PathBuf::from("outputs/mipnerf/mipnerf/t/logs")
        );
    }

    #[test]
    fn test_world_size() {
        let machine = MachineConfig {
            num_gpus: 4,
            num_machines: 2,
            ..Default::default()
        };
        assert_eq!(machine.world_size(), Some(8));

        let oversized = MachineConfig {
            num_gpus: u32::MAX,
            num_machines: 2,
            ..Default::default()
        };
        assert_eq!(oversized.world_size(), None);
    }

    #[test]
    fn test_json_round_trip() {
        let config = MethodConfig::new("vanilla_nerf");
        let json = config.to_json_pretty().unwrap();
        assert_eq!(MethodConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_minimal_json_fills_defaults() {
        let config = MethodConfig::from_json(r#"{"method_name": "tiny"}"#).unwrap();
        assert_eq!(config, MethodConfig::new("tiny"));
        assert_eq!(config.pipeline.model.kind(), ModelKind::Vanilla);
    }

    #[test]
    fn test_missing_method_name_is_rejected() {
        assert!(MethodConfig::from_json("{}").is_err());
    }

    #[test]
    fn test_unknown_top_level_key_is_rejected() {
        let result = MethodConfig::from_json(r#"{"method_name": "x", "timestamp": "now"}"#);
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs/config.json");
        let config = MethodConfig::new("semantic_nerf");

        config.save(&path).unwrap();
        assert_eq!(MethodConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = MethodConfig::load(dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
