//! Training loop settings handed to the external trainer.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainerConfig {
    pub steps_per_save: u64,
    pub steps_per_test: u64,
    pub max_num_iterations: u64,
    pub mixed_precision: bool,
    /// Checkpoint directory, relative to the run's base directory.
    pub relative_model_dir: PathBuf,
    /// Directory of a previous run to resume from.
    pub load_dir: Option<PathBuf>,
    /// Checkpoint step to resume; `None` picks the latest.
    pub load_step: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            steps_per_save: 1000,
            steps_per_test: 500,
            max_num_iterations: 1_000_000,
            mixed_precision: false,
            relative_model_dir: PathBuf::from("radiance_models"),
            load_dir: None,
            load_step: None,
        }
    }
}

impl TrainerConfig {
    /// Whether a checkpoint is written after `step`.
    pub fn is_save_step(&self, step: u64) -> bool {
        self.steps_per_save > 0 && step > 0 && step % self.steps_per_save == 0
    }

    /// Whether evaluation runs after `step`.
    pub fn is_test_step(&self, step: u64) -> bool {
        self.steps_per_test > 0 && step > 0 && step % self.steps_per_test == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trainer_defaults() {
        let trainer = TrainerConfig::default();
        assert_eq!(trainer.steps_per_save, 1000);
        assert_eq!(trainer.steps_per_test, 500);
        assert!(!trainer.mixed_precision);
        assert!(trainer.load_dir.is_none());
    }

    #[test]
    fn test_step_cadence() {
        let trainer = TrainerConfig {
            steps_per_test: 200,
            ..Default::default()
        };
        assert!(!trainer.is_test_step(0));
        assert!(trainer.is_test_step(200));
        assert!(!trainer.is_test_step(300));
        assert!(trainer.is_save_step(2000));
        assert!(!trainer.is_save_step(1500));
    }
}
