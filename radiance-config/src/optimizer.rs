//! Optimizer and learning-rate schedule values for parameter groups.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Optimizer family an external trainer instantiates for a parameter group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    Adam,
    #[serde(rename = "radam")]
    RAdam,
}

/// Learning-rate schedule family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    ExponentialDecay,
}

/// Optimizer hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerConfig {
    pub optimizer: OptimizerKind,
    /// Initial learning rate.
    pub lr: f64,
    pub eps: f64,
    pub weight_decay: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            optimizer: OptimizerKind::Adam,
            lr: 5e-4,
            eps: 1e-8,
            weight_decay: 0.0,
        }
    }
}

impl OptimizerConfig {
    /// Adam with the given learning rate and default epsilon.
    pub fn adam(lr: f64) -> Self {
        Self {
            lr,
            ..Default::default()
        }
    }

    /// Set epsilon.
    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }
}

/// Learning-rate schedule applied on top of an optimizer's initial rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    pub schedule: ScheduleKind,
    /// Learning rate reached at `max_steps`.
    pub lr_final: f64,
    pub max_steps: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            schedule: ScheduleKind::ExponentialDecay,
            lr_final: 5e-6,
            max_steps: 1_000_000,
        }
    }
}

impl SchedulerConfig {
    /// Exponential decay to `lr_final` over `max_steps`.
    pub fn exponential_decay(lr_final: f64, max_steps: u64) -> Self {
        Self {
            schedule: ScheduleKind::ExponentialDecay,
            lr_final,
            max_steps,
        }
    }

    /// Learning rate at `step` for an optimizer starting at `lr_init`.
    ///
    /// Log-linear interpolation between `lr_init` and `lr_final`; after
    /// `max_steps` the rate stays at `lr_final`.
    pub fn learning_rate(&self, lr_init: f64, step: u64) -> f64 {
        if self.max_steps == 0 {
            return self.lr_final;
        }
        match self.schedule {
            ScheduleKind::ExponentialDecay => {
                let t = (step as f64 / self.max_steps as f64).clamp(0.0, 1.0);
                (lr_init.ln() * (1.0 - t) + self.lr_final.ln() * t).exp()
            }
        }
    }
}

/// Optimizer plus optional schedule for one named parameter group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerGroupConfig {
    pub optimizer: OptimizerConfig,
    pub scheduler: Option<SchedulerConfig>,
}

impl Default for OptimizerGroupConfig {
    fn default() -> Self {
        Self {
            optimizer: OptimizerConfig::default(),
            scheduler: Some(SchedulerConfig::default()),
        }
    }
}

impl OptimizerGroupConfig {
    pub fn new(optimizer: OptimizerConfig, scheduler: Option<SchedulerConfig>) -> Self {
        Self {
            optimizer,
            scheduler,
        }
    }

    /// Effective learning rate at `step`; constant when no scheduler is set.
    pub fn learning_rate(&self, step: u64) -> f64 {
        match &self.scheduler {
            Some(scheduler) => scheduler.learning_rate(self.optimizer.lr, step),
            None => self.optimizer.lr,
        }
    }
}

/// The optimizer map used when a method does not specify its own: a single
/// `fields` group.
pub fn default_optimizers() -> BTreeMap<String, OptimizerGroupConfig> {
    BTreeMap::from([("fields".to_string(), OptimizerGroupConfig::default())])
}
