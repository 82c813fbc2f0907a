//! Semantic range checks on a resolved method config.
//!
//! Deserialization already guarantees shape and field types; these checks
//! catch values that parse fine but cannot drive a training run.

use crate::datamanager::DataManagerConfig;
use crate::error::ConfigError;
use crate::method::MethodConfig;
use crate::model::{ColliderConfig, ModelConfig, SceneBox};
use crate::optimizer::OptimizerGroupConfig;

type Check = Result<(), ConfigError>;

fn ensure(condition: bool, path: &str, reason: impl Into<String>) -> Check {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::invalid_value(path, reason))
    }
}

fn positive(value: u64, path: &str) -> Check {
    ensure(value > 0, path, "must be greater than zero")
}

impl MethodConfig {
    /// Check value ranges across the whole config.
    ///
    /// Returns the first violation as [`ConfigError::InvalidValue`].
    pub fn validate(&self) -> Check {
        ensure(!self.method_name.is_empty(), "method_name", "must not be empty")?;

        positive(self.machine.num_gpus.into(), "machine.num_gpus")?;
        positive(self.machine.num_machines.into(), "machine.num_machines")?;
        ensure(
            self.machine.machine_rank < self.machine.num_machines,
            "machine.machine_rank",
            format!(
                "rank {} is out of range for {} machines",
                self.machine.machine_rank, self.machine.num_machines
            ),
        )?;
        ensure(
            self.machine.world_size().is_some(),
            "machine.num_gpus",
            "total process count does not fit in 32 bits",
        )?;

        positive(self.trainer.steps_per_save, "trainer.steps_per_save")?;
        positive(self.trainer.steps_per_test, "trainer.steps_per_test")?;
        positive(self.trainer.max_num_iterations, "trainer.max_num_iterations")?;
        positive(self.logging.steps_per_log, "logging.steps_per_log")?;

        validate_datamanager(&self.pipeline.datamanager)?;
        validate_model(&self.pipeline.model)?;

        ensure(!self.optimizers.is_empty(), "optimizers", "at least one parameter group is required")?;
        for (group, config) in &self.optimizers {
            validate_optimizer_group(group, config)?;
        }
        Ok(())
    }
}

fn validate_datamanager(datamanager: &DataManagerConfig) -> Check {
    positive(
        datamanager.train_num_rays_per_batch().into(),
        "pipeline.datamanager.train_num_rays_per_batch",
    )?;
    positive(
        datamanager.eval_num_rays_per_chunk().into(),
        "pipeline.datamanager.eval_num_rays_per_chunk",
    )
}

fn validate_model(model: &ModelConfig) -> Check {
    positive(
        model.eval_num_rays_per_chunk().into(),
        "pipeline.model.eval_num_rays_per_chunk",
    )?;
    for (term, weight) in model.loss_coefficients() {
        ensure(
            weight.is_finite() && *weight >= 0.0,
            "pipeline.model.loss_coefficients",
            format!("weight of '{term}' must be a non-negative number"),
        )?;
    }

    match model {
        ModelConfig::Vanilla(config)
        | ModelConfig::MipNerf(config)
        | ModelConfig::MipNerf360(config)
        | ModelConfig::SemanticNerf(config) => {
            positive(config.num_coarse_samples.into(), "pipeline.model.num_coarse_samples")?;
            validate_collider(&config.collider)
        }
        ModelConfig::NerfW(config) => {
            positive(config.num_coarse_samples.into(), "pipeline.model.num_coarse_samples")?;
            positive(config.num_images.into(), "pipeline.model.num_images")?;
            ensure(
                config.uncertainty_min > 0.0,
                "pipeline.model.uncertainty_min",
                "must be greater than zero",
            )?;
            validate_collider(&config.collider)
        }
        ModelConfig::InstantNgp(config) => {
            positive(config.num_samples.into(), "pipeline.model.num_samples")?;
            positive(
                config.max_num_samples_per_ray.into(),
                "pipeline.model.max_num_samples_per_ray",
            )?;
            ensure(
                config.render_step_size > 0.0,
                "pipeline.model.render_step_size",
                "must be greater than zero",
            )?;
            if let Some(collider) = &config.collider {
                validate_collider(collider)?;
            }
            validate_scene_box(&config.scene_aabb)
        }
        ModelConfig::Compound(config) => {
            positive(config.num_samples.into(), "pipeline.model.num_samples")?;
            positive(
                config.num_proposal_samples.into(),
                "pipeline.model.num_proposal_samples",
            )?;
            if let Some(collider) = &config.collider {
                validate_collider(collider)?;
            }
            validate_scene_box(&config.scene_aabb)
        }
        ModelConfig::TensoRF(config) => {
            positive(config.num_samples.into(), "pipeline.model.num_samples")?;
            positive(config.init_resolution.into(), "pipeline.model.init_resolution")?;
            ensure(
                config.final_resolution >= config.init_resolution,
                "pipeline.model.final_resolution",
                "must not be below init_resolution",
            )?;
            ensure(
                config.upsampling_iters.windows(2).all(|pair| pair[0] < pair[1]),
                "pipeline.model.upsampling_iters",
                "must be strictly ascending",
            )?;
            validate_scene_box(&config.scene_aabb)
        }
    }
}

fn validate_collider(collider: &ColliderConfig) -> Check {
    ensure(
        collider.near_plane >= 0.0,
        "pipeline.model.collider.near_plane",
        "must not be negative",
    )?;
    ensure(
        collider.depth_range() > 0.0,
        "pipeline.model.collider.far_plane",
        format!(
            "far plane {} must lie beyond near plane {}",
            collider.far_plane, collider.near_plane
        ),
    )
}

fn validate_scene_box(scene_box: &SceneBox) -> Check {
    ensure(
        scene_box.is_valid(),
        "pipeline.model.scene_aabb",
        "min must be below max on every axis",
    )
}

fn validate_optimizer_group(group: &str, config: &OptimizerGroupConfig) -> Check {
    let path = format!("optimizers.{group}");
    ensure(config.optimizer.lr > 0.0, &path, "learning rate must be greater than zero")?;
    ensure(config.optimizer.eps > 0.0, &path, "epsilon must be greater than zero")?;
    ensure(
        config.optimizer.weight_decay >= 0.0,
        &path,
        "weight decay must not be negative",
    )?;
    if let Some(scheduler) = &config.scheduler {
        ensure(scheduler.lr_final > 0.0, &path, "final learning rate must be greater than zero")?;
        positive(scheduler.max_steps, &path)?;
    }
    Ok(())
}
