//! Built-in method table.
//!
//! Each function returns the base config for one method. Only the knobs that
//! differ from the component defaults are spelled out.

use crate::datamanager::{DataManagerConfig, DataManagerKind, VanillaDataManagerConfig};
use crate::dataparser::{DataParserConfig, DataParserKind};
use crate::method::MethodConfig;
use crate::model::nerf::loss_coefficients;
use crate::model::{ColliderConfig, ModelConfig, ModelKind, NerfModelConfig};
use crate::optimizer::{OptimizerConfig, OptimizerGroupConfig, SchedulerConfig};
use crate::pipeline::PipelineConfig;
use crate::trainer::TrainerConfig;
use std::collections::BTreeMap;

const FRIENDS_EXPERIMENT: &str = "friends_TBBT-big_living_room";

/// All built-in methods in registration order.
pub fn builtin_methods() -> Vec<MethodConfig> {
    vec![
        instant_ngp(),
        mipnerf_360(),
        mipnerf(),
        nerfw(),
        semantic_nerf(),
        vanilla_nerf(),
        tensorf(),
        compound(),
    ]
}

/// Vanilla batching over `parser` with 8192-ray train batches and eval chunks.
fn wide_batches(parser: DataParserKind) -> DataManagerConfig {
    DataManagerConfig::Vanilla(VanillaDataManagerConfig {
        train_dataparser: DataParserConfig::from_kind(parser),
        train_num_rays_per_batch: 8192,
        eval_num_rays_per_chunk: 8192,
        ..Default::default()
    })
}

/// Constant-rate Adam used by the hash-grid methods.
fn hash_grid_optimizers() -> BTreeMap<String, OptimizerGroupConfig> {
    BTreeMap::from([(
        "fields".to_string(),
        OptimizerGroupConfig::new(OptimizerConfig::adam(3e-3).with_eps(1e-15), None),
    )])
}

fn mixed_precision() -> TrainerConfig {
    TrainerConfig {
        mixed_precision: true,
        ..Default::default()
    }
}

pub fn instant_ngp() -> MethodConfig {
    MethodConfig {
        trainer: mixed_precision(),
        pipeline: PipelineConfig::new(
            wide_batches(DataParserKind::Blender),
            ModelConfig::from_kind(ModelKind::InstantNgp),
        ),
        optimizers: hash_grid_optimizers(),
        ..MethodConfig::new("instant_ngp")
    }
}

pub fn mipnerf_360() -> MethodConfig {
    let model = NerfModelConfig {
        collider: ColliderConfig::new(0.5, 20.0),
        loss_coefficients: loss_coefficients([("ray_loss_coarse", 1.0), ("ray_loss_fine", 1.0)]),
        num_coarse_samples: 128,
        num_importance_samples: 128,
        ..Default::default()
    };
    MethodConfig {
        experiment_name: Some("mipnerf_360".to_string()),
        trainer: TrainerConfig {
            steps_per_test: 200,
            ..Default::default()
        },
        pipeline: PipelineConfig::new(
            wide_batches(DataParserKind::MipNerf360),
            ModelConfig::MipNerf360(model),
        ),
        ..MethodConfig::new("mipnerf_360")
    }
}

pub fn mipnerf() -> MethodConfig {
    let model = NerfModelConfig {
        loss_coefficients: loss_coefficients([("rgb_loss_coarse", 0.1), ("rgb_loss_fine", 1.0)]),
        num_coarse_samples: 128,
        num_importance_samples: 128,
        ..Default::default()
    };
    MethodConfig {
        pipeline: PipelineConfig::new(
            wide_batches(DataParserKind::Blender),
            ModelConfig::MipNerf(model),
        ),
        ..MethodConfig::new("mipnerf")
    }
}

pub fn nerfw() -> MethodConfig {
    MethodConfig {
        experiment_name: Some(FRIENDS_EXPERIMENT.to_string()),
        pipeline: PipelineConfig::new(
            DataManagerConfig::from_kind(DataManagerKind::Friends),
            ModelConfig::from_kind(ModelKind::NerfW),
        ),
        ..MethodConfig::new("nerfw")
    }
}

pub fn semantic_nerf() -> MethodConfig {
    let model = NerfModelConfig {
        loss_coefficients: loss_coefficients([
            ("rgb_loss_coarse", 1.0),
            ("rgb_loss_fine", 1.0),
            ("semantic_loss_fine", 0.05),
        ]),
        num_coarse_samples: 64,
        num_importance_samples: 64,
        ..Default::default()
    };
    MethodConfig {
        experiment_name: Some(FRIENDS_EXPERIMENT.to_string()),
        pipeline: PipelineConfig::new(
            DataManagerConfig::from_kind(DataManagerKind::Friends),
            ModelConfig::SemanticNerf(model),
        ),
        ..MethodConfig::new("semantic_nerf")
    }
}

pub fn vanilla_nerf() -> MethodConfig {
    MethodConfig {
        pipeline: PipelineConfig::new(
            DataManagerConfig::vanilla(DataParserConfig::from_kind(DataParserKind::Blender)),
            ModelConfig::from_kind(ModelKind::Vanilla),
        ),
        ..MethodConfig::new("vanilla_nerf")
    }
}

pub fn tensorf() -> MethodConfig {
    let group = |lr: f64, lr_final: f64| {
        OptimizerGroupConfig::new(
            OptimizerConfig::adam(lr),
            Some(SchedulerConfig::exponential_decay(lr_final, 15_000)),
        )
    };
    MethodConfig {
        trainer: mixed_precision(),
        pipeline: PipelineConfig::new(
            DataManagerConfig::vanilla(DataParserConfig::from_kind(DataParserKind::Blender)),
            ModelConfig::from_kind(ModelKind::TensoRF),
        ),
        optimizers: BTreeMap::from([
            ("fields".to_string(), group(1e-3, 5e-5)),
            ("position_encoding".to_string(), group(0.02, 0.005)),
            ("direction_encoding".to_string(), group(0.02, 0.005)),
        ]),
        ..MethodConfig::new("tensorf")
    }
}

pub fn compound() -> MethodConfig {
    MethodConfig {
        trainer: mixed_precision(),
        pipeline: PipelineConfig::new(
            wide_batches(DataParserKind::Blender),
            ModelConfig::from_kind(ModelKind::Compound),
        ),
        optimizers: hash_grid_optimizers(),
        ..MethodConfig::new("compound")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::OptimizerKind;

    #[test]
    fn test_registration_order() {
        let names: Vec<_> = builtin_methods().into_iter().map(|m| m.method_name).collect();
        assert_eq!(
            names,
            [
                "instant_ngp",
                "mipnerf_360",
                "mipnerf",
                "nerfw",
                "semantic_nerf",
                "vanilla_nerf",
                "tensorf",
                "compound"
            ]
        );
    }

    #[test]
    fn test_every_builtin_validates() {
        for method in builtin_methods() {
            method
                .validate()
                .unwrap_or_else(|err| panic!("{} failed validation: {err}", method.method_name));
        }
    }

    #[test]
    fn test_instant_ngp() {
        let config = instant_ngp();
        assert!(config.trainer.mixed_precision);
        assert_eq!(config.pipeline.datamanager.kind(), DataManagerKind::Vanilla);
        assert_eq!(config.pipeline.datamanager.train_dataparser().kind(), DataParserKind::Blender);
        assert_eq!(config.pipeline.datamanager.train_num_rays_per_batch(), 8192);
        assert_eq!(config.pipeline.datamanager.eval_num_rays_per_chunk(), 8192);
        assert_eq!(config.pipeline.model.kind(), ModelKind::InstantNgp);

        let fields = &config.optimizers["fields"];
        assert_eq!(fields.optimizer.optimizer, OptimizerKind::Adam);
        assert_eq!(fields.optimizer.lr, 3e-3);
        assert_eq!(fields.optimizer.eps, 1e-15);
        assert!(fields.scheduler.is_none());
    }

    #[test]
    fn test_mipnerf_360() {
        let config = mipnerf_360();
        assert_eq!(config.experiment_name(), "mipnerf_360");
        assert_eq!(config.trainer.steps_per_test, 200);
        assert_eq!(
            config.pipeline.datamanager.train_dataparser().kind(),
            DataParserKind::MipNerf360
        );
        assert_eq!(config.pipeline.datamanager.train_num_rays_per_batch(), 8192);
        assert_eq!(config.pipeline.model.kind(), ModelKind::MipNerf360);

        let model = config.pipeline.model.as_nerf().unwrap();
        assert_eq!(model.collider, ColliderConfig::new(0.5, 20.0));
        assert_eq!(
            model.loss_coefficients,
            loss_coefficients([("ray_loss_coarse", 1.0), ("ray_loss_fine", 1.0)])
        );
        assert_eq!((model.num_coarse_samples, model.num_importance_samples), (128, 128));
        assert_eq!(config.optimizers, crate::optimizer::default_optimizers());
    }

    #[test]
    fn test_mipnerf() {
        let config = mipnerf();
        assert_eq!(config.experiment_name(), "mipnerf");
        assert_eq!(config.pipeline.model.kind(), ModelKind::MipNerf);
        let model = config.pipeline.model.as_nerf().unwrap();
        assert_eq!(model.loss_coefficients["rgb_loss_coarse"], 0.1);
        assert_eq!(model.loss_coefficients["rgb_loss_fine"], 1.0);
        assert_eq!(model.num_importance_samples, 128);
        assert_eq!(model.collider, ColliderConfig::default());
    }

    #[test]
    fn test_friends_methods_share_experiment() {
        let nerfw = nerfw();
        let semantic = semantic_nerf();
        assert_eq!(nerfw.experiment_name(), FRIENDS_EXPERIMENT);
        assert_eq!(semantic.experiment_name(), FRIENDS_EXPERIMENT);
        assert_eq!(nerfw.pipeline.datamanager.kind(), DataManagerKind::Friends);
        assert_eq!(semantic.pipeline.datamanager, nerfw.pipeline.datamanager);
        assert_eq!(nerfw.pipeline.model.kind(), ModelKind::NerfW);
    }

    #[test]
    fn test_semantic_nerf() {
        let config = semantic_nerf();
        assert_eq!(config.pipeline.model.kind(), ModelKind::SemanticNerf);
        let model = config.pipeline.model.as_nerf().unwrap();
        assert_eq!(model.loss_coefficients.len(), 3);
        assert_eq!(model.loss_coefficients["semantic_loss_fine"], 0.05);
        assert_eq!(model.samples_per_ray(), 128);
    }

    #[test]
    fn test_vanilla_nerf_uses_defaults() {
        let config = vanilla_nerf();
        assert_eq!(config, MethodConfig::new("vanilla_nerf"));
        assert_eq!(config.pipeline.datamanager.train_num_rays_per_batch(), 1024);
        assert_eq!(config.pipeline.model.as_nerf().unwrap().num_coarse_samples, 64);
    }

    #[test]
    fn test_tensorf_optimizer_groups() {
        let config = tensorf();
        assert!(config.trainer.mixed_precision);
        assert_eq!(config.pipeline.model.kind(), ModelKind::TensoRF);

        let names: Vec<_> = config.optimizers.keys().map(String::as_str).collect();
        assert_eq!(names, ["direction_encoding", "fields", "position_encoding"]);

        let fields = &config.optimizers["fields"];
        assert_eq!(fields.optimizer.lr, 1e-3);
        assert_eq!(fields.scheduler.as_ref().unwrap().lr_final, 5e-5);

        for group in ["position_encoding", "direction_encoding"] {
            let group = &config.optimizers[group];
            assert_eq!(group.optimizer.lr, 0.02);
            assert_eq!(group.scheduler.as_ref().unwrap().lr_final, 0.005);
        }
        assert!(
            config
                .optimizers
                .values()
                .all(|group| group.scheduler.as_ref().unwrap().max_steps == 15_000)
        );
        assert!((fields.learning_rate(15_000) - 5e-5).abs() < 1e-12);
    }

    #[test]
    fn test_compound_mirrors_instant_ngp() {
        let compound = compound();
        let ngp = instant_ngp();
        assert_eq!(compound.pipeline.model.kind(), ModelKind::Compound);
        assert_eq!(compound.pipeline.datamanager, ngp.pipeline.datamanager);
        assert_eq!(compound.optimizers, ngp.optimizers);
        assert_eq!(compound.trainer, ngp.trainer);
    }
}
