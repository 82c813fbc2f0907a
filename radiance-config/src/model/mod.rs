//! Model variants.
//!
//! The variant tag of [`ModelConfig`] is the reference to the concrete model an
//! external constructor builds; the payload is that model's hyperparameters and
//! nothing else.

pub mod instant_ngp;
pub mod nerf;
pub mod tensorf;

pub use instant_ngp::{CompoundModelConfig, InstantNgpModelConfig};
pub use nerf::{ColliderConfig, NerfModelConfig, NerfWModelConfig};
pub use tensorf::TensoRFModelConfig;

use crate::error::ConfigError;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Axis-aligned box bounding the reconstructed scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneBox {
    pub min: DVec3,
    pub max: DVec3,
}

impl SceneBox {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Cube centred on the origin with the given half extent.
    pub fn cube(half_extent: f64) -> Self {
        Self {
            min: DVec3::splat(-half_extent),
            max: DVec3::splat(half_extent),
        }
    }

    /// True when `min` is strictly below `max` on every axis.
    pub fn is_valid(&self) -> bool {
        self.min.cmplt(self.max).all()
    }
}

impl Default for SceneBox {
    fn default() -> Self {
        Self::cube(1.0)
    }
}

/// Tag naming the external model implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Vanilla,
    MipNerf,
    MipNerf360,
    SemanticNerf,
    NerfW,
    InstantNgp,
    TensoRF,
    Compound,
}

impl ModelKind {
    pub const ALL: [ModelKind; 8] = [
        ModelKind::Vanilla,
        ModelKind::MipNerf,
        ModelKind::MipNerf360,
        ModelKind::SemanticNerf,
        ModelKind::NerfW,
        ModelKind::InstantNgp,
        ModelKind::TensoRF,
        ModelKind::Compound,
    ];

    /// The `type` tag used in serialized configs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Vanilla => "vanilla_nerf",
            ModelKind::MipNerf => "mipnerf",
            ModelKind::MipNerf360 => "mipnerf_360",
            ModelKind::SemanticNerf => "semantic_nerf",
            ModelKind::NerfW => "nerfw",
            ModelKind::InstantNgp => "instant_ngp",
            ModelKind::TensoRF => "tensorf",
            ModelKind::Compound => "compound",
        }
    }
}

impl FromStr for ModelKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownKind {
                category: "model",
                name: s.to_string(),
            })
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model selection. The `type` key of the serialized form names the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ModelConfig {
    #[serde(rename = "vanilla_nerf")]
    Vanilla(NerfModelConfig),
    #[serde(rename = "mipnerf")]
    MipNerf(NerfModelConfig),
    #[serde(rename = "mipnerf_360")]
    MipNerf360(NerfModelConfig),
    #[serde(rename = "semantic_nerf")]
    SemanticNerf(NerfModelConfig),
    #[serde(rename = "nerfw")]
    NerfW(NerfWModelConfig),
    #[serde(rename = "instant_ngp")]
    InstantNgp(InstantNgpModelConfig),
    #[serde(rename = "tensorf")]
    TensoRF(TensoRFModelConfig),
    #[serde(rename = "compound")]
    Compound(CompoundModelConfig),
}

impl ModelConfig {
    /// Default configuration for the given model.
    pub fn from_kind(kind: ModelKind) -> Self {
        match kind {
            ModelKind::Vanilla => ModelConfig::Vanilla(Default::default()),
            ModelKind::MipNerf => ModelConfig::MipNerf(Default::default()),
            ModelKind::MipNerf360 => ModelConfig::MipNerf360(Default::default()),
            ModelKind::SemanticNerf => ModelConfig::SemanticNerf(Default::default()),
            ModelKind::NerfW => ModelConfig::NerfW(Default::default()),
            ModelKind::InstantNgp => ModelConfig::InstantNgp(Default::default()),
            ModelKind::TensoRF => ModelConfig::TensoRF(Default::default()),
            ModelKind::Compound => ModelConfig::Compound(Default::default()),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            ModelConfig::Vanilla(_) => ModelKind::Vanilla,
            ModelConfig::MipNerf(_) => ModelKind::MipNerf,
            ModelConfig::MipNerf360(_) => ModelKind::MipNerf360,
            ModelConfig::SemanticNerf(_) => ModelKind::SemanticNerf,
            ModelConfig::NerfW(_) => ModelKind::NerfW,
            ModelConfig::InstantNgp(_) => ModelKind::InstantNgp,
            ModelConfig::TensoRF(_) => ModelKind::TensoRF,
            ModelConfig::Compound(_) => ModelKind::Compound,
        }
    }

    /// Shared NeRF-family hyperparameters, for the variants that use them.
    pub fn as_nerf(&self) -> Option<&NerfModelConfig> {
        match self {
            ModelConfig::Vanilla(config)
            | ModelConfig::MipNerf(config)
            | ModelConfig::MipNerf360(config)
            | ModelConfig::SemanticNerf(config) => Some(config),
            _ => None,
        }
    }

    pub fn loss_coefficients(&self) -> &BTreeMap<String, f64> {
        match self {
            ModelConfig::Vanilla(config)
            | ModelConfig::MipNerf(config)
            | ModelConfig::MipNerf360(config)
            | ModelConfig::SemanticNerf(config) => &config.loss_coefficients,
            ModelConfig::NerfW(config) => &config.loss_coefficients,
            ModelConfig::InstantNgp(config) => &config.loss_coefficients,
            ModelConfig::TensoRF(config) => &config.loss_coefficients,
            ModelConfig::Compound(config) => &config.loss_coefficients,
        }
    }

    pub fn eval_num_rays_per_chunk(&self) -> u32 {
        match self {
            ModelConfig::Vanilla(config)
            | ModelConfig::MipNerf(config)
            | ModelConfig::MipNerf360(config)
            | ModelConfig::SemanticNerf(config) => config.eval_num_rays_per_chunk,
            ModelConfig::NerfW(config) => config.eval_num_rays_per_chunk,
            ModelConfig::InstantNgp(config) => config.eval_num_rays_per_chunk,
            ModelConfig::TensoRF(config) => config.eval_num_rays_per_chunk,
            ModelConfig::Compound(config) => config.eval_num_rays_per_chunk,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig::Vanilla(NerfModelConfig::default())
    }
}
