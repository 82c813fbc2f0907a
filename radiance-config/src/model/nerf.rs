//! Hyperparameters shared by the coarse-to-fine NeRF family
//! (vanilla NeRF, mip-NeRF, mip-NeRF 360, semantic NeRF) and NeRF-W.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Near/far bounds applied to every ray before sampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColliderConfig {
    pub near_plane: f64,
    pub far_plane: f64,
}

impl ColliderConfig {
    pub fn new(near_plane: f64, far_plane: f64) -> Self {
        Self {
            near_plane,
            far_plane,
        }
    }

    /// Depth range covered by the collider.
    pub fn depth_range(&self) -> f64 {
        self.far_plane - self.near_plane
    }
}

impl Default for ColliderConfig {
    fn default() -> Self {
        Self::new(2.0, 6.0)
    }
}

pub(crate) fn loss_coefficients<const N: usize>(terms: [(&str, f64); N]) -> BTreeMap<String, f64> {
    terms
        .into_iter()
        .map(|(name, weight)| (name.to_string(), weight))
        .collect()
}

/// Coarse and importance sample counts plus loss weighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NerfModelConfig {
    pub enable_collider: bool,
    pub collider: ColliderConfig,
    /// Weight per named loss term.
    pub loss_coefficients: BTreeMap<String, f64>,
    /// Uniform samples per ray for the coarse pass.
    pub num_coarse_samples: u32,
    /// Additional samples drawn from the coarse weight distribution.
    pub num_importance_samples: u32,
    pub eval_num_rays_per_chunk: u32,
}

impl Default for NerfModelConfig {
    fn default() -> Self {
        Self {
            enable_collider: true,
            collider: ColliderConfig::default(),
            loss_coefficients: loss_coefficients([("rgb_loss_coarse", 1.0), ("rgb_loss_fine", 1.0)]),
            num_coarse_samples: 64,
            num_importance_samples: 128,
            eval_num_rays_per_chunk: 4096,
        }
    }
}

impl NerfModelConfig {
    /// Total samples evaluated per ray across both passes.
    pub fn samples_per_ray(&self) -> u32 {
        self.num_coarse_samples + self.num_importance_samples
    }
}

/// NeRF in the Wild: per-image appearance and transient embeddings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NerfWModelConfig {
    pub enable_collider: bool,
    pub collider: ColliderConfig,
    pub loss_coefficients: BTreeMap<String, f64>,
    pub num_coarse_samples: u32,
    pub num_importance_samples: u32,
    pub eval_num_rays_per_chunk: u32,
    /// Lower bound on predicted transient uncertainty.
    pub uncertainty_min: f64,
    /// Size of the embedding tables; must cover the training image count.
    pub num_images: u32,
    pub appearance_embed_dim: u32,
    pub transient_embed_dim: u32,
}

impl Default for NerfWModelConfig {
    fn default() -> Self {
        Self {
            enable_collider: true,
            collider: ColliderConfig::default(),
            loss_coefficients: loss_coefficients([("rgb_loss_coarse", 1.0), ("rgb_loss_fine", 1.0)]),
            num_coarse_samples: 64,
            num_importance_samples: 64,
            eval_num_rays_per_chunk: 4096,
            uncertainty_min: 0.03,
            num_images: 10_000,
            appearance_embed_dim: 48,
            transient_embed_dim: 16,
        }
    }
}
