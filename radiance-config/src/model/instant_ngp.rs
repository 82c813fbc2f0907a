//! Hash-grid models: Instant-NGP and the compound model built on top of it.

use super::SceneBox;
use super::nerf::{ColliderConfig, loss_coefficients};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Occupancy-grid accelerated ray marching over a multiresolution hash encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstantNgpModelConfig {
    pub enable_collider: bool,
    pub collider: Option<ColliderConfig>,
    pub loss_coefficients: BTreeMap<String, f64>,
    /// Region covered by the occupancy grid.
    pub scene_aabb: SceneBox,
    pub num_samples: u32,
    /// Step size growth with distance; 0 gives uniform steps.
    pub cone_angle: f64,
    pub render_step_size: f64,
    pub near_plane: f64,
    pub max_num_samples_per_ray: u32,
    pub eval_num_rays_per_chunk: u32,
}

impl Default for InstantNgpModelConfig {
    fn default() -> Self {
        Self {
            enable_collider: false,
            collider: None,
            loss_coefficients: loss_coefficients([("rgb_loss", 1.0)]),
            scene_aabb: SceneBox::cube(1.5),
            num_samples: 1024,
            cone_angle: 0.0,
            render_step_size: 0.01,
            near_plane: 0.05,
            max_num_samples_per_ray: 24,
            eval_num_rays_per_chunk: 8192,
        }
    }
}

/// Instant-NGP field with a proposal sampler in front of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompoundModelConfig {
    pub enable_collider: bool,
    pub collider: Option<ColliderConfig>,
    pub loss_coefficients: BTreeMap<String, f64>,
    pub scene_aabb: SceneBox,
    pub num_samples: u32,
    pub cone_angle: f64,
    pub render_step_size: f64,
    pub near_plane: f64,
    pub max_num_samples_per_ray: u32,
    pub eval_num_rays_per_chunk: u32,
    pub num_proposal_samples: u32,
}

impl Default for CompoundModelConfig {
    fn default() -> Self {
        let base = InstantNgpModelConfig::default();
        Self {
            enable_collider: base.enable_collider,
            collider: base.collider,
            loss_coefficients: base.loss_coefficients,
            scene_aabb: base.scene_aabb,
            num_samples: base.num_samples,
            cone_angle: base.cone_angle,
            render_step_size: base.render_step_size,
            near_plane: base.near_plane,
            max_num_samples_per_ray: base.max_num_samples_per_ray,
            eval_num_rays_per_chunk: base.eval_num_rays_per_chunk,
            num_proposal_samples: 64,
        }
    }
}
