//! TensoRF: factorised radiance fields with progressive grid upsampling.

use super::SceneBox;
use super::nerf::loss_coefficients;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TensoRFModelConfig {
    /// Grid resolution at the start of training.
    pub init_resolution: u32,
    /// Grid resolution after the last upsampling step.
    pub final_resolution: u32,
    /// Iterations at which the grid is upsampled, ascending.
    pub upsampling_iters: Vec<u64>,
    pub num_samples: u32,
    pub num_uniform_samples: u32,
    pub num_den_components: u32,
    pub num_color_components: u32,
    pub appearance_dim: u32,
    pub loss_coefficients: BTreeMap<String, f64>,
    pub scene_aabb: SceneBox,
    pub eval_num_rays_per_chunk: u32,
}

impl Default for TensoRFModelConfig {
    fn default() -> Self {
        Self {
            init_resolution: 128,
            final_resolution: 200,
            upsampling_iters: vec![5000, 5500, 7000],
            num_samples: 50,
            num_uniform_samples: 200,
            num_den_components: 16,
            num_color_components: 48,
            appearance_dim: 27,
            loss_coefficients: loss_coefficients([("rgb_loss", 1.0)]),
            scene_aabb: SceneBox::cube(1.5),
            eval_num_rays_per_chunk: 4096,
        }
    }
}

impl TensoRFModelConfig {
    /// Grid resolution in effect at `step`.
    ///
    /// The resolution grows geometrically from `init_resolution` to
    /// `final_resolution`, one step per entry in `upsampling_iters`.
    pub fn resolution_at(&self, step: u64) -> u32 {
        let stages = self.upsampling_iters.len();
        let reached = self.upsampling_iters.iter().filter(|&&iter| step >= iter).count();
        if stages == 0 || reached == 0 {
            return self.init_resolution;
        }
        if reached == stages {
            return self.final_resolution;
        }
        let ratio = self.final_resolution as f64 / self.init_resolution as f64;
        let t = reached as f64 / stages as f64;
        (self.init_resolution as f64 * ratio.powf(t)).round() as u32
    }
}
