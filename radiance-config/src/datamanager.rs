//! Data manager variants.
//!
//! Data managers batch sampled rays for training and evaluation. They own the
//! data parser configuration for their split.

use crate::dataparser::{DataParserConfig, FriendsDataParserConfig};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tag naming the external data manager implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataManagerKind {
    Vanilla,
    Friends,
}

impl DataManagerKind {
    pub const ALL: [DataManagerKind; 2] = [DataManagerKind::Vanilla, DataManagerKind::Friends];

    /// The `type` tag used in serialized configs.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataManagerKind::Vanilla => "vanilla",
            DataManagerKind::Friends => "friends",
        }
    }
}

impl FromStr for DataManagerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownKind {
                category: "data manager",
                name: s.to_string(),
            })
    }
}

impl fmt::Display for DataManagerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Random ray sampling over a single parsed dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VanillaDataManagerConfig {
    pub train_dataparser: DataParserConfig,
    pub train_num_rays_per_batch: u32,
    /// Number of images rays are drawn from per batch; `None` uses all of them.
    pub train_num_images_to_sample_from: Option<u32>,
    /// Parser for the evaluation split; `None` reuses the training parser.
    pub eval_dataparser: Option<DataParserConfig>,
    pub eval_num_rays_per_chunk: u32,
    pub eval_image_indices: Vec<u32>,
}

impl Default for VanillaDataManagerConfig {
    fn default() -> Self {
        Self {
            train_dataparser: DataParserConfig::default(),
            train_num_rays_per_batch: 1024,
            train_num_images_to_sample_from: None,
            eval_dataparser: None,
            eval_num_rays_per_chunk: 4096,
            eval_image_indices: vec![0],
        }
    }
}

/// Vanilla batching over the Friends captures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FriendsDataManagerConfig {
    pub train_dataparser: DataParserConfig,
    pub train_num_rays_per_batch: u32,
    pub train_num_images_to_sample_from: Option<u32>,
    pub eval_dataparser: Option<DataParserConfig>,
    pub eval_num_rays_per_chunk: u32,
    pub eval_image_indices: Vec<u32>,
}

impl Default for FriendsDataManagerConfig {
    fn default() -> Self {
        Self {
            train_dataparser: DataParserConfig::Friends(FriendsDataParserConfig::default()),
            train_num_rays_per_batch: 1024,
            train_num_images_to_sample_from: None,
            eval_dataparser: None,
            eval_num_rays_per_chunk: 4096,
            eval_image_indices: vec![0],
        }
    }
}

/// Data manager selection. The `type` key of the serialized form names the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DataManagerConfig {
    #[serde(rename = "vanilla")]
    Vanilla(VanillaDataManagerConfig),
    #[serde(rename = "friends")]
    Friends(FriendsDataManagerConfig),
}

impl DataManagerConfig {
    /// Default configuration for the given data manager.
    pub fn from_kind(kind: DataManagerKind) -> Self {
        match kind {
            DataManagerKind::Vanilla => DataManagerConfig::Vanilla(Default::default()),
            DataManagerKind::Friends => DataManagerConfig::Friends(Default::default()),
        }
    }

    /// Vanilla batching over the given training parser with default batch sizes.
    pub fn vanilla(train_dataparser: DataParserConfig) -> Self {
        DataManagerConfig::Vanilla(VanillaDataManagerConfig {
            train_dataparser,
            ..Default::default()
        })
    }

    pub fn kind(&self) -> DataManagerKind {
        match self {
            DataManagerConfig::Vanilla(_) => DataManagerKind::Vanilla,
            DataManagerConfig::Friends(_) => DataManagerKind::Friends,
        }
    }

    pub fn train_dataparser(&self) -> &DataParserConfig {
        match self {
            DataManagerConfig::Vanilla(config) => &config.train_dataparser,
            DataManagerConfig::Friends(config) => &config.train_dataparser,
        }
    }

    /// Parser for the evaluation split, falling back to the training parser.
    pub fn eval_dataparser(&self) -> &DataParserConfig {
        let eval = match self {
            DataManagerConfig::Vanilla(config) => config.eval_dataparser.as_ref(),
            DataManagerConfig::Friends(config) => config.eval_dataparser.as_ref(),
        };
        eval.unwrap_or_else(|| self.train_dataparser())
    }

    pub fn train_num_rays_per_batch(&self) -> u32 {
        match self {
            DataManagerConfig::Vanilla(config) => config.train_num_rays_per_batch,
            DataManagerConfig::Friends(config) => config.train_num_rays_per_batch,
        }
    }

    pub fn eval_num_rays_per_chunk(&self) -> u32 {
        match self {
            DataManagerConfig::Vanilla(config) => config.eval_num_rays_per_chunk,
            DataManagerConfig::Friends(config) => config.eval_num_rays_per_chunk,
        }
    }
}

impl Default for DataManagerConfig {
    fn default() -> Self {
        DataManagerConfig::Vanilla(VanillaDataManagerConfig::default())
    }
}
