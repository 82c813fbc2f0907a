//! Data parser variants.
//!
//! A data parser turns a raw capture directory into the standard scene
//! description consumed by data managers. Each variant only carries the knobs of
//! its own dataset format.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Tag naming the external data parser implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataParserKind {
    Blender,
    MipNerf360,
    Friends,
    InstantNgp,
}

impl DataParserKind {
    pub const ALL: [DataParserKind; 4] = [
        DataParserKind::Blender,
        DataParserKind::MipNerf360,
        DataParserKind::Friends,
        DataParserKind::InstantNgp,
    ];

    /// The `type` tag used in serialized configs.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataParserKind::Blender => "blender",
            DataParserKind::MipNerf360 => "mipnerf_360",
            DataParserKind::Friends => "friends",
            DataParserKind::InstantNgp => "instant_ngp",
        }
    }
}

impl FromStr for DataParserKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownKind {
                category: "data parser",
                name: s.to_string(),
            })
    }
}

impl fmt::Display for DataParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synthetic Blender scenes (NeRF synthetic dataset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlenderDataParserConfig {
    pub data_directory: PathBuf,
    pub scale_factor: f64,
    /// Background color composited behind transparent pixels; `None` keeps alpha.
    pub alpha_color: Option<[f64; 3]>,
}

impl Default for BlenderDataParserConfig {
    fn default() -> Self {
        Self {
            data_directory: PathBuf::from("data/blender/lego"),
            scale_factor: 1.0,
            alpha_color: Some([1.0, 1.0, 1.0]),
        }
    }
}

/// Unbounded 360 degree captures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MipNerf360DataParserConfig {
    pub data_directory: PathBuf,
    pub downscale_factor: u32,
    /// Every n-th image goes to the validation split.
    pub val_skip: u32,
    /// Rescale poses so the scene fits the unit cube.
    pub auto_scale: bool,
    pub aabb_scale: f64,
}

impl Default for MipNerf360DataParserConfig {
    fn default() -> Self {
        Self {
            data_directory: PathBuf::from("data/mipnerf_360/garden"),
            downscale_factor: 1,
            val_skip: 8,
            auto_scale: true,
            aabb_scale: 4.0,
        }
    }
}

/// Sitcom set reconstructions with optional semantic labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FriendsDataParserConfig {
    pub data_directory: PathBuf,
    pub include_semantics: bool,
    pub downscale_factor: u32,
    pub scene_scale: f64,
}

impl Default for FriendsDataParserConfig {
    fn default() -> Self {
        Self {
            data_directory: PathBuf::from("data/friends/TBBT-big_living_room"),
            include_semantics: true,
            downscale_factor: 8,
            scene_scale: 4.0,
        }
    }
}

/// Captures stored in the instant-ngp `transforms.json` layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstantNgpDataParserConfig {
    pub data_directory: PathBuf,
    pub scale_factor: f64,
    pub scene_scale: f64,
}

impl Default for InstantNgpDataParserConfig {
    fn default() -> Self {
        Self {
            data_directory: PathBuf::from("data/ours/posterv2"),
            scale_factor: 1.0,
            scene_scale: 0.33,
        }
    }
}

/// Data parser selection. The `type` key of the serialized form names the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DataParserConfig {
    #[serde(rename = "blender")]
    Blender(BlenderDataParserConfig),
    #[serde(rename = "mipnerf_360")]
    MipNerf360(MipNerf360DataParserConfig),
    #[serde(rename = "friends")]
    Friends(FriendsDataParserConfig),
    #[serde(rename = "instant_ngp")]
    InstantNgp(InstantNgpDataParserConfig),
}

impl DataParserConfig {
    /// Default configuration for the given parser.
    pub fn from_kind(kind: DataParserKind) -> Self {
        match kind {
            DataParserKind::Blender => DataParserConfig::Blender(Default::default()),
            DataParserKind::MipNerf360 => DataParserConfig::MipNerf360(Default::default()),
            DataParserKind::Friends => DataParserConfig::Friends(Default::default()),
            DataParserKind::InstantNgp => DataParserConfig::InstantNgp(Default::default()),
        }
    }

    pub fn kind(&self) -> DataParserKind {
        match self {
            DataParserConfig::Blender(_) => DataParserKind::Blender,
            DataParserConfig::MipNerf360(_) => DataParserKind::MipNerf360,
            DataParserConfig::Friends(_) => DataParserKind::Friends,
            DataParserConfig::InstantNgp(_) => DataParserKind::InstantNgp,
        }
    }

    /// Root directory of the capture this parser reads.
    pub fn data_directory(&self) -> &PathBuf {
        match self {
            DataParserConfig::Blender(config) => &config.data_directory,
            DataParserConfig::MipNerf360(config) => &config.data_directory,
            DataParserConfig::Friends(config) => &config.data_directory,
            DataParserConfig::InstantNgp(config) => &config.data_directory,
        }
    }
}

impl Default for DataParserConfig {
    fn default() -> Self {
        DataParserConfig::Blender(BlenderDataParserConfig::default())
    }
}
