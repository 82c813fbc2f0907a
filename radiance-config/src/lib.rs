//! Radiance Config Crate
//!
//! Named experiment configurations for radiance field training. Each method binds a
//! name to a complete pipeline description (data manager, data parser, model,
//! trainer, optimizers). Model, data and trainer implementations live elsewhere;
//! this crate only stores which variant to build and its hyperparameters.
//!
//! ## Modules
//!
//! - [`method`]: The top-level [`MethodConfig`] and run-level settings
//! - [`pipeline`], [`datamanager`], [`dataparser`], [`model`]: Pipeline components
//! - [`optimizer`]: Optimizer and learning-rate schedule values
//! - [`methods`]: The built-in method table
//! - [`registry`]: [`MethodRegistry`] for registration and lookup
//! - [`overrides`]: Path-based overrides producing derived configs
//!
//! ## Example
//!
//! ```
//! use radiance_config::{FieldPath, MethodRegistry, Override};
//!
//! let registry = MethodRegistry::with_builtin_methods();
//! let overrides = vec!["pipeline.model.num_coarse_samples=128".parse::<Override>()?];
//! let config = registry.resolve("vanilla_nerf", &overrides)?;
//! let path = FieldPath::parse("pipeline.model.num_coarse_samples")?;
//! assert_eq!(config.get_path(&path)?, 128);
//! # Ok::<(), radiance_config::ConfigError>(())
//! ```

pub mod datamanager;
pub mod dataparser;
pub mod error;
pub mod method;
pub mod methods;
pub mod model;
pub mod optimizer;
pub mod overrides;
pub mod path;
pub mod pipeline;
pub mod registry;
pub mod trainer;
mod validate;

pub use datamanager::{
    DataManagerConfig, DataManagerKind, FriendsDataManagerConfig, VanillaDataManagerConfig,
};
pub use dataparser::{
    BlenderDataParserConfig, DataParserConfig, DataParserKind, FriendsDataParserConfig,
    InstantNgpDataParserConfig, MipNerf360DataParserConfig,
};
pub use error::ConfigError;
pub use method::{LoggingConfig, MachineConfig, MethodConfig, ViewerConfig};
pub use model::{
    ColliderConfig, CompoundModelConfig, InstantNgpModelConfig, ModelConfig, ModelKind,
    NerfModelConfig, NerfWModelConfig, SceneBox, TensoRFModelConfig,
};
pub use optimizer::{
    OptimizerConfig, OptimizerGroupConfig, OptimizerKind, ScheduleKind, SchedulerConfig,
};
pub use overrides::{Override, apply_overrides};
pub use path::FieldPath;
pub use pipeline::PipelineConfig;
pub use registry::MethodRegistry;
pub use trainer::TrainerConfig;
