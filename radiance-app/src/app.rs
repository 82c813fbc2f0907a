//! Command dispatch and logging setup.

use crate::errors::AppError;
use clap::{Args, Subcommand};
use radiance_config::{FieldPath, MethodConfig, MethodRegistry, Override};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Logging configuration.
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `config.level`.
///
/// Logs go to stderr; stdout is reserved for config output.
pub fn init_logging(config: &LoggingConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[derive(Args, Debug, Default)]
pub struct OverrideArgs {
    /// Override one field of the base config; repeatable, applied in order
    #[arg(short = 's', long = "set", value_name = "PATH=VALUE")]
    set: Vec<String>,
}

impl OverrideArgs {
    fn to_overrides(&self) -> Result<Vec<Override>, AppError> {
        let overrides = self
            .set
            .iter()
            .map(|arg| arg.parse::<Override>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(overrides)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List registered methods in registration order
    List {
        /// Also print model, data manager and data parser of each method
        #[arg(short, long)]
        verbose: bool,
    },
    /// Print the resolved config of a method as JSON
    Show {
        method: String,
        #[command(flatten)]
        overrides: OverrideArgs,
    },
    /// Print one field of the resolved config as JSON
    Get {
        method: String,
        /// Dotted field path, e.g. pipeline.model.num_coarse_samples
        path: String,
        #[command(flatten)]
        overrides: OverrideArgs,
    },
    /// Write the resolved config of a method to a JSON file
    Save {
        method: String,
        file: PathBuf,
        #[command(flatten)]
        overrides: OverrideArgs,
    },
}

fn resolve(
    registry: &MethodRegistry,
    method: &str,
    overrides: &OverrideArgs,
) -> Result<MethodConfig, AppError> {
    let overrides = overrides.to_overrides()?;
    Ok(registry.resolve(method, &overrides)?)
}

/// Execute `command` against the built-in registry, writing results to `out`.
pub fn run(command: Command, out: &mut impl Write) -> Result<(), AppError> {
    let registry = MethodRegistry::with_builtin_methods();

    match command {
        Command::List { verbose } => {
            for config in registry.iter() {
                if verbose {
                    let datamanager = &config.pipeline.datamanager;
                    writeln!(
                        out,
                        "{:<16} model={:<14} datamanager={:<8} dataparser={}",
                        config.method_name,
                        config.pipeline.model.kind().as_str(),
                        datamanager.kind().as_str(),
                        datamanager.train_dataparser().kind()
                    )?;
                } else {
                    writeln!(out, "{}", config.method_name)?;
                }
            }
        }
        Command::Show { method, overrides } => {
            let config = resolve(&registry, &method, &overrides)?;
            writeln!(out, "{}", config.to_json_pretty()?)?;
        }
        Command::Get {
            method,
            path,
            overrides,
        } => {
            let path = FieldPath::parse(&path)?;
            let config = resolve(&registry, &method, &overrides)?;
            let value = config.get_path(&path)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        }
        Command::Save {
            method,
            file,
            overrides,
        } => {
            let config = resolve(&registry, &method, &overrides)?;
            config.save(&file)?;
            info!("Wrote '{}' config to {}", method, file.display());
        }
    }
    Ok(())
}
