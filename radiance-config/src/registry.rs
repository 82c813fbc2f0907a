use crate::error::ConfigError;
use crate::method::MethodConfig;
use crate::methods::builtin_methods;
use crate::overrides::{Override, apply_overrides};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Registry mapping method names to base configs.
///
/// Entries keep registration order. Base configs are shared as
/// `Arc<MethodConfig>` and never change after registration; derived configs come
/// from [`MethodRegistry::resolve`].
#[derive(Debug, Clone, Default)]
pub struct MethodRegistry {
    entries: Vec<Arc<MethodConfig>>,
    index: HashMap<String, usize>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in method table.
    pub fn with_builtin_methods() -> Self {
        let mut registry = Self::new();
        for config in builtin_methods() {
            debug_assert!(!registry.contains(&config.method_name));
            registry.insert(config);
        }
        debug!("Registered {} built-in methods", registry.len());
        registry
    }

    /// Register `config` under `name`.
    ///
    /// Fails without touching the registry when `name` is taken or differs from
    /// `config.method_name`.
    pub fn register(&mut self, name: &str, config: MethodConfig) -> Result<(), ConfigError> {
        if self.contains(name) {
            return Err(ConfigError::DuplicateKey(name.to_string()));
        }
        if config.method_name != name {
            return Err(ConfigError::NameMismatch {
                key: name.to_string(),
                method_name: config.method_name,
            });
        }
        self.insert(config);
        debug!("Registered method '{}'", name);
        Ok(())
    }

    fn insert(&mut self, config: MethodConfig) {
        self.index.insert(config.method_name.clone(), self.entries.len());
        self.entries.push(Arc::new(config));
    }

    /// Base config for `name`.
    pub fn get(&self, name: &str) -> Result<Arc<MethodConfig>, ConfigError> {
        self.index
            .get(name)
            .map(|&slot| Arc::clone(&self.entries[slot]))
            .ok_or_else(|| ConfigError::UnknownMethod {
                name: name.to_string(),
                available: self.list_names().into_iter().map(str::to_string).collect(),
            })
    }

    /// Fresh config for `name` with `overrides` applied, checked with
    /// [`MethodConfig::validate`].
    pub fn resolve(&self, name: &str, overrides: &[Override]) -> Result<MethodConfig, ConfigError> {
        let base = self.get(name)?;
        let config = apply_overrides(&base, overrides)?;
        config.validate()?;
        debug!(
            "Resolved method '{}' with {} override(s)",
            name,
            overrides.len()
        );
        Ok(config)
    }

    /// Registered names in registration order.
    pub fn list_names(&self) -> Vec<&str> {
        self.entries.iter().map(|c| c.method_name.as_str()).collect()
    }

    /// Base configs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<MethodConfig>> {
        self.entries.iter()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
