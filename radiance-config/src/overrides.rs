//! Path-based overrides on top of a base method config.
//!
//! An override names one field by its dotted path and supplies a JSON value for
//! it. Resolution works on the JSON form of the config tree and re-reads the
//! typed config after every override, so each failure points at the override
//! that caused it. The base config is never modified.

use crate::error::ConfigError;
use crate::method::MethodConfig;
use crate::path::FieldPath;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Key carrying the variant name of a polymorphic component.
pub const VARIANT_TAG: &str = "type";

/// Fields holding keyed maps. They can be replaced only as a whole.
pub const MAPPING_FIELDS: [&str; 2] = ["optimizers", "loss_coefficients"];

/// One `path = value` replacement.
#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    pub path: FieldPath,
    pub value: Value,
}

impl Override {
    pub fn new(path: FieldPath, value: impl Into<Value>) -> Self {
        Self {
            path,
            value: value.into(),
        }
    }

    /// Write this override into the JSON form of a config tree, returning the
    /// value it replaced.
    fn write_into(&self, root: &mut Value) -> Result<Value, ConfigError> {
        let segments = self.path.segments();
        let Some((field, parents)) = segments.split_last() else {
            return Err(ConfigError::InvalidOverride(self.path.to_string()));
        };

        let mut node = root;
        for (depth, segment) in parents.iter().enumerate() {
            node = node
                .as_object_mut()
                .and_then(|object| object.get_mut(segment))
                .ok_or_else(|| ConfigError::unknown_field(&self.path))?;
            if MAPPING_FIELDS.contains(&segment.as_str()) {
                return Err(ConfigError::WholeValueOnly {
                    path: self.path.to_string(),
                    field: self.path.prefix(depth + 1),
                });
            }
        }

        let object = node
            .as_object_mut()
            .ok_or_else(|| ConfigError::unknown_field(&self.path))?;
        if field == VARIANT_TAG && object.contains_key(VARIANT_TAG) {
            return Err(ConfigError::WholeValueOnly {
                path: self.path.to_string(),
                field: self.path.prefix(parents.len()),
            });
        }

        let slot = object
            .get_mut(field)
            .ok_or_else(|| ConfigError::unknown_field(&self.path))?;
        check_kind(&self.path, slot, &self.value)?;
        Ok(std::mem::replace(slot, self.value.clone()))
    }
}

impl fmt::Display for Override {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.path, self.value)
    }
}

impl FromStr for Override {
    type Err = ConfigError;

    /// Parse `PATH=VALUE`. The value is read as JSON when it is valid JSON and as
    /// a plain string otherwise, so `experiment_name=lego` needs no quoting.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, raw) = s
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidOverride(s.to_string()))?;
        let path = FieldPath::parse(path).map_err(|_| ConfigError::InvalidOverride(s.to_string()))?;
        let raw = raw.trim();
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        Ok(Self { path, value })
    }
}

/// Apply `overrides` in order to a copy of `base`.
///
/// Fails on the first override that names an unknown field, targets a variant
/// tag or the inside of a mapping-valued field, or whose value does not fit the
/// field's declared type. An object value replaces the whole field and must
/// spell out every key of it, nested objects included; keys are never filled in
/// from defaults. Later overrides of the same path win.
pub fn apply_overrides(
    base: &MethodConfig,
    overrides: &[Override],
) -> Result<MethodConfig, ConfigError> {
    let mut resolved = base.clone();
    if overrides.is_empty() {
        return Ok(resolved);
    }

    let mut tree = serde_json::to_value(base)?;
    for item in overrides {
        let previous = item.write_into(&mut tree)?;
        resolved = MethodConfig::deserialize(&tree).map_err(|err| ConfigError::TypeMismatch {
            path: item.path.to_string(),
            expected: expected_kind(&previous).to_string(),
            found: format!("{} ({})", kind_name(&item.value), err),
        })?;
        if item.value.is_object() {
            let written = serde_json::to_value(&resolved)?;
            let missing = lookup(&written, item.path.segments())
                .and_then(|stored| first_missing_key(&item.value, stored));
            if let Some(missing) = missing {
                return Err(ConfigError::TypeMismatch {
                    path: item.path.to_string(),
                    expected: "complete object".to_string(),
                    found: format!("object without '{missing}'"),
                });
            }
        }
        debug!(method = %base.method_name, "Applied override {}", item);
    }
    Ok(resolved)
}

impl MethodConfig {
    /// Derived config with `overrides` applied; see [`apply_overrides`].
    pub fn with_overrides(&self, overrides: &[Override]) -> Result<MethodConfig, ConfigError> {
        apply_overrides(self, overrides)
    }

    /// Read one field by path as JSON.
    ///
    /// Unlike overrides, reads may descend into mapping-valued fields and read
    /// variant tags.
    pub fn get_path(&self, path: &FieldPath) -> Result<Value, ConfigError> {
        let tree = serde_json::to_value(self)?;
        lookup(&tree, path.segments())
            .cloned()
            .ok_or_else(|| ConfigError::unknown_field(path))
    }
}

fn lookup<'a>(tree: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(tree, |node, segment| node.as_object().and_then(|o| o.get(segment)))
}

/// Dotted path of the first key present in `stored` but absent from `given`.
fn first_missing_key(given: &Value, stored: &Value) -> Option<String> {
    let (Value::Object(given), Value::Object(stored)) = (given, stored) else {
        return None;
    };
    stored.iter().find_map(|(key, stored_child)| match given.get(key) {
        None => Some(key.clone()),
        Some(given_child) => {
            first_missing_key(given_child, stored_child).map(|nested| format!("{key}.{nested}"))
        }
    })
}

fn check_kind(path: &FieldPath, current: &Value, new: &Value) -> Result<(), ConfigError> {
    // Null on either side defers to the typed re-read: optional fields accept null
    // and an unset optional gives no hint of its declared type.
    if current.is_null() || new.is_null() {
        return Ok(());
    }

    let compatible = match (current, new) {
        (Value::Bool(_), Value::Bool(_)) => true,
        (Value::Number(current), Value::Number(new)) => current.is_f64() || !new.is_f64(),
        (Value::String(_), Value::String(_)) => true,
        (Value::Array(_), Value::Array(_)) => true,
        (Value::Object(_), Value::Object(_)) => true,
        _ => false,
    };

    if compatible {
        Ok(())
    } else {
        Err(ConfigError::TypeMismatch {
            path: path.to_string(),
            expected: kind_name(current).to_string(),
            found: kind_name(new).to_string(),
        })
    }
}

/// Kind reported for a field whose current value is `previous`. An unset
/// optional carries no kind of its own.
fn expected_kind(previous: &Value) -> &'static str {
    if previous.is_null() {
        "optional value"
    } else {
        kind_name(previous)
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods;
    use crate::model::{ModelConfig, ModelKind};
    use proptest::prelude::*;
    use serde_json::json;

    fn path(s: &str) -> FieldPath {
        FieldPath::parse(s).unwrap()
    }

    fn set(s: &str, value: Value) -> Override {
        Override::new(path(s), value)
    }

    #[test]
    fn test_zero_overrides_yield_equal_config() {
        let base = methods::vanilla_nerf();
        assert_eq!(apply_overrides(&base, &[]).unwrap(), base);
    }

    #[test]
    fn test_vanilla_nerf_coarse_samples_scenario() {
        let base = methods::vanilla_nerf();
        assert_eq!(base.get_path(&path("pipeline.model.num_coarse_samples")).unwrap(), 64);

        let derived =
            apply_overrides(&base, &[set("pipeline.model.numCoarseSamples", json!(128))]).unwrap();

        assert_eq!(
            derived.get_path(&path("pipeline.model.num_coarse_samples")).unwrap(),
            128
        );
        assert_eq!(
            derived.pipeline.datamanager.train_num_rays_per_batch(),
            base.pipeline.datamanager.train_num_rays_per_batch()
        );
        assert_eq!(derived.pipeline.datamanager, base.pipeline.datamanager);
        assert_eq!(derived.trainer, base.trainer);
        assert_eq!(derived.optimizers, base.optimizers);
        assert_eq!(base.get_path(&path("pipeline.model.num_coarse_samples")).unwrap(), 64);
    }

    #[test]
    fn test_sibling_fields_unchanged() {
        let base = methods::mipnerf_360();
        let derived = apply_overrides(&base, &[set("trainer.steps_per_save", json!(250))]).unwrap();

        assert_eq!(derived.trainer.steps_per_save, 250);
        let restored = crate::TrainerConfig {
            steps_per_save: base.trainer.steps_per_save,
            ..derived.trainer.clone()
        };
        assert_eq!(restored, base.trainer);
        assert_eq!(derived.pipeline, base.pipeline);
    }

    #[test]
    fn test_unknown_path_fails_and_base_is_untouched() {
        let base = methods::vanilla_nerf();
        let snapshot = base.clone();

        let result = apply_overrides(&base, &[set("pipeline.model.num_fine_samples", json!(1))]);
        assert!(matches!(
            result,
            Err(ConfigError::UnknownField { path }) if path == "pipeline.model.num_fine_samples"
        ));
        assert_eq!(base, snapshot);
    }

    #[test]
    fn test_unknown_top_level_section() {
        let base = methods::vanilla_nerf();
        let result = apply_overrides(&base, &[set("scheduler.lr", json!(1.0))]);
        assert!(matches!(result, Err(ConfigError::UnknownField { .. })));
    }

    #[test]
    fn test_field_of_other_variant_is_unknown() {
        let base = methods::vanilla_nerf();
        let result = apply_overrides(&base, &[set("pipeline.model.final_resolution", json!(300))]);
        assert!(matches!(result, Err(ConfigError::UnknownField { .. })));
    }

    #[test]
    fn test_type_mismatch_on_incompatible_kind() {
        let base = methods::vanilla_nerf();
        let result = apply_overrides(&base, &[set("trainer.mixed_precision", json!("yes"))]);
        assert!(matches!(
            result,
            Err(ConfigError::TypeMismatch { expected, found, .. })
                if expected == "boolean" && found == "string"
        ));
    }

    #[test]
    fn test_float_into_integer_field_is_rejected() {
        let base = methods::vanilla_nerf();
        let result = apply_overrides(&base, &[set("pipeline.model.num_coarse_samples", json!(1.5))]);
        assert!(matches!(result, Err(ConfigError::TypeMismatch { .. })));
    }

    #[test]
    fn test_integer_into_float_field_is_accepted() {
        let base = methods::vanilla_nerf();
        let derived =
            apply_overrides(&base, &[set("pipeline.model.collider.far_plane", json!(8))]).unwrap();
        assert_eq!(derived.pipeline.model.as_nerf().unwrap().collider.far_plane, 8.0);
    }

    #[test]
    fn test_negative_into_unsigned_field_is_rejected() {
        let base = methods::vanilla_nerf();
        let result = apply_overrides(
            &base,
            &[set("pipeline.datamanager.train_num_rays_per_batch", json!(-1))],
        );
        assert!(matches!(result, Err(ConfigError::TypeMismatch { .. })));
    }

    #[test]
    fn test_unknown_enum_value_is_type_mismatch() {
        let base = methods::tensorf();
        let result = apply_overrides(
            &base,
            &[set("optimizers", json!({"fields": {"optimizer": {"optimizer": "sgd"}}}))],
        );
        assert!(matches!(result, Err(ConfigError::TypeMismatch { .. })));
    }

    #[test]
    fn test_optional_field_can_be_set_and_cleared() {
        let base = methods::vanilla_nerf();
        let derived = apply_overrides(&base, &[set("experiment_name", json!("lego_sweep"))]).unwrap();
        assert_eq!(derived.experiment_name(), "lego_sweep");

        let cleared = apply_overrides(&derived, &[set("experiment_name", Value::Null)]).unwrap();
        assert_eq!(cleared.experiment_name(), "vanilla_nerf");
    }

    #[test]
    fn test_null_into_required_field_is_rejected() {
        let base = methods::vanilla_nerf();
        let result = apply_overrides(&base, &[set("trainer.steps_per_test", Value::Null)]);
        assert!(matches!(result, Err(ConfigError::TypeMismatch { .. })));
    }

    #[test]
    fn test_variant_tag_cannot_be_overridden_alone() {
        let base = methods::vanilla_nerf();
        let result = apply_overrides(&base, &[set("pipeline.model.type", json!("tensorf"))]);
        assert!(matches!(
            result,
            Err(ConfigError::WholeValueOnly { field, .. }) if field == "pipeline.model"
        ));
    }

    #[test]
    fn test_whole_subtree_replacement_switches_variant() {
        let base = methods::vanilla_nerf();
        let mut model = serde_json::to_value(ModelConfig::from_kind(ModelKind::TensoRF)).unwrap();
        model["num_samples"] = json!(64);
        let derived = apply_overrides(&base, &[set("pipeline.model", model)]).unwrap();

        match &derived.pipeline.model {
            ModelConfig::TensoRF(model) => {
                assert_eq!(model.num_samples, 64);
                assert_eq!(model.init_resolution, 128);
            }
            other => panic!("expected tensorf, got {:?}", other.kind()),
        }
        assert_eq!(derived.pipeline.datamanager, base.pipeline.datamanager);
    }

    #[test]
    fn test_whole_subtree_does_not_merge_across_variants() {
        let base = methods::mipnerf_360();
        let result = apply_overrides(
            &base,
            &[set("pipeline.model", json!({"type": "tensorf", "num_coarse_samples": 64}))],
        );
        assert!(matches!(result, Err(ConfigError::TypeMismatch { .. })));
    }

    #[test]
    fn test_replacement_without_tag_is_rejected() {
        let base = methods::vanilla_nerf();
        let result = apply_overrides(&base, &[set("pipeline.model", json!({"num_coarse_samples": 8}))]);
        assert!(matches!(result, Err(ConfigError::TypeMismatch { .. })));
    }

    #[test]
    fn test_nested_data_parser_field() {
        let base = methods::mipnerf_360();
        let derived = apply_overrides(
            &base,
            &[set("pipeline.datamanager.train_dataparser.val_skip", json!(4))],
        )
        .unwrap();
        assert_eq!(
            derived.get_path(&path("pipeline.datamanager.train_dataparser.val_skip")).unwrap(),
            4
        );
    }

    #[test]
    fn test_mapping_fields_are_whole_value_only() {
        let base = methods::tensorf();
        let result = apply_overrides(&base, &[set("optimizers.fields.optimizer.lr", json!(0.01))]);
        assert!(matches!(
            result,
            Err(ConfigError::WholeValueOnly { field, .. }) if field == "optimizers"
        ));

        let result = apply_overrides(
            &base,
            &[set("pipeline.model.loss_coefficients.rgb_loss", json!(0.5))],
        );
        assert!(matches!(
            result,
            Err(ConfigError::WholeValueOnly { field, .. })
                if field == "pipeline.model.loss_coefficients"
        ));
    }

    #[test]
    fn test_mapping_field_full_replacement() {
        let base = methods::vanilla_nerf();
        let derived = apply_overrides(
            &base,
            &[set(
                "optimizers",
                json!({"fields": {
                    "optimizer": {"optimizer": "adam", "lr": 0.01, "eps": 1e-8, "weight_decay": 0.0},
                    "scheduler": null
                }}),
            )],
        )
        .unwrap();

        assert_eq!(derived.optimizers.len(), 1);
        assert_eq!(derived.optimizers["fields"].optimizer.lr, 0.01);
        assert!(derived.optimizers["fields"].scheduler.is_none());
    }

    #[test]
    fn test_partial_section_is_rejected() {
        let base = methods::mipnerf_360();
        let result = apply_overrides(&base, &[set("trainer", json!({"steps_per_save": 5}))]);
        assert!(matches!(
            result,
            Err(ConfigError::TypeMismatch { path, expected, .. })
                if path == "trainer" && expected == "complete object"
        ));
        assert_eq!(base.trainer.steps_per_test, 200);
    }

    #[test]
    fn test_tag_only_model_is_rejected() {
        let base = methods::mipnerf_360();
        let result = apply_overrides(&base, &[set("pipeline.model", json!({"type": "mipnerf_360"}))]);
        assert!(matches!(result, Err(ConfigError::TypeMismatch { .. })));
    }

    #[test]
    fn test_partial_nested_object_is_rejected() {
        let base = methods::mipnerf_360();
        let mut model = base.get_path(&path("pipeline.model")).unwrap();
        model["collider"] = json!({"near_plane": 1.0});

        match apply_overrides(&base, &[set("pipeline.model", model)]) {
            Err(ConfigError::TypeMismatch { found, .. }) => {
                assert_eq!(found, "object without 'collider.far_plane'");
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_complete_section_replacement() {
        let base = methods::mipnerf_360();
        let mut trainer = base.get_path(&path("trainer")).unwrap();
        trainer["steps_per_save"] = json!(5);

        let derived = apply_overrides(&base, &[set("trainer", trainer)]).unwrap();
        assert_eq!(derived.trainer.steps_per_save, 5);
        assert_eq!(derived.trainer.steps_per_test, 200);
    }

    #[test]
    fn test_rejected_value_reports_field_kind() {
        let base = methods::vanilla_nerf();
        let result = apply_overrides(&base, &[set("trainer.max_num_iterations", json!(-3))]);
        assert!(matches!(
            result,
            Err(ConfigError::TypeMismatch { expected, found, .. })
                if expected == "integer" && found.starts_with("integer (")
        ));
    }

    #[test]
    fn test_scene_box_reads_back_exactly() {
        let base = methods::instant_ngp();
        let derived = apply_overrides(
            &base,
            &[set("pipeline.model.scene_aabb.min", json!([-0.1, -0.1, -0.1]))],
        )
        .unwrap();
        assert_eq!(
            derived.get_path(&path("pipeline.model.scene_aabb.min")).unwrap(),
            json!([-0.1, -0.1, -0.1])
        );
    }

    #[test]
    fn test_alpha_color_reads_back_exactly() {
        let base = methods::vanilla_nerf();
        let color = "pipeline.datamanager.train_dataparser.alpha_color";
        let derived = apply_overrides(&base, &[set(color, json!([0.3, 0.7, 0.1]))]).unwrap();
        assert_eq!(derived.get_path(&path(color)).unwrap(), json!([0.3, 0.7, 0.1]));
    }

    #[test]
    fn test_later_override_wins() {
        let base = methods::vanilla_nerf();
        let derived = apply_overrides(
            &base,
            &[
                set("trainer.max_num_iterations", json!(10)),
                set("trainer.max_num_iterations", json!(20)),
            ],
        )
        .unwrap();
        assert_eq!(derived.trainer.max_num_iterations, 20);
    }

    #[test]
    fn test_failure_after_valid_override_returns_no_partial_result() {
        let base = methods::vanilla_nerf();
        let result = apply_overrides(
            &base,
            &[
                set("trainer.max_num_iterations", json!(10)),
                set("trainer.bogus", json!(1)),
            ],
        );
        assert!(result.is_err());
        assert_eq!(base.trainer.max_num_iterations, 1_000_000);
    }

    #[test]
    fn test_descending_through_leaf_is_unknown() {
        let base = methods::vanilla_nerf();
        let result = apply_overrides(&base, &[set("trainer.steps_per_save.value", json!(1))]);
        assert!(matches!(result, Err(ConfigError::UnknownField { .. })));
    }

    #[test]
    fn test_parse_override_arguments() {
        let item: Override = "pipeline.model.num_coarse_samples=128".parse().unwrap();
        assert_eq!(item.path, path("pipeline.model.num_coarse_samples"));
        assert_eq!(item.value, json!(128));

        let item: Override = "experiment_name=lego".parse().unwrap();
        assert_eq!(item.value, json!("lego"));

        let item: Override = r#"pipeline.model={"type": "mipnerf"}"#.parse().unwrap();
        assert_eq!(item.value, json!({"type": "mipnerf"}));

        let item: Override = "trainer.mixed_precision = true".parse().unwrap();
        assert_eq!(item.path, path("trainer.mixed_precision"));
        assert_eq!(item.value, json!(true));
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        assert!(matches!(
            "pipeline.model.num_coarse_samples".parse::<Override>(),
            Err(ConfigError::InvalidOverride(_))
        ));
        assert!(matches!("=5".parse::<Override>(), Err(ConfigError::InvalidOverride(_))));
    }

    #[test]
    fn test_get_path_reads_inside_mappings_and_tags() {
        let config = methods::tensorf();
        assert_eq!(
            config.get_path(&path("optimizers.position_encoding.optimizer.lr")).unwrap(),
            0.02
        );
        assert_eq!(config.get_path(&path("pipeline.model.type")).unwrap(), "tensorf");
        assert!(matches!(
            config.get_path(&path("pipeline.model.num_coarse_samples")),
            Err(ConfigError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_with_overrides_matches_free_function() {
        let base = methods::instant_ngp();
        let overrides = [set("pipeline.model.cone_angle", json!(0.004))];
        assert_eq!(
            base.with_overrides(&overrides).unwrap(),
            apply_overrides(&base, &overrides).unwrap()
        );
        assert_eq!(base.pipeline.model.kind(), ModelKind::InstantNgp);
    }

    proptest! {
        #[test]
        fn prop_override_reads_back(samples in 1u32..4096, rays in 1u32..65536) {
            let base = methods::vanilla_nerf();
            let derived = apply_overrides(&base, &[
                set("pipeline.model.num_coarse_samples", json!(samples)),
                set("pipeline.datamanager.train_num_rays_per_batch", json!(rays)),
            ]).unwrap();

            prop_assert_eq!(
                derived.get_path(&path("pipeline.model.num_coarse_samples")).unwrap(),
                json!(samples)
            );
            prop_assert_eq!(derived.pipeline.datamanager.train_num_rays_per_batch(), rays);
            prop_assert_eq!(&derived.trainer, &base.trainer);
            prop_assert_eq!(&derived.optimizers, &base.optimizers);
        }
    }
}
