//! Pipeline composition: one data manager feeding one model.

use crate::datamanager::DataManagerConfig;
use crate::model::ModelConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub datamanager: DataManagerConfig,
    pub model: ModelConfig,
}

impl PipelineConfig {
    pub fn new(datamanager: DataManagerConfig, model: ModelConfig) -> Self {
        Self { datamanager, model }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamanager::DataManagerKind;
    use crate::model::ModelKind;

    #[test]
    fn test_default_pipeline() {
        let pipeline = PipelineConfig::default();
        assert_eq!(pipeline.datamanager.kind(), DataManagerKind::Vanilla);
        assert_eq!(pipeline.model.kind(), ModelKind::Vanilla);
    }

    #[test]
    fn test_missing_components_take_defaults() {
        let pipeline: PipelineConfig =
            serde_json::from_str(r#"{"model": {"type": "tensorf"}}"#).unwrap();
        assert_eq!(pipeline.model.kind(), ModelKind::TensoRF);
        assert_eq!(pipeline.datamanager.kind(), DataManagerKind::Vanilla);
    }
}
