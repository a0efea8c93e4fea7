//! Editor configuration.
//!
//! Loaded from TOML; every field is optional:
//!
//! ```toml
//! auto_refresh = false
//!
//! [evaluation]
//! max_depth = 128
//! collect_timing = true
//! ```

use crate::core::error::PhotoNodesResult;
use crate::execution::evaluator::EvaluationOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for a [`NodeGraph`](crate::graph::NodeGraph).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Refresh the sink on every mutation. When off, mutations only mark
    /// the graph dirty and the host calls `refresh`.
    pub auto_refresh: bool,
    /// Evaluator settings.
    pub evaluation: EvaluationOptions,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            auto_refresh: true,
            evaluation: EvaluationOptions::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> PhotoNodesResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> PhotoNodesResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::PhotoNodesError;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::from_toml_str("").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert!(config.auto_refresh);
        assert_eq!(config.evaluation.max_depth, crate::execution::evaluator::DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_partial_override() {
        let config = EditorConfig::from_toml_str(
            "auto_refresh = false\n\n[evaluation]\nmax_depth = 16\n",
        )
        .unwrap();
        assert!(!config.auto_refresh);
        assert_eq!(config.evaluation.max_depth, 16);
        assert!(config.evaluation.collect_timing);
    }

    #[test]
    fn test_invalid_toml() {
        let err = EditorConfig::from_toml_str("auto_refresh = \"sometimes\"").unwrap_err();
        assert!(matches!(err, PhotoNodesError::Config(_)));
    }

    #[test]
    fn test_depth_too_small_is_rejected() {
        for depth in [0, 1] {
            let text = format!("[evaluation]\nmax_depth = {depth}\n");
            let err = EditorConfig::from_toml_str(&text).unwrap_err();
            assert!(matches!(err, PhotoNodesError::Config(_)), "depth {depth}: {err}");
            assert!(err.to_string().contains("max_depth"));
        }
    }

    #[test]
    fn test_smallest_depth_evaluates_source_to_sink() {
        use crate::core::types::{ImageValue, Value};
        use crate::graph::NodeGraph;

        let config = EditorConfig::from_toml_str("[evaluation]\nmax_depth = 2\n").unwrap();
        let mut graph = NodeGraph::with_config(&config);
        let (source, sink) = (graph.source(), graph.sink());
        graph.connect(source, 0, sink, 0).unwrap();

        let image = ImageValue::from_rgba(image::RgbaImage::new(2, 2));
        graph.load_source(Value::Image(image.clone())).unwrap();

        let outcome = graph.last_outcome().unwrap();
        assert!(outcome.is_ok());
        assert_eq!(outcome.value, Value::Image(image));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[evaluation]\ncollect_timing = false").unwrap();

        let config = EditorConfig::load(file.path()).unwrap();
        assert!(!config.evaluation.collect_timing);
        assert!(config.auto_refresh);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = EditorConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, PhotoNodesError::Io(_)));
    }
}
