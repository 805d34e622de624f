//! Tool configuration loaded from TOML
//!
//! Every key is optional; missing sections and keys take the defaults below.
//!
//! ```toml
//! [output]
//! directory = "specs"
//! indent = 2
//! rule_width = 80
//! annotate_sources = false
//!
//! [index]
//! workspace = "."
//! extensions = ["rs", "py"]
//! exclude = ["target", ".git"]
//! max_candidates = 20
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub index: IndexConfig,
}

/// Where and how generated documents are written
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    /// Spaces per level in structured documents
    pub indent: usize,
    /// Width of the rule separating plain-text sections
    pub rule_width: usize,
    /// Wrap plain renders in `<source_ref>` markers
    pub annotate_sources: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("specs"),
            indent: 2,
            rule_width: 80,
            annotate_sources: false,
        }
    }
}

/// Workspace search used to build the source map
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Root of the search; no search happens when unset
    pub workspace: Option<PathBuf>,
    pub extensions: Vec<String>,
    /// Directory names skipped during the walk
    pub exclude: Vec<String>,
    /// Candidate locations kept per component
    pub max_candidates: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            workspace: None,
            extensions: ["rs", "py", "go", "ts", "js"]
                .into_iter()
                .map(String::from)
                .collect(),
            exclude: [
                "target",
                ".git",
                "node_modules",
                "__pycache__",
                ".venv",
                "venv",
                "specs",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            max_candidates: 20,
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Set the output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output.directory = dir.into();
        self
    }

    /// Set the workspace searched for source candidates
    pub fn with_workspace(mut self, workspace: impl Into<PathBuf>) -> Self {
        self.index.workspace = Some(workspace.into());
        self
    }

    /// Set the structured document indentation
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.output.indent = indent;
        self
    }

    /// Enable or disable `<source_ref>` markers in plain output
    pub fn with_annotate_sources(mut self, annotate: bool) -> Self {
        self.output.annotate_sources = annotate;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output.directory, PathBuf::from("specs"));
        assert_eq!(config.output.indent, 2);
        assert_eq!(config.output.rule_width, 80);
        assert!(config.index.workspace.is_none());
        assert!(config.index.extensions.contains(&"rs".to_string()));
        assert!(config.index.exclude.contains(&"target".to_string()));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_str(
            r#"
[output]
directory = "out"

[index]
extensions = ["py"]
"#,
        )
        .unwrap();
        assert_eq!(config.output.directory, PathBuf::from("out"));
        assert_eq!(config.output.indent, 2);
        assert_eq!(config.index.extensions, vec!["py".to_string()]);
        assert_eq!(config.index.max_candidates, 20);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(Config::from_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_str("[output\ndirectory = ");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_wrong_type_is_error() {
        let result = Config::from_str("[output]\nindent = \"wide\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_pattern() {
        let config = Config::default()
            .with_output_dir("docs")
            .with_workspace("/src")
            .with_indent(4)
            .with_annotate_sources(true);
        assert_eq!(config.output.directory, PathBuf::from("docs"));
        assert_eq!(config.index.workspace, Some(PathBuf::from("/src")));
        assert_eq!(config.output.indent, 4);
        assert!(config.output.annotate_sources);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docspec.toml");
        std::fs::write(&path, "[output]\nrule_width = 40\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.output.rule_width, 40);
    }
}
