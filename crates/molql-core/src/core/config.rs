use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Controls how a CIF file is turned into a [`Structure`](crate::core::models::structure::Structure).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ParseOptions {
    /// Data block to parse. The first block when `None`.
    pub block: Option<String>,
    pub secondary_structure: bool,
    pub modified_residues: bool,
    /// Model numbers to keep. Every model when `None`.
    pub models: Option<Vec<i32>>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            block: None,
            secondary_structure: true,
            modified_residues: true,
            models: None,
        }
    }
}

impl ParseOptions {
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::new()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let options: Self = toml::from_str(&content).map_err(|e| ConfigError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        options.validate()?;
        Ok(options)
    }

    pub fn keeps_model(&self, model_num: i32) -> bool {
        self.models
            .as_ref()
            .is_none_or(|models| models.contains(&model_num))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(block) = &self.block {
            if block.trim().is_empty() {
                return Err(ConfigError::InvalidParameter {
                    name: "block",
                    reason: "data block name must not be empty".to_string(),
                });
            }
        }
        if let Some(models) = &self.models {
            if models.is_empty() {
                return Err(ConfigError::InvalidParameter {
                    name: "models",
                    reason: "model list must name at least one model".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ParseOptionsBuilder {
    block: Option<String>,
    secondary_structure: Option<bool>,
    modified_residues: Option<bool>,
    models: Option<Vec<i32>>,
}

impl ParseOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block(mut self, name: impl Into<String>) -> Self {
        self.block = Some(name.into());
        self
    }
    pub fn secondary_structure(mut self, enabled: bool) -> Self {
        self.secondary_structure = Some(enabled);
        self
    }
    pub fn modified_residues(mut self, enabled: bool) -> Self {
        self.modified_residues = Some(enabled);
        self
    }
    pub fn models(mut self, models: Vec<i32>) -> Self {
        self.models = Some(models);
        self
    }

    pub fn build(self) -> Result<ParseOptions, ConfigError> {
        let defaults = ParseOptions::default();
        let options = ParseOptions {
            block: self.block,
            secondary_structure: self
                .secondary_structure
                .unwrap_or(defaults.secondary_structure),
            modified_residues: self
                .modified_residues
                .unwrap_or(defaults.modified_residues),
            models: self.models,
        };
        options.validate()?;
        Ok(options)
    }
}
