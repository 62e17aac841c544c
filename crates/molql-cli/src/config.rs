use crate::cli::LoadArgs;
use crate::error::{CliError, Result};
use molql::core::config::ParseOptions;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Parse settings as read from a TOML file. Every field is optional so that command-line
/// flags can fill the gaps.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct PartialLoadConfig {
    block: Option<String>,
    #[serde(rename = "secondary-structure")]
    secondary_structure: Option<bool>,
    #[serde(rename = "modified-residues")]
    modified_residues: Option<bool>,
    models: Option<Vec<i32>>,
}

impl PartialLoadConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads the config file named by `args`, or starts empty when there is none.
    pub fn for_args(args: &LoadArgs) -> Result<Self> {
        match &args.config {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn merge_with_cli(mut self, args: &LoadArgs) -> Result<ParseOptions> {
        self.apply_set_values(&args.set_values)?;

        let mut builder = ParseOptions::builder()
            .secondary_structure(
                !args.no_secondary_structure && self.secondary_structure.unwrap_or(true),
            )
            .modified_residues(!args.no_modified_residues && self.modified_residues.unwrap_or(true));

        if let Some(block) = args.block.as_ref().or(self.block.as_ref()) {
            builder = builder.block(block.clone());
        }

        if !args.models.is_empty() {
            builder = builder.models(args.models.clone());
        } else if let Some(models) = self.models {
            builder = builder.models(models);
        }

        Ok(builder.build()?)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            let parse_bool = |value: &str| {
                value.parse::<bool>().map_err(|_| {
                    CliError::Config(format!("Invalid boolean value for {}: {}", key, value))
                })
            };

            match key {
                "block" => self.block = Some(value_str.to_string()),
                "secondary-structure" => self.secondary_structure = Some(parse_bool(value_str)?),
                "modified-residues" => self.modified_residues = Some(parse_bool(value_str)?),
                "models" => {
                    let models = value_str
                        .split(',')
                        .map(|n| n.trim().parse::<i32>())
                        .collect::<std::result::Result<Vec<_>, _>>()
                        .map_err(|_| {
                            CliError::Config(format!(
                                "Invalid model list for {}: {}",
                                key, value_str
                            ))
                        })?;
                    self.models = Some(models);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};

    fn write_config_file(dir: &TempDir, content: &str) -> PathBuf {
        let file_path = dir.path().join("parse.toml");
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn load_args(extra: &[&str]) -> LoadArgs {
        let mut argv = vec!["molql", "inspect", "-i", "in.cif"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Inspect(args) => args.load,
            other => panic!("expected inspect command, got {other:?}"),
        }
    }

    #[test]
    fn defaults_apply_without_config_file() {
        let args = load_args(&[]);
        let options = PartialLoadConfig::for_args(&args)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();
        assert_eq!(options, ParseOptions::default());
    }

    #[test]
    fn file_values_are_loaded() {
        let dir = tempdir().unwrap();
        let path = write_config_file(
            &dir,
            r#"
            block = "1MQL"
            secondary-structure = false
            models = [1]
            "#,
        );
        let config_arg = path.to_str().unwrap().to_string();
        let args = load_args(&["-c", &config_arg]);

        let options = PartialLoadConfig::for_args(&args)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();
        assert_eq!(options.block.as_deref(), Some("1MQL"));
        assert!(!options.secondary_structure);
        assert!(options.modified_residues);
        assert_eq!(options.models, Some(vec![1]));
    }

    #[test]
    fn cli_args_override_file_values() {
        let dir = tempdir().unwrap();
        let path = write_config_file(&dir, "block = \"first\"\nmodels = [1]\n");
        let config_arg = path.to_str().unwrap().to_string();
        let args = load_args(&[
            "-c",
            &config_arg,
            "--block",
            "second",
            "--models",
            "2,3",
            "--no-modified-residues",
        ]);

        let options = PartialLoadConfig::for_args(&args)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();
        assert_eq!(options.block.as_deref(), Some("second"));
        assert_eq!(options.models, Some(vec![2, 3]));
        assert!(!options.modified_residues);
    }

    #[test]
    fn set_values_override_file_values() {
        let args = load_args(&["-S", "secondary-structure=false", "-S", "models=4, 5"]);
        let options = PartialLoadConfig::default().merge_with_cli(&args).unwrap();
        assert!(!options.secondary_structure);
        assert_eq!(options.models, Some(vec![4, 5]));
    }

    #[test]
    fn malformed_set_value_is_rejected() {
        let args = load_args(&["-S", "secondary-structure"]);
        let result = PartialLoadConfig::default().merge_with_cli(&args);
        assert!(matches!(result, Err(CliError::Config(_))));

        let args = load_args(&["-S", "rings=true"]);
        let result = PartialLoadConfig::default().merge_with_cli(&args);
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = write_config_file(&dir, "forcefield = \"none\"\n");
        let result = PartialLoadConfig::from_file(&path);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }
}
