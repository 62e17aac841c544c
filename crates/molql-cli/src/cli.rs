use clap::{Args, Parser, Subcommand, ValueEnum};
use molql::core::models::secondary_structure::SecondaryStructureType;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu, William A. Goddard III, Victor Wai Tak Kam",
    version,
    about = "molql CLI - Load mmCIF structures, inspect their hierarchy and select residue groups.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the model hierarchy and annotation counts of a structure.
    Inspect(InspectArgs),
    /// List residues matching a filter as a CSV table.
    Residues(ResiduesArgs),
}

/// Options shared by every command that loads a structure.
#[derive(Args, Debug, Clone)]
pub struct LoadArgs {
    /// Path to the input mmCIF file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to a parse configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Parse the named data block instead of the first one.
    #[arg(short, long, value_name = "NAME")]
    pub block: Option<String>,

    /// Skip secondary-structure resolution.
    #[arg(long)]
    pub no_secondary_structure: bool,

    /// Skip modified-residue resolution.
    #[arg(long)]
    pub no_modified_residues: bool,

    /// Keep only these model numbers. Can be comma separated.
    #[arg(short, long, value_name = "NUM", value_delimiter = ',')]
    pub models: Vec<i32>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S secondary-structure=false
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub load: LoadArgs,

    /// Print the summary as TOML instead of a table.
    #[arg(long)]
    pub toml: bool,
}

/// Arguments for the `residues` subcommand.
#[derive(Args, Debug)]
pub struct ResiduesArgs {
    #[command(flatten)]
    pub load: LoadArgs,

    /// Model number to select from. Defaults to the first model.
    #[arg(long, value_name = "NUM")]
    pub model: Option<i32>,

    /// Author chain id to keep.
    #[arg(long, value_name = "ID")]
    pub chain: Option<String>,

    /// Secondary-structure type to keep.
    #[arg(long, value_enum, value_name = "TYPE")]
    pub ss: Option<SsFilter>,

    /// Keep only residues listed as modified.
    #[arg(long)]
    pub modified_only: bool,

    /// Write the table to this file instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SsFilter {
    None,
    Helix,
    Sheet,
}

impl From<SsFilter> for SecondaryStructureType {
    fn from(filter: SsFilter) -> Self {
        match filter {
            SsFilter::None => SecondaryStructureType::None,
            SsFilter::Helix => SecondaryStructureType::Helix,
            SsFilter::Sheet => SecondaryStructureType::Sheet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_residues_command_with_flattened_load_args() {
        let cli = Cli::parse_from([
            "molql", "-vv", "residues", "-i", "1mql.cif", "--models", "1,2", "--chain", "A",
            "--ss", "helix",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Residues(args) => {
                assert_eq!(args.load.input, PathBuf::from("1mql.cif"));
                assert_eq!(args.load.models, vec![1, 2]);
                assert_eq!(args.chain.as_deref(), Some("A"));
                assert_eq!(args.ss, Some(SsFilter::Helix));
                assert!(!args.modified_only);
            }
            other => panic!("expected residues command, got {other:?}"),
        }
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["molql", "-q", "-v", "inspect", "-i", "x.cif"]);
        assert!(result.is_err());
    }

    #[test]
    fn input_is_required() {
        assert!(Cli::try_parse_from(["molql", "inspect"]).is_err());
    }
}
