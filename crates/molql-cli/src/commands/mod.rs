pub mod inspect;
pub mod residues;
mod spinner;

use crate::cli::LoadArgs;
use crate::config::PartialLoadConfig;
use crate::error::Result;
use molql::core::models::structure::Structure;
use molql::workflows::{load, progress::ProgressReporter};
use spinner::LoadSpinner;
use tracing::{debug, info};

/// Resolves parse options from the config file and flags, then loads the input file.
pub fn load_structure(args: &LoadArgs, quiet: bool) -> Result<Structure> {
    let options = PartialLoadConfig::for_args(args)?.merge_with_cli(args)?;
    info!("Loading input structure from {:?}", &args.input);

    let spinner = if quiet {
        LoadSpinner::hidden()
    } else {
        LoadSpinner::new()
    };
    let reporter = ProgressReporter::with_callback(spinner.callback());
    let structure = load::run(&args.input, &options, &reporter);
    spinner.finish();
    debug!(phases = spinner.completed_phases(), "Load phases completed.");

    Ok(structure?)
}
