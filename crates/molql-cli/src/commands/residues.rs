use crate::cli::ResiduesArgs;
use crate::error::{CliError, Result};
use molql::core::io::table::{ResidueRow, write_residue_table, write_residue_table_to_path};
use molql::core::models::structure::{Model, Structure};
use molql::query::Context;
use molql::workflows::select::{ResidueFilter, select_residues};
use std::sync::Arc;
use tracing::info;

pub fn run(args: ResiduesArgs, quiet: bool) -> Result<()> {
    let structure = super::load_structure(&args.load, quiet)?;
    let model = pick_model(&structure, args.model)?;

    let filter = ResidueFilter {
        chain: args.chain.clone(),
        secondary_structure: args.ss.map(Into::into),
        modified_only: args.modified_only,
    };
    let rows = select_rows(model, &filter)?;
    info!(model = model.id, selected = rows.len(), "Selected residues.");

    match &args.output {
        Some(path) => {
            write_residue_table_to_path(&rows, path)?;
            if !quiet {
                eprintln!("Wrote {} residue(s) to {}", rows.len(), path.display());
            }
        }
        None => write_residue_table(&rows, std::io::stdout().lock())?,
    }
    Ok(())
}

fn pick_model(structure: &Structure, id: Option<i32>) -> Result<&Arc<Model>> {
    match id {
        Some(id) => structure.model(id).ok_or_else(|| {
            CliError::Argument(format!("Model {} not found in {}", id, structure.id))
        }),
        None => structure
            .models
            .first()
            .ok_or_else(|| CliError::Argument(format!("{} contains no models", structure.id))),
    }
}

fn select_rows(model: &Arc<Model>, filter: &ResidueFilter) -> Result<Vec<ResidueRow>> {
    let context = Context::of_model(Arc::clone(model));
    let selection = select_residues(&context, filter)?;
    Ok(selection
        .iter()
        .flat_map(|set| set.residue_indices().to_vec())
        .map(|residue| ResidueRow::from_model(model, residue))
        .collect())
}
