use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use molql::workflows::summary::{StructureSummary, summarize};
use std::fmt::Write;
use tracing::info;

pub fn run(args: InspectArgs, quiet: bool) -> Result<()> {
    let structure = super::load_structure(&args.load, quiet)?;
    let summary = summarize(&structure);
    info!(models = summary.models.len(), "Summarized structure.");

    let rendered = if args.toml {
        toml::to_string(&summary).map_err(|e| CliError::Other(e.into()))?
    } else {
        render_table(&summary)
    };
    print!("{}", rendered);
    Ok(())
}

fn render_table(summary: &StructureSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Structure {}", summary.id);
    let _ = writeln!(
        out,
        "{:>6} {:>8} {:>9} {:>7} {:>9} {:>8} {:>7} {:>9}",
        "model", "atoms", "residues", "chains", "entities", "helices", "sheets", "modified"
    );
    for m in &summary.models {
        let _ = writeln!(
            out,
            "{:>6} {:>8} {:>9} {:>7} {:>9} {:>8} {:>7} {:>9}",
            m.id, m.atoms, m.residues, m.chains, m.entities, m.helices, m.sheets, m.modified_residues
        );
    }
    out
}
