use crate::core::models::secondary_structure::SecondaryStructureType;
use crate::core::models::structure::Model;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("CSV writing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("CSV writing error: {0}")]
    Write(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One residue of a model as written to the residue table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidueRow {
    pub model: i32,
    pub residue_index: usize,
    pub label_asym_id: String,
    pub auth_asym_id: String,
    pub comp_id: String,
    pub seq_id: Option<i64>,
    pub ins_code: String,
    pub key: u32,
    pub ss_type: SecondaryStructureType,
    pub ss_key: u32,
    pub ss_flags: u32,
    pub modified: bool,
}

impl ResidueRow {
    pub fn from_model(model: &Model, residue: usize) -> Self {
        let atom_site = &model.data.atom_site;
        let row = model.residue_data_row(residue);
        let text = |value: Option<&str>| value.unwrap_or_default().to_string();
        let ss = &model.secondary_structure;

        Self {
            model: model.id,
            residue_index: residue,
            label_asym_id: text(atom_site.label_asym_id.get_string(row)),
            auth_asym_id: text(atom_site.auth_asym_id.get_string(row)),
            comp_id: text(atom_site.label_comp_id.get_string(row)),
            seq_id: atom_site.auth_seq_id.get_integer(row),
            ins_code: text(atom_site.pdbx_pdb_ins_code.get_string(row)),
            key: model.residues.key[residue],
            ss_type: ss.kind[residue],
            ss_key: ss.key[residue],
            ss_flags: ss.flags[residue].bits(),
            modified: model.is_modified(residue),
        }
    }
}

pub fn residue_rows(model: &Model) -> Vec<ResidueRow> {
    (0..model.residues.count)
        .map(|residue| ResidueRow::from_model(model, residue))
        .collect()
}

pub fn write_residue_table<W: Write>(rows: &[ResidueRow], writer: W) -> Result<(), TableError> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_residue_table_to_path(rows: &[ResidueRow], path: &Path) -> Result<(), TableError> {
    let csv_error = |e: csv::Error| TableError::Csv {
        path: path.to_string_lossy().to_string(),
        source: e,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    writer.flush()?;
    Ok(())
}
