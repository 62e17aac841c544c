use crate::core::io::mmcif::{AtomSite, MmcifData};
use crate::core::models::derived::DerivedViews;
use crate::core::models::secondary_structure::SecondaryStructure;
use crate::core::models::structure::{Atoms, Chains, Entities, Model, Positions, Residues};
use std::collections::HashMap;
use std::sync::Arc;

/// The hierarchy of one model frame before keys and annotations are assigned.
#[derive(Debug, Default)]
pub(crate) struct Frame {
    pub model_id: i32,
    pub atoms: Atoms,
    pub positions: Positions,
    pub residues: Residues,
    pub chains: Chains,
    pub entities: Entities,
}

impl Frame {
    /// Number of `_atom_site` rows consumed by this frame.
    pub fn row_count(&self) -> usize {
        self.atoms.count
    }

    pub fn into_model(self, structure_id: &str, data: Arc<MmcifData>) -> Model {
        let residue_count = self.residues.count;
        Model {
            structure_id: structure_id.to_string(),
            id: self.model_id,
            atoms: self.atoms,
            positions: self.positions,
            residues: self.residues,
            chains: self.chains,
            entities: self.entities,
            secondary_structure: SecondaryStructure::unassigned(residue_count),
            modified_residues: HashMap::new(),
            data,
            derived: DerivedViews::new(),
        }
    }
}

/// Scans `_atom_site` from `start_row` until the model number changes.
///
/// Boundaries cascade downward: a new entity opens a new chain, a new chain opens a new
/// residue. Each opened group records the index of its first child in the parent's offset
/// array, and every offset array is closed with the total child count.
pub(crate) fn scan_frame(atom_site: &AtomSite, start_row: usize) -> Frame {
    let row_count = atom_site.row_count();
    let mut frame = Frame {
        model_id: model_number(atom_site, start_row),
        ..Frame::default()
    };

    let mut current_residue_row = start_row;
    let mut current_chain_row = start_row;
    let mut current_entity_row = start_row;

    for row in start_row..row_count {
        if !atom_site.pdbx_pdb_model_num.are_values_equal(start_row, row) {
            break;
        }

        let first = row == start_row;
        let new_entity =
            first || !atom_site.label_entity_id.are_values_equal(current_entity_row, row);
        let new_chain =
            new_entity || !atom_site.auth_asym_id.are_values_equal(current_chain_row, row);
        let new_residue = new_chain
            || !atom_site.auth_seq_id.are_values_equal(current_residue_row, row)
            || !atom_site.pdbx_pdb_ins_code.are_values_equal(current_residue_row, row);

        if new_entity {
            frame.entities.chain_offset.push(frame.chains.count);
            frame.entities.count += 1;
            current_entity_row = row;
        }

        if new_chain {
            frame.chains.residue_offset.push(frame.residues.count);
            frame.chains.entity_index.push(frame.entities.count - 1);
            frame.chains.count += 1;
            current_chain_row = row;
        }

        if new_residue {
            frame.residues.atom_offset.push(frame.atoms.count);
            frame.residues.chain_index.push(frame.chains.count - 1);
            frame.residues.count += 1;
            current_residue_row = row;
        }

        frame.atoms.data_index.push(row);
        frame.atoms.residue_index.push(frame.residues.count - 1);
        frame.positions.x.push(atom_site.cartn_x.get_float(row).unwrap_or(0.0));
        frame.positions.y.push(atom_site.cartn_y.get_float(row).unwrap_or(0.0));
        frame.positions.z.push(atom_site.cartn_z.get_float(row).unwrap_or(0.0));
        frame.atoms.count += 1;
    }

    frame.residues.atom_offset.push(frame.atoms.count);
    frame.chains.residue_offset.push(frame.residues.count);
    frame.entities.chain_offset.push(frame.chains.count);

    frame.residues.key = vec![0; frame.residues.count];
    frame.chains.key = vec![0; frame.chains.count];
    frame.entities.key = vec![0; frame.entities.count];
    frame.entities.data_index = vec![0; frame.entities.count];

    frame
}

fn model_number(atom_site: &AtomSite, row: usize) -> i32 {
    atom_site
        .pdbx_pdb_model_num
        .get_integer(row)
        .and_then(|num| i32::try_from(num).ok())
        .unwrap_or(1)
}
