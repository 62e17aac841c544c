use crate::core::models::structure::Model;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps residues onto `_pdbx_struct_mod_residue` rows by (`label_asym_id`, `label_seq_id`),
/// requiring the record's insertion code to equal the residue's.
pub(crate) fn assign_modified_residues(model: &mut Model) {
    let data = Arc::clone(&model.data);
    let mod_residue = &data.mod_residue;
    if mod_residue.row_count() == 0 {
        return;
    }

    let mut records: HashMap<&str, HashMap<i64, usize>> = HashMap::new();
    for row in 0..mod_residue.row_count() {
        let (Some(asym_id), Some(seq)) = (
            mod_residue.label_asym_id.get_string(row),
            mod_residue.label_seq_id.get_integer(row),
        ) else {
            continue;
        };
        records.entry(asym_id).or_default().insert(seq, row);
    }

    let atom_site = &data.atom_site;
    for chain in 0..model.chains.count {
        let residues = model.residue_range(chain);
        if residues.is_empty() {
            continue;
        }
        let asym_id = atom_site
            .label_asym_id
            .get_string(model.chain_data_row(chain))
            .unwrap_or("");
        let Some(entries) = records.get(asym_id) else {
            continue;
        };

        for residue in residues {
            let row = model.residue_data_row(residue);
            let Some(&record) = atom_site
                .label_seq_id
                .get_integer(row)
                .and_then(|seq| entries.get(&seq))
            else {
                continue;
            };
            if atom_site.pdbx_pdb_ins_code.get_string(row)
                != mod_residue.pdb_ins_code.get_string(record)
            {
                continue;
            }
            model.modified_residues.insert(residue, record);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::config::ParseOptions;
    use crate::core::parser::parse_cif;

    const MODIFIED: &str = "\
data_mod
loop_
_atom_site.label_entity_id
_atom_site.label_asym_id
_atom_site.auth_asym_id
_atom_site.label_comp_id
_atom_site.label_seq_id
_atom_site.auth_seq_id
_atom_site.pdbx_PDB_ins_code
1 A A ALA 1 1 ?
1 A A MSE 2 2 ?
1 A A MSE 3 3 A
1 A A GLY 4 4 ?
loop_
_pdbx_struct_mod_residue.id
_pdbx_struct_mod_residue.label_asym_id
_pdbx_struct_mod_residue.label_comp_id
_pdbx_struct_mod_residue.label_seq_id
_pdbx_struct_mod_residue.PDB_ins_code
_pdbx_struct_mod_residue.parent_comp_id
1 A MSE 2 ? MET
2 A MSE 3 ? MET
3 B MSE 4 ? MET
";

    #[test]
    fn maps_matching_residues_to_records() {
        let structure = parse_cif(MODIFIED, &ParseOptions::default()).unwrap();
        let model = &structure.models[0];

        assert_eq!(model.modified_residues.get(&1), Some(&0));
        assert!(!model.is_modified(0));
        assert!(!model.is_modified(3));
    }

    #[test]
    fn insertion_code_mismatch_is_not_a_match() {
        let structure = parse_cif(MODIFIED, &ParseOptions::default()).unwrap();
        assert!(!structure.models[0].is_modified(2));
        assert_eq!(structure.models[0].modified_residues.len(), 1);
    }

    #[test]
    fn disabled_resolution_leaves_map_empty() {
        let options = ParseOptions::builder()
            .modified_residues(false)
            .build()
            .unwrap();
        let structure = parse_cif(MODIFIED, &options).unwrap();
        assert!(structure.models[0].modified_residues.is_empty());
    }
}
