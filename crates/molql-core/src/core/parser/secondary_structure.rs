use crate::core::io::cif::ColumnRef;
use crate::core::io::mmcif::{StructConf, StructSheetRange};
use crate::core::models::secondary_structure::{SecondaryStructureFlags, SecondaryStructureType};
use crate::core::models::structure::Model;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Clone)]
struct RangeEntry {
    start_ins_code: Option<String>,
    end_seq: i64,
    end_ins_code: Option<String>,
    kind: SecondaryStructureType,
    row: usize,
}

/// `beg_label_asym_id` -> (`beg_label_seq_id` -> range).
type RangeIndex = HashMap<String, HashMap<i64, RangeEntry>>;

struct RangeColumns<'a> {
    row_count: usize,
    beg_label_asym_id: &'a ColumnRef,
    beg_label_seq_id: &'a ColumnRef,
    pdbx_beg_pdb_ins_code: &'a ColumnRef,
    end_label_seq_id: &'a ColumnRef,
    pdbx_end_pdb_ins_code: &'a ColumnRef,
}

impl<'a> From<&'a StructConf> for RangeColumns<'a> {
    fn from(conf: &'a StructConf) -> Self {
        Self {
            row_count: conf.row_count(),
            beg_label_asym_id: &conf.beg_label_asym_id,
            beg_label_seq_id: &conf.beg_label_seq_id,
            pdbx_beg_pdb_ins_code: &conf.pdbx_beg_pdb_ins_code,
            end_label_seq_id: &conf.end_label_seq_id,
            pdbx_end_pdb_ins_code: &conf.pdbx_end_pdb_ins_code,
        }
    }
}

impl<'a> From<&'a StructSheetRange> for RangeColumns<'a> {
    fn from(range: &'a StructSheetRange) -> Self {
        Self {
            row_count: range.row_count(),
            beg_label_asym_id: &range.beg_label_asym_id,
            beg_label_seq_id: &range.beg_label_seq_id,
            pdbx_beg_pdb_ins_code: &range.pdbx_beg_pdb_ins_code,
            end_label_seq_id: &range.end_label_seq_id,
            pdbx_end_pdb_ins_code: &range.pdbx_end_pdb_ins_code,
        }
    }
}

/// Later calls overwrite entries sharing an (asym, start) pair with earlier ones.
fn extend_index(index: &mut RangeIndex, columns: RangeColumns<'_>, kind: SecondaryStructureType) {
    for row in 0..columns.row_count {
        let (Some(asym_id), Some(start_seq), Some(end_seq)) = (
            columns.beg_label_asym_id.get_string(row),
            columns.beg_label_seq_id.get_integer(row),
            columns.end_label_seq_id.get_integer(row),
        ) else {
            trace!(row, kind = %kind, "Skipping range record without label coordinates.");
            continue;
        };

        let entry = RangeEntry {
            start_ins_code: columns.pdbx_beg_pdb_ins_code.get_string(row).map(str::to_string),
            end_seq,
            end_ins_code: columns.pdbx_end_pdb_ins_code.get_string(row).map(str::to_string),
            kind,
            row,
        };
        index
            .entry(asym_id.to_string())
            .or_default()
            .insert(start_seq, entry);
    }
}

/// Resolves type, source row, element key and flags for every residue of `model`.
pub(crate) fn assign_secondary_structure(model: &mut Model) {
    let data = Arc::clone(&model.data);
    let ranges = &data.secondary_structure;

    let mut index = RangeIndex::new();
    extend_index(
        &mut index,
        RangeColumns::from(&ranges.struct_conf),
        SecondaryStructureType::Helix,
    );
    extend_index(
        &mut index,
        RangeColumns::from(&ranges.sheet_range),
        SecondaryStructureType::Sheet,
    );

    if !index.is_empty() {
        assign_ranges(model, &index);
    }
    assign_keys(model, &ranges.sheet_range);
    assign_flags(model, &ranges.struct_conf);
}

fn assign_ranges(model: &mut Model, index: &RangeIndex) {
    let data = Arc::clone(&model.data);
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
        let Some(entries) = index.get(asym_id) else {
            continue;
        };

        for residue in residues.clone() {
            let row = model.residue_data_row(residue);
            let Some(entry) = atom_site
                .label_seq_id
                .get_integer(row)
                .and_then(|seq| entries.get(&seq))
            else {
                continue;
            };
            if entry.start_ins_code.as_deref() != atom_site.pdbx_pdb_ins_code.get_string(row) {
                continue;
            }
            assign_range(model, entry, residue, residues.end);
        }
    }
}

/// Labels residues from `start` through the record's end, inclusive, without crossing
/// `chain_end`.
fn assign_range(model: &mut Model, entry: &RangeEntry, start: usize, chain_end: usize) {
    let data = Arc::clone(&model.data);
    let atom_site = &data.atom_site;
    let mut labelled = 0usize;

    for residue in start..chain_end {
        let row = model.residue_data_row(residue);
        let Some(seq) = atom_site.label_seq_id.get_integer(row) else {
            break;
        };
        if seq > entry.end_seq {
            break;
        }

        model.secondary_structure.kind[residue] = entry.kind;
        model.secondary_structure.index[residue] = entry.row;
        labelled += 1;

        if seq == entry.end_seq
            && atom_site.pdbx_pdb_ins_code.get_string(row) == entry.end_ins_code.as_deref()
        {
            break;
        }
    }

    trace!(
        kind = %entry.kind,
        row = entry.row,
        start,
        labelled,
        "Assigned secondary-structure range."
    );
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum ElementId<'a> {
    Helix(usize),
    Sheet(&'a str),
    UnnamedSheet(usize),
}

fn assign_keys(model: &mut Model, sheet_range: &StructSheetRange) {
    let ss = &mut model.secondary_structure;
    let mut keys: HashMap<ElementId<'_>, u32> = HashMap::new();
    let mut next_key = 1u32;

    for residue in 0..ss.len() {
        let row = ss.index[residue];
        let element = match ss.kind[residue] {
            SecondaryStructureType::None => continue,
            SecondaryStructureType::Helix => ElementId::Helix(row),
            SecondaryStructureType::Sheet => match sheet_range.sheet_id.get_string(row) {
                Some(sheet_id) => ElementId::Sheet(sheet_id),
                None => ElementId::UnnamedSheet(row),
            },
        };
        ss.key[residue] = *keys.entry(element).or_insert_with(|| {
            let key = next_key;
            next_key += 1;
            key
        });
    }
}

fn assign_flags(model: &mut Model, struct_conf: &StructConf) {
    let ss = &mut model.secondary_structure;

    for residue in 0..ss.len() {
        let row = ss.index[residue];
        ss.flags[residue] = match ss.kind[residue] {
            SecondaryStructureType::Helix => {
                match (
                    struct_conf.pdbx_pdb_helix_class.get_string(row),
                    struct_conf.conf_type_id.get_string(row),
                ) {
                    (Some(class), _) => SecondaryStructureFlags::from_pdb_helix_class(class),
                    (None, Some(conf_type)) => SecondaryStructureFlags::from_conf_type(conf_type),
                    (None, None) => SecondaryStructureFlags::NA,
                }
            }
            SecondaryStructureType::Sheet => {
                SecondaryStructureFlags::BETA | SecondaryStructureFlags::BETA_SHEET
            }
            SecondaryStructureType::None => SecondaryStructureFlags::NA,
        };
    }
}

#[cfg(test)]
mod tests {
    use crate::core::config::ParseOptions;
    use crate::core::models::secondary_structure::{
        SecondaryStructureFlags, SecondaryStructureType,
    };
    use crate::core::parser::parse_cif;

    fn residues_with_ranges(ranges: &str) -> String {
        let mut text = String::from(
            "data_ss\nloop_\n_atom_site.label_entity_id\n_atom_site.label_asym_id\n\
             _atom_site.auth_asym_id\n_atom_site.label_seq_id\n_atom_site.auth_seq_id\n",
        );
        for chain in ["A", "B"] {
            for seq in 8..=17 {
                text.push_str(&format!("1 {chain} {chain} {seq} {seq}\n"));
            }
        }
        text.push_str(ranges);
        text
    }

    fn kinds(structure: &crate::core::models::structure::Structure) -> Vec<SecondaryStructureType> {
        structure.models[0].secondary_structure.kind.clone()
    }

    #[test]
    fn range_labels_exactly_its_inclusive_window_on_its_chain() {
        let text = residues_with_ranges(
            "loop_\n_struct_conf.conf_type_id\n_struct_conf.id\n\
             _struct_conf.beg_label_asym_id\n_struct_conf.beg_label_seq_id\n\
             _struct_conf.end_label_asym_id\n_struct_conf.end_label_seq_id\n\
             HELX_P HELX_P1 A 10 A 15\n",
        );
        let structure = parse_cif(&text, &ParseOptions::default()).unwrap();
        let model = &structure.models[0];
        let kinds = kinds(&structure);

        for residue in 0..model.residues.count {
            let chain_a = model.residues.chain_index[residue] == 0;
            let seq = 8 + (residue % 10) as i64;
            let expected = chain_a && (10..=15).contains(&seq);
            assert_eq!(
                kinds[residue] == SecondaryStructureType::Helix,
                expected,
                "residue {residue} (seq {seq})"
            );
            if expected {
                assert_eq!(model.secondary_structure.key[residue], 1);
                assert_eq!(
                    model.secondary_structure.flags[residue],
                    SecondaryStructureFlags::HELIX
                );
            } else {
                assert_eq!(model.secondary_structure.key[residue], 0);
                assert_eq!(
                    model.secondary_structure.flags[residue],
                    SecondaryStructureFlags::NA
                );
            }
        }
    }

    #[test]
    fn sheet_strands_share_a_key_per_sheet() {
        let text = residues_with_ranges(
            "loop_\n_struct_sheet_range.sheet_id\n_struct_sheet_range.id\n\
             _struct_sheet_range.beg_label_asym_id\n_struct_sheet_range.beg_label_seq_id\n\
             _struct_sheet_range.end_label_asym_id\n_struct_sheet_range.end_label_seq_id\n\
             S1 1 A 8 A 9\nS1 2 B 16 B 17\nS2 1 A 12 A 12\n",
        );
        let structure = parse_cif(&text, &ParseOptions::default()).unwrap();
        let ss = &structure.models[0].secondary_structure;

        assert_eq!(ss.key[0], 1);
        assert_eq!(ss.key[1], 1);
        assert_eq!(ss.key[4], 2);
        assert_eq!(ss.key[18], 1);
        assert_eq!(ss.key[19], 1);
        assert_eq!(ss.key[3], 0);
        assert!(
            ss.flags[18].contains(SecondaryStructureFlags::BETA | SecondaryStructureFlags::BETA_SHEET)
        );
        assert_eq!(ss.element_count(), 2);
    }

    #[test]
    fn helix_class_takes_precedence_over_conf_type() {
        let text = residues_with_ranges(
            "loop_\n_struct_conf.conf_type_id\n_struct_conf.id\n\
             _struct_conf.beg_label_asym_id\n_struct_conf.beg_label_seq_id\n\
             _struct_conf.end_label_asym_id\n_struct_conf.end_label_seq_id\n\
             _struct_conf.pdbx_PDB_helix_class\n\
             HELX_P H1 A 9 A 10 5\nTURN_TY1_P T1 B 9 B 10 ?\n",
        );
        let structure = parse_cif(&text, &ParseOptions::default()).unwrap();
        let ss = &structure.models[0].secondary_structure;

        assert!(ss.flags[1].contains(SecondaryStructureFlags::HELIX_3_10));
        assert!(ss.flags[11].contains(SecondaryStructureFlags::TURN_TYPE_1));
        assert_eq!(ss.key[1], 1);
        assert_eq!(ss.key[11], 2);
    }

    #[test]
    fn colliding_starts_resolve_to_the_sheet_record() {
        let text = residues_with_ranges(
            "loop_\n_struct_conf.conf_type_id\n_struct_conf.id\n\
             _struct_conf.beg_label_asym_id\n_struct_conf.beg_label_seq_id\n\
             _struct_conf.end_label_asym_id\n_struct_conf.end_label_seq_id\n\
             HELX_P H1 A 10 A 14\n\
             loop_\n_struct_sheet_range.sheet_id\n_struct_sheet_range.id\n\
             _struct_sheet_range.beg_label_asym_id\n_struct_sheet_range.beg_label_seq_id\n\
             _struct_sheet_range.end_label_asym_id\n_struct_sheet_range.end_label_seq_id\n\
             S1 1 A 10 A 11\n",
        );
        let structure = parse_cif(&text, &ParseOptions::default()).unwrap();
        let kinds = kinds(&structure);

        assert_eq!(kinds[2], SecondaryStructureType::Sheet);
        assert_eq!(kinds[3], SecondaryStructureType::Sheet);
        assert_eq!(kinds[4], SecondaryStructureType::None);
    }

    #[test]
    fn start_insertion_code_must_match() {
        let text = residues_with_ranges(
            "loop_\n_struct_conf.conf_type_id\n_struct_conf.id\n\
             _struct_conf.beg_label_asym_id\n_struct_conf.beg_label_seq_id\n\
             _struct_conf.pdbx_beg_PDB_ins_code\n\
             _struct_conf.end_label_asym_id\n_struct_conf.end_label_seq_id\n\
             HELX_P H1 A 10 B A 15\n",
        );
        let structure = parse_cif(&text, &ParseOptions::default()).unwrap();
        assert!(kinds(&structure).iter().all(|k| *k == SecondaryStructureType::None));
    }

    #[test]
    fn disabled_resolution_leaves_residues_unassigned() {
        let text = residues_with_ranges(
            "loop_\n_struct_conf.conf_type_id\n_struct_conf.id\n\
             _struct_conf.beg_label_asym_id\n_struct_conf.beg_label_seq_id\n\
             _struct_conf.end_label_asym_id\n_struct_conf.end_label_seq_id\n\
             HELX_P H1 A 10 A 15\n",
        );
        let options = ParseOptions::builder()
            .secondary_structure(false)
            .build()
            .unwrap();
        let structure = parse_cif(&text, &options).unwrap();
        assert!(kinds(&structure).iter().all(|k| *k == SecondaryStructureType::None));
    }
}
