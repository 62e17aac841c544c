//! Named views over the mmCIF categories the structure parser consumes.
//!
//! Each view resolves its columns once. A category missing from the data block yields a
//! zero-row view whose columns are all [`UndefinedColumn`]s, so downstream code never has
//! to distinguish "absent" from "empty".

use super::cif::text::CifFile;
use super::cif::{Category, ColumnRef, DataBlock, UndefinedColumn};
use super::traits::StructureFile;
use crate::core::config::ParseOptions;
use crate::core::models::structure::Structure;
use crate::core::parser::{self, ParseError};
use std::io::{BufRead, Read};
use tracing::debug;

macro_rules! mmcif_category {
    (
        $(#[$meta:meta])*
        $name:ident = $category:literal {
            $($field:ident => $column:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            row_count: usize,
            present: bool,
            $(pub $field: ColumnRef,)*
        }

        impl $name {
            pub const NAME: &'static str = $category;

            pub fn from_block(block: &dyn DataBlock) -> Self {
                let category = block.get_category($category);
                if category.is_none() {
                    debug!(category = $category, "Category absent, using an empty view.");
                }
                Self::from_category(category.as_deref())
            }

            pub fn from_category(category: Option<&dyn Category>) -> Self {
                match category {
                    Some(category) => Self {
                        row_count: category.row_count(),
                        present: true,
                        $($field: category
                            .column($column)
                            .unwrap_or_else(UndefinedColumn::shared),)*
                    },
                    None => Self::empty(),
                }
            }

            pub fn empty() -> Self {
                Self {
                    row_count: 0,
                    present: false,
                    $($field: UndefinedColumn::shared(),)*
                }
            }

            pub fn row_count(&self) -> usize {
                self.row_count
            }

            /// Whether the category existed in the source block.
            pub fn is_present(&self) -> bool {
                self.present
            }
        }
    };
}

mmcif_category! {
    /// `_atom_site`: one row per atom, possibly spanning several model frames.
    AtomSite = "atom_site" {
        group_pdb => "group_PDB",
        id => "id",
        type_symbol => "type_symbol",
        label_atom_id => "label_atom_id",
        label_alt_id => "label_alt_id",
        label_comp_id => "label_comp_id",
        label_asym_id => "label_asym_id",
        label_entity_id => "label_entity_id",
        label_seq_id => "label_seq_id",
        pdbx_pdb_ins_code => "pdbx_PDB_ins_code",
        pdbx_formal_charge => "pdbx_formal_charge",
        cartn_x => "Cartn_x",
        cartn_y => "Cartn_y",
        cartn_z => "Cartn_z",
        occupancy => "occupancy",
        b_iso_or_equiv => "B_iso_or_equiv",
        auth_atom_id => "auth_atom_id",
        auth_comp_id => "auth_comp_id",
        auth_asym_id => "auth_asym_id",
        auth_seq_id => "auth_seq_id",
        pdbx_pdb_model_num => "pdbx_PDB_model_num",
    }
}

mmcif_category! {
    /// `_entity`: distinct chemical components of the entry.
    Entity = "entity" {
        id => "id",
        entity_type => "type",
        src_method => "src_method",
        pdbx_description => "pdbx_description",
        formula_weight => "formula_weight",
        pdbx_number_of_molecules => "pdbx_number_of_molecules",
        details => "details",
        pdbx_mutation => "pdbx_mutation",
        pdbx_fragment => "pdbx_fragment",
        pdbx_ec => "pdbx_ec",
    }
}

mmcif_category! {
    /// `_struct_conf`: helix and turn ranges.
    StructConf = "struct_conf" {
        conf_type_id => "conf_type_id",
        id => "id",
        pdbx_pdb_helix_id => "pdbx_PDB_helix_id",
        beg_label_comp_id => "beg_label_comp_id",
        beg_label_asym_id => "beg_label_asym_id",
        beg_label_seq_id => "beg_label_seq_id",
        pdbx_beg_pdb_ins_code => "pdbx_beg_PDB_ins_code",
        end_label_comp_id => "end_label_comp_id",
        end_label_asym_id => "end_label_asym_id",
        end_label_seq_id => "end_label_seq_id",
        pdbx_end_pdb_ins_code => "pdbx_end_PDB_ins_code",
        beg_auth_comp_id => "beg_auth_comp_id",
        beg_auth_asym_id => "beg_auth_asym_id",
        beg_auth_seq_id => "beg_auth_seq_id",
        end_auth_comp_id => "end_auth_comp_id",
        end_auth_asym_id => "end_auth_asym_id",
        end_auth_seq_id => "end_auth_seq_id",
        pdbx_pdb_helix_class => "pdbx_PDB_helix_class",
        details => "details",
        pdbx_pdb_helix_length => "pdbx_PDB_helix_length",
    }
}

mmcif_category! {
    /// `_struct_sheet_range`: beta-strand ranges grouped by sheet.
    StructSheetRange = "struct_sheet_range" {
        sheet_id => "sheet_id",
        id => "id",
        beg_label_comp_id => "beg_label_comp_id",
        beg_label_asym_id => "beg_label_asym_id",
        beg_label_seq_id => "beg_label_seq_id",
        pdbx_beg_pdb_ins_code => "pdbx_beg_PDB_ins_code",
        end_label_comp_id => "end_label_comp_id",
        end_label_asym_id => "end_label_asym_id",
        end_label_seq_id => "end_label_seq_id",
        pdbx_end_pdb_ins_code => "pdbx_end_PDB_ins_code",
        symmetry => "symmetry",
        beg_auth_comp_id => "beg_auth_comp_id",
        beg_auth_asym_id => "beg_auth_asym_id",
        beg_auth_seq_id => "beg_auth_seq_id",
        end_auth_comp_id => "end_auth_comp_id",
        end_auth_asym_id => "end_auth_asym_id",
        end_auth_seq_id => "end_auth_seq_id",
    }
}

mmcif_category! {
    /// `_chem_comp_bond`: intra-component bond templates.
    ChemCompBond = "chem_comp_bond" {
        comp_id => "comp_id",
        atom_id_1 => "atom_id_1",
        atom_id_2 => "atom_id_2",
        value_order => "value_order",
        pdbx_aromatic_flag => "pdbx_aromatic_flag",
        pdbx_stereo_config => "pdbx_stereo_config",
        pdbx_ordinal => "pdbx_ordinal",
    }
}

mmcif_category! {
    /// `_struct_conn`: explicit inter-residue connections.
    StructConn = "struct_conn" {
        id => "id",
        conn_type_id => "conn_type_id",
        pdbx_pdb_id => "pdbx_PDB_id",
        ptnr1_label_asym_id => "ptnr1_label_asym_id",
        ptnr1_label_comp_id => "ptnr1_label_comp_id",
        ptnr1_label_seq_id => "ptnr1_label_seq_id",
        ptnr1_label_atom_id => "ptnr1_label_atom_id",
        pdbx_ptnr1_label_alt_id => "pdbx_ptnr1_label_alt_id",
        pdbx_ptnr1_pdb_ins_code => "pdbx_ptnr1_PDB_ins_code",
        ptnr1_symmetry => "ptnr1_symmetry",
        ptnr2_label_asym_id => "ptnr2_label_asym_id",
        ptnr2_label_comp_id => "ptnr2_label_comp_id",
        ptnr2_label_seq_id => "ptnr2_label_seq_id",
        ptnr2_label_atom_id => "ptnr2_label_atom_id",
        pdbx_ptnr2_label_alt_id => "pdbx_ptnr2_label_alt_id",
        pdbx_ptnr2_pdb_ins_code => "pdbx_ptnr2_PDB_ins_code",
        ptnr2_symmetry => "ptnr2_symmetry",
        pdbx_value_order => "pdbx_value_order",
    }
}

mmcif_category! {
    /// `_pdbx_struct_mod_residue`: residues modified relative to a parent component.
    PdbxStructModResidue = "pdbx_struct_mod_residue" {
        id => "id",
        label_asym_id => "label_asym_id",
        label_seq_id => "label_seq_id",
        label_comp_id => "label_comp_id",
        auth_asym_id => "auth_asym_id",
        auth_seq_id => "auth_seq_id",
        auth_comp_id => "auth_comp_id",
        pdb_ins_code => "PDB_ins_code",
        parent_comp_id => "parent_comp_id",
        details => "details",
    }
}

#[derive(Debug, Clone)]
pub struct BondData {
    pub chem_comp_bond: ChemCompBond,
    pub struct_conn: StructConn,
}

#[derive(Debug, Clone)]
pub struct SecondaryStructureData {
    pub struct_conf: StructConf,
    pub sheet_range: StructSheetRange,
}

/// The source categories of one data block, shared by every model parsed from it.
#[derive(Debug, Clone)]
pub struct MmcifData {
    pub atom_site: AtomSite,
    pub entity: Entity,
    pub bonds: BondData,
    pub secondary_structure: SecondaryStructureData,
    pub mod_residue: PdbxStructModResidue,
}

impl MmcifData {
    pub fn from_block(block: &dyn DataBlock) -> Self {
        Self {
            atom_site: AtomSite::from_block(block),
            entity: Entity::from_block(block),
            bonds: BondData {
                chem_comp_bond: ChemCompBond::from_block(block),
                struct_conn: StructConn::from_block(block),
            },
            secondary_structure: SecondaryStructureData {
                struct_conf: StructConf::from_block(block),
                sheet_range: StructSheetRange::from_block(block),
            },
            mod_residue: PdbxStructModResidue::from_block(block),
        }
    }

    pub fn empty() -> Self {
        Self {
            atom_site: AtomSite::empty(),
            entity: Entity::empty(),
            bonds: BondData {
                chem_comp_bond: ChemCompBond::empty(),
                struct_conn: StructConn::empty(),
            },
            secondary_structure: SecondaryStructureData {
                struct_conf: StructConf::empty(),
                sheet_range: StructSheetRange::empty(),
            },
            mod_residue: PdbxStructModResidue::empty(),
        }
    }
}

/// mmCIF text files.
pub struct MmcifFile;

impl StructureFile for MmcifFile {
    type Error = ParseError;

    fn read_from(
        reader: &mut impl BufRead,
        options: &ParseOptions,
    ) -> Result<Structure, Self::Error> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        let file = CifFile::parse(&text)?;
        parser::parse_file(&file, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: &str = "\
data_TEST
loop_
_atom_site.id
_atom_site.label_entity_id
_atom_site.Cartn_x
1 1 0.5
2 1 1.5
_struct_conf.conf_type_id HELX_P
";

    #[test]
    fn present_categories_resolve_columns() {
        let file = CifFile::parse(BLOCK).unwrap();
        let data = MmcifData::from_block(file.first_block().unwrap().as_ref());

        assert!(data.atom_site.is_present());
        assert_eq!(data.atom_site.row_count(), 2);
        assert_eq!(data.atom_site.cartn_x.get_float(1), Some(1.5));
        assert!(!data.atom_site.auth_asym_id.is_defined());

        assert_eq!(data.secondary_structure.struct_conf.row_count(), 1);
        assert_eq!(
            data.secondary_structure.struct_conf.conf_type_id.get_string(0),
            Some("HELX_P")
        );
    }

    #[test]
    fn absent_categories_degrade_to_empty_views() {
        let file = CifFile::parse(BLOCK).unwrap();
        let data = MmcifData::from_block(file.first_block().unwrap().as_ref());

        assert!(!data.entity.is_present());
        assert_eq!(data.entity.row_count(), 0);
        assert_eq!(data.bonds.struct_conn.row_count(), 0);
        assert_eq!(data.secondary_structure.sheet_range.row_count(), 0);
        assert_eq!(data.mod_residue.row_count(), 0);
        assert_eq!(data.mod_residue.label_asym_id.get_string(0), None);
    }

    #[test]
    fn mmcif_file_reads_structures_from_a_reader() {
        let mut reader = std::io::Cursor::new(BLOCK.as_bytes());
        let structure = MmcifFile::read_from(&mut reader, &ParseOptions::default()).unwrap();
        assert_eq!(structure.id, "TEST");
        assert_eq!(structure.models.len(), 1);
        assert_eq!(structure.models[0].atoms.count, 2);
    }
}
