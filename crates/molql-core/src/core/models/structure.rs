use super::derived::DerivedViews;
use super::secondary_structure::SecondaryStructure;
use crate::core::io::mmcif::MmcifData;
use nalgebra::Point3;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

/// All models parsed from one data block.
#[derive(Debug, Clone)]
pub struct Structure {
    /// Header of the data block the models came from.
    pub id: String,
    pub models: Vec<Arc<Model>>,
}

impl Structure {
    /// Finds a model by its `pdbx_PDB_model_num`.
    ///
    /// # Arguments
    ///
    /// * `id` - The model number to look up.
    ///
    /// # Return
    ///
    /// Returns `Some(&Arc<Model>)` if a model with that number was parsed, otherwise `None`.
    pub fn model(&self, id: i32) -> Option<&Arc<Model>> {
        self.models.iter().find(|model| model.id == id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Atoms {
    /// Source row in `_atom_site`.
    pub data_index: Vec<usize>,
    pub residue_index: Vec<usize>,
    pub count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Residues {
    pub atom_offset: Vec<usize>,
    pub chain_index: Vec<usize>,
    pub key: Vec<u32>,
    pub count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Chains {
    pub residue_offset: Vec<usize>,
    pub entity_index: Vec<usize>,
    pub key: Vec<u32>,
    pub count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Entities {
    pub chain_offset: Vec<usize>,
    pub key: Vec<u32>,
    /// Row in `_entity`, or 0 when the entity is not listed there.
    pub data_index: Vec<usize>,
    pub count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Positions {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
}

impl Positions {
    /// Coordinates of `atom` as a point.
    pub fn point(&self, atom: usize) -> Point3<f64> {
        Point3::new(self.x[atom], self.y[atom], self.z[atom])
    }
}

/// One conformer of a structure, stored as flat per-atom arrays plus one offset array per
/// hierarchy level.
///
/// Children of group `i` at any level are `offset[i]..offset[i + 1]`. A model is immutable
/// once the parser hands it out and is shared between queries behind an [`Arc`].
#[derive(Debug)]
pub struct Model {
    pub structure_id: String,
    /// `pdbx_PDB_model_num` of the model's rows.
    pub id: i32,
    pub atoms: Atoms,
    pub positions: Positions,
    pub residues: Residues,
    pub chains: Chains,
    pub entities: Entities,
    pub secondary_structure: SecondaryStructure,
    /// Residue index to `_pdbx_struct_mod_residue` row.
    pub modified_residues: HashMap<usize, usize>,
    pub data: Arc<MmcifData>,
    pub derived: DerivedViews,
}

impl Model {
    /// Atom indices belonging to a residue.
    ///
    /// # Arguments
    ///
    /// * `residue` - The residue index.
    ///
    /// # Return
    ///
    /// The half-open range `atom_offset[residue]..atom_offset[residue + 1]`.
    ///
    /// # Panics
    ///
    /// Panics if `residue >= self.residues.count`.
    pub fn atom_range(&self, residue: usize) -> Range<usize> {
        self.residues.atom_offset[residue]..self.residues.atom_offset[residue + 1]
    }

    /// Residue indices belonging to a chain.
    ///
    /// # Arguments
    ///
    /// * `chain` - The chain index.
    ///
    /// # Return
    ///
    /// The half-open range `residue_offset[chain]..residue_offset[chain + 1]`.
    ///
    /// # Panics
    ///
    /// Panics if `chain >= self.chains.count`.
    pub fn residue_range(&self, chain: usize) -> Range<usize> {
        self.chains.residue_offset[chain]..self.chains.residue_offset[chain + 1]
    }

    /// Chain indices belonging to an entity.
    ///
    /// # Arguments
    ///
    /// * `entity` - The entity index.
    ///
    /// # Return
    ///
    /// The half-open range `chain_offset[entity]..chain_offset[entity + 1]`.
    ///
    /// # Panics
    ///
    /// Panics if `entity >= self.entities.count`.
    pub fn chain_range(&self, entity: usize) -> Range<usize> {
        self.entities.chain_offset[entity]..self.entities.chain_offset[entity + 1]
    }

    /// `_atom_site` row of the first atom of `residue`.
    pub fn residue_data_row(&self, residue: usize) -> usize {
        self.atoms.data_index[self.residues.atom_offset[residue]]
    }

    /// `_atom_site` row of the first atom of `chain`.
    pub fn chain_data_row(&self, chain: usize) -> usize {
        self.residue_data_row(self.chains.residue_offset[chain])
    }

    /// Resolves the chain an atom belongs to through its residue.
    ///
    /// # Arguments
    ///
    /// * `atom` - The atom index.
    ///
    /// # Return
    ///
    /// The chain index of the atom's residue.
    ///
    /// # Panics
    ///
    /// Panics if `atom >= self.atoms.count`.
    pub fn chain_of_atom(&self, atom: usize) -> usize {
        self.residues.chain_index[self.atoms.residue_index[atom]]
    }

    /// Entity of the atom's chain.
    pub fn entity_of_atom(&self, atom: usize) -> usize {
        self.chains.entity_index[self.chain_of_atom(atom)]
    }

    /// Whether `_pdbx_struct_mod_residue` lists `residue`.
    pub fn is_modified(&self, residue: usize) -> bool {
        self.modified_residues.contains_key(&residue)
    }

    /// Checks the offset-array invariants every consumer relies on: length `count + 1`,
    /// non-decreasing, starting at 0 and ending at the child count.
    pub fn has_consistent_offsets(&self) -> bool {
        fn valid(offsets: &[usize], count: usize, children: usize) -> bool {
            offsets.len() == count + 1
                && offsets.first() == Some(&0)
                && offsets.last() == Some(&children)
                && offsets.windows(2).all(|w| w[0] <= w[1])
        }

        valid(&self.residues.atom_offset, self.residues.count, self.atoms.count)
            && valid(&self.chains.residue_offset, self.chains.count, self.residues.count)
            && valid(&self.entities.chain_offset, self.entities.count, self.chains.count)
    }
}
