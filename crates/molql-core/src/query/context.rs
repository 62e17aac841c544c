use super::atom_set::{AtomSet, AtomSetSeq};
use super::mask::Mask;
use crate::core::models::structure::Model;
use std::sync::Arc;

/// Chooses which atoms of a model a [`Context`] exposes.
#[derive(Debug, Clone, Copy)]
pub enum Selector<'a> {
    Always,
    Indices(&'a [usize]),
    AtomSet(&'a AtomSet),
    /// The union of the member sets' atoms.
    AtomSetSeq(&'a AtomSetSeq),
}

/// A model paired with the mask of atoms one query may see.
#[derive(Debug, Clone)]
pub struct Context {
    model: Arc<Model>,
    mask: Arc<Mask>,
}

impl Context {
    /// Pairs `model` with an already built `mask`.
    pub fn new(model: Arc<Model>, mask: Mask) -> Self {
        Self {
            model,
            mask: Arc::new(mask),
        }
    }

    /// Creates a context exposing the atoms `selector` picks out of `model`.
    ///
    /// # Arguments
    ///
    /// * `model` - The model the context views.
    /// * `selector` - Which atoms stay visible.
    ///
    /// # Return
    ///
    /// A context whose mask has `model.atoms.count` slots.
    pub fn of(model: Arc<Model>, selector: Selector<'_>) -> Self {
        match selector {
            Selector::Always => Self::of_model(model),
            Selector::Indices(indices) => Self::of_indices(model, indices),
            Selector::AtomSet(set) => Self::of_atom_set(model, set),
            Selector::AtomSetSeq(seq) => Self::of_atom_set_seq(model, seq),
        }
    }

    /// Creates a context in which every atom of `model` is visible.
    ///
    /// # Arguments
    ///
    /// * `model` - The model the context views.
    ///
    /// # Return
    ///
    /// A context backed by [`Mask::always`], so membership tests never touch storage.
    pub fn of_model(model: Arc<Model>) -> Self {
        let size = model.atoms.count;
        Self::new(model, Mask::always(size))
    }

    /// Creates a context exposing only the listed atoms.
    ///
    /// # Arguments
    ///
    /// * `model` - The model the context views.
    /// * `indices` - Atom indices to keep visible. Order and duplicates are irrelevant.
    ///
    /// # Return
    ///
    /// A context whose mask holds the distinct in-range indices. Indices at or past
    /// `model.atoms.count` are ignored.
    pub fn of_indices(model: Arc<Model>, indices: &[usize]) -> Self {
        let size = model.atoms.count;
        Self::new(model, Mask::of_indices(size, indices))
    }

    pub fn of_atom_set(model: Arc<Model>, set: &AtomSet) -> Self {
        Self::of_indices(model, set.atom_indices())
    }

    pub fn of_atom_set_seq(model: Arc<Model>, seq: &AtomSetSeq) -> Self {
        let indices = seq.union_indices();
        Self::of_indices(model, &indices)
    }

    /// The model this context views, shared with every derived context.
    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// The mask of visible atoms. Its size always equals the model's atom count.
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Visible atoms in ascending order.
    pub fn atoms(&self) -> impl Iterator<Item = usize> + '_ {
        self.mask.iter()
    }

    /// Residues with at least one visible atom, in ascending order.
    pub fn residues(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.model.residues.count)
            .filter(move |&r| self.model.atom_range(r).any(|a| self.mask.has(a)))
    }

    /// Chains with at least one visible atom, in ascending order.
    pub fn chains(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.model.chains.count).filter(move |&c| {
            let residues = self.model.residue_range(c);
            let offsets = &self.model.residues.atom_offset;
            (offsets[residues.start]..offsets[residues.end]).any(|a| self.mask.has(a))
        })
    }

    /// Visible atoms of `residue`.
    pub fn residue_atoms(&self, residue: usize) -> impl Iterator<Item = usize> + '_ {
        self.model
            .atom_range(residue)
            .filter(move |&a| self.mask.has(a))
    }

    /// Resolves the full hierarchy address of `atom`.
    ///
    /// # Panics
    ///
    /// Panics if `atom` is not an atom index of the model.
    pub fn address_of_atom(&self, atom: usize) -> ElementAddress {
        let mut address = ElementAddress::default();
        address.set_atom(self, atom);
        address
    }

    pub fn address_of_residue(&self, residue: usize) -> ElementAddress {
        let mut address = ElementAddress::default();
        address.set_residue(self, residue);
        address
    }
}

/// The position of the current element at every hierarchy level, plus its `_atom_site` row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ElementAddress {
    pub data_index: usize,
    pub atom: usize,
    pub residue: usize,
    pub chain: usize,
    pub entity: usize,
}

impl ElementAddress {
    pub fn set_atom(&mut self, ctx: &Context, atom: usize) {
        let model = ctx.model();
        self.atom = atom;
        self.data_index = model.atoms.data_index[atom];
        self.residue = model.atoms.residue_index[atom];
        self.chain = model.residues.chain_index[self.residue];
        self.entity = model.chains.entity_index[self.chain];
    }

    /// Moves to the first atom of `residue`.
    pub fn set_residue(&mut self, ctx: &Context, residue: usize) {
        let model = ctx.model();
        self.residue = residue;
        self.atom = model.residues.atom_offset[residue];
        self.data_index = model.atoms.data_index[self.atom];
        self.chain = model.residues.chain_index[residue];
        self.entity = model.chains.entity_index[self.chain];
    }

    /// Moves to the first residue and atom of `chain`.
    pub fn set_chain(&mut self, ctx: &Context, chain: usize) {
        let model = ctx.model();
        self.chain = chain;
        self.entity = model.chains.entity_index[chain];
        self.residue = model.chains.residue_offset[chain];
        self.atom = model.residues.atom_offset[self.residue];
        self.data_index = model.atoms.data_index[self.atom];
    }

    /// Moves to the first chain, residue and atom of `entity`.
    pub fn set_entity(&mut self, ctx: &Context, entity: usize) {
        let model = ctx.model();
        self.entity = entity;
        self.chain = model.entities.chain_offset[entity];
        self.residue = model.chains.residue_offset[self.chain];
        self.atom = model.residues.atom_offset[self.residue];
        self.data_index = model.atoms.data_index[self.atom];
    }
}
