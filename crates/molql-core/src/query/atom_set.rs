use super::context::Context;
use std::collections::HashSet;
use std::sync::Arc;

/// An immutable selection of atoms within one [`Context`].
///
/// In-range atoms are kept exactly as given. Residue and chain lists hold each owning group
/// once, in order of first occurrence. The hash depends only on the set of distinct atoms,
/// so `[5, 5, 2, 5]` and `[2, 5]` hash equally.
#[derive(Debug, Clone)]
pub struct AtomSet {
    context: Context,
    hash_code: u64,
    atom_indices: Vec<usize>,
    residue_indices: Vec<usize>,
    chain_indices: Vec<usize>,
}

impl AtomSet {
    /// Builds a set from atom indices of `context`'s model.
    ///
    /// # Arguments
    ///
    /// * `context` - The context whose model the indices refer to.
    /// * `atom_indices` - Atom indices in any order, duplicates allowed.
    ///
    /// # Return
    ///
    /// A set holding the indices in their given order. Indices outside the model's atom
    /// range are dropped, as [`Mask::of_indices`](super::Mask::of_indices) drops them.
    pub fn new(context: &Context, mut atom_indices: Vec<usize>) -> Self {
        let model = context.model();
        atom_indices.retain(|&atom| atom < model.atoms.count);
        let mut seen_atoms = HashSet::with_capacity(atom_indices.len());
        let mut seen_residues = HashSet::new();
        let mut seen_chains = HashSet::new();
        let mut residue_indices = Vec::new();
        let mut chain_indices = Vec::new();
        let mut hash = AtomSetHasher::default();

        for &atom in &atom_indices {
            if !seen_atoms.insert(atom) {
                continue;
            }
            hash.add(atom);

            let residue = model.atoms.residue_index[atom];
            if seen_residues.insert(residue) {
                residue_indices.push(residue);
            }
            let chain = model.residues.chain_index[residue];
            if seen_chains.insert(chain) {
                chain_indices.push(chain);
            }
        }

        Self {
            context: context.clone(),
            hash_code: hash.finish(seen_atoms.len()),
            atom_indices,
            residue_indices,
            chain_indices,
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Order- and multiplicity-insensitive hash of the member atoms, computed once at construction.
    pub fn hash_code(&self) -> u64 {
        self.hash_code
    }

    pub fn atom_indices(&self) -> &[usize] {
        &self.atom_indices
    }

    /// Residues touched by the set, each once, in order of first occurrence.
    pub fn residue_indices(&self) -> &[usize] {
        &self.residue_indices
    }

    /// Chains touched by the set, each once, in order of first occurrence.
    pub fn chain_indices(&self) -> &[usize] {
        &self.chain_indices
    }

    /// Number of stored indices, duplicates included.
    pub fn len(&self) -> usize {
        self.atom_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atom_indices.is_empty()
    }

    fn distinct_sorted_atoms(&self) -> Vec<usize> {
        let mut atoms = self.atom_indices.clone();
        atoms.sort_unstable();
        atoms.dedup();
        atoms
    }
}

impl PartialEq for AtomSet {
    fn eq(&self, other: &Self) -> bool {
        self.hash_code == other.hash_code
            && Arc::ptr_eq(self.context.model(), other.context.model())
            && self.distinct_sorted_atoms() == other.distinct_sorted_atoms()
    }
}

impl Eq for AtomSet {}

impl std::hash::Hash for AtomSet {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code);
    }
}

/// Commutative accumulation of per-atom mixes, so insertion order does not matter.
#[derive(Debug, Default)]
struct AtomSetHasher {
    sum: u64,
    xor: u64,
}

impl AtomSetHasher {
    fn add(&mut self, atom: usize) {
        let mixed = mix(atom as u64);
        self.sum = self.sum.wrapping_add(mixed);
        self.xor ^= mixed.rotate_left(29);
    }

    fn finish(&self, distinct: usize) -> u64 {
        mix(self.sum ^ self.xor.wrapping_mul(0x9e37_79b9_7f4a_7c15) ^ distinct as u64)
    }
}

fn mix(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

/// An ordered, read-only sequence of atom sets sharing one context.
#[derive(Debug, Clone)]
pub struct AtomSetSeq {
    context: Context,
    atom_sets: Vec<AtomSet>,
}

impl AtomSetSeq {
    /// Wraps `atom_sets` as a sequence bound to `context`.
    ///
    /// # Arguments
    ///
    /// * `context` - The context the sequence was evaluated in.
    /// * `atom_sets` - The member sets, kept in the given order.
    pub fn new(context: &Context, atom_sets: Vec<AtomSet>) -> Self {
        Self {
            context: context.clone(),
            atom_sets,
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn atom_sets(&self) -> &[AtomSet] {
        &self.atom_sets
    }

    pub fn len(&self) -> usize {
        self.atom_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atom_sets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AtomSet> {
        self.atom_sets.iter()
    }

    /// Drops later duplicates, keeping the first occurrence of every distinct set.
    pub fn dedup(&self) -> Self {
        let mut seen: HashSet<&AtomSet> = HashSet::with_capacity(self.atom_sets.len());
        let atom_sets = self
            .atom_sets
            .iter()
            .filter(|set| seen.insert(*set))
            .cloned()
            .collect();
        Self {
            context: self.context.clone(),
            atom_sets,
        }
    }

    /// Atom indices of every member set, concatenated in sequence order.
    pub fn union_indices(&self) -> Vec<usize> {
        self.atom_sets
            .iter()
            .flat_map(|set| set.atom_indices().iter().copied())
            .collect()
    }
}

impl<'a> IntoIterator for &'a AtomSetSeq {
    type Item = &'a AtomSet;
    type IntoIter = std::slice::Iter<'a, AtomSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.atom_sets.iter()
    }
}
