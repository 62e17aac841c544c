use crate::core::io::cif::ValuePresence;
use crate::core::models::structure::Model;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// Author-facing residue identity within one chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResidueIdentifier {
    Number(Option<i64>),
    Inserted(Option<i64>, String),
}

/// Dense key allocator shared by every scope of one hierarchy level.
#[derive(Debug, Default)]
struct KeyCounter(u32);

impl KeyCounter {
    fn next(&mut self) -> u32 {
        let key = self.0;
        self.0 += 1;
        key
    }
}

/// First-seen interning of identifiers within one parent scope.
#[derive(Debug)]
pub(crate) struct KeyScope<K> {
    keys: HashMap<K, u32>,
}

impl<K: Hash + Eq> Default for KeyScope<K> {
    fn default() -> Self {
        Self {
            keys: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq> KeyScope<K> {
    fn intern(&mut self, id: K, counter: &mut KeyCounter) -> u32 {
        *self.keys.entry(id).or_insert_with(|| counter.next())
    }
}

/// The scopes of one hierarchy level, one per parent key.
#[derive(Debug)]
struct ScopeArena<K> {
    scopes: HashMap<u32, KeyScope<K>>,
    counter: KeyCounter,
}

impl<K: Hash + Eq> Default for ScopeArena<K> {
    fn default() -> Self {
        Self {
            scopes: HashMap::new(),
            counter: KeyCounter::default(),
        }
    }
}

impl<K: Hash + Eq> ScopeArena<K> {
    fn intern(&mut self, parent: u32, id: K) -> u32 {
        self.scopes
            .entry(parent)
            .or_default()
            .intern(id, &mut self.counter)
    }
}

/// Scoped interning tables for one parse.
#[derive(Debug, Default)]
pub(crate) struct KeyInterner {
    entities: KeyScope<String>,
    entity_counter: KeyCounter,
    chains: ScopeArena<String>,
    residues: ScopeArena<ResidueIdentifier>,
}

impl KeyInterner {
    pub fn entity_key(&mut self, entity_id: &str) -> u32 {
        self.entities
            .intern(entity_id.to_string(), &mut self.entity_counter)
    }

    pub fn chain_key(&mut self, entity_key: u32, auth_asym_id: &str) -> u32 {
        self.chains.intern(entity_key, auth_asym_id.to_string())
    }

    pub fn residue_key(&mut self, chain_key: u32, residue: ResidueIdentifier) -> u32 {
        self.residues.intern(chain_key, residue)
    }
}

/// Assigns entity, chain and residue keys and resolves each entity's `_entity` row.
pub(crate) fn assign_keys(model: &mut Model, interner: &mut KeyInterner) {
    let data = Arc::clone(&model.data);
    let atom_site = &data.atom_site;
    let entity = &data.entity;

    let entity_rows: HashMap<&str, usize> = (0..entity.row_count())
        .rev()
        .map(|row| (entity.id.get_string(row).unwrap_or(""), row))
        .collect();

    for e in 0..model.entities.count {
        let chains = model.chain_range(e);
        if chains.is_empty() {
            continue;
        }
        let entity_id = atom_site
            .label_entity_id
            .get_string(model.chain_data_row(chains.start))
            .unwrap_or("");
        model.entities.data_index[e] = entity_rows.get(entity_id).copied().unwrap_or(0);
        let entity_key = interner.entity_key(entity_id);
        model.entities.key[e] = entity_key;

        for c in chains {
            let asym_id = atom_site
                .auth_asym_id
                .get_string(model.chain_data_row(c))
                .unwrap_or("");
            let chain_key = interner.chain_key(entity_key, asym_id);
            model.chains.key[c] = chain_key;

            for r in model.residue_range(c) {
                let row = model.residue_data_row(r);
                let seq = atom_site.auth_seq_id.get_integer(row);
                let identifier = match (
                    atom_site.pdbx_pdb_ins_code.get_value_presence(row),
                    atom_site.pdbx_pdb_ins_code.get_string(row),
                ) {
                    (ValuePresence::Present, Some(ins)) => {
                        ResidueIdentifier::Inserted(seq, ins.to_string())
                    }
                    _ => ResidueIdentifier::Number(seq),
                };
                model.residues.key[r] = interner.residue_key(chain_key, identifier);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_identifiers_share_keys() {
        let mut interner = KeyInterner::default();
        let e1 = interner.entity_key("1");
        let a = interner.chain_key(e1, "A");

        let r1 = interner.residue_key(a, ResidueIdentifier::Number(Some(10)));
        let r2 = interner.residue_key(a, ResidueIdentifier::Number(Some(11)));
        let r1_again = interner.residue_key(a, ResidueIdentifier::Number(Some(10)));

        assert_eq!(r1, r1_again);
        assert_ne!(r1, r2);
        assert_eq!(interner.entity_key("1"), e1);
        assert_eq!(interner.chain_key(e1, "A"), a);
    }

    #[test]
    fn insertion_code_distinguishes_residues() {
        let mut interner = KeyInterner::default();
        let e = interner.entity_key("1");
        let a = interner.chain_key(e, "A");

        let plain = interner.residue_key(a, ResidueIdentifier::Number(Some(52)));
        let inserted =
            interner.residue_key(a, ResidueIdentifier::Inserted(Some(52), "A".to_string()));
        assert_ne!(plain, inserted);
    }

    #[test]
    fn keys_are_allocated_in_first_seen_order() {
        let mut interner = KeyInterner::default();
        assert_eq!(interner.entity_key("2"), 0);
        assert_eq!(interner.entity_key("1"), 1);

        let a = interner.chain_key(0, "A");
        let b = interner.chain_key(1, "B");
        assert_eq!((a, b), (0, 1));

        assert_eq!(interner.residue_key(a, ResidueIdentifier::Number(Some(5))), 0);
        assert_eq!(interner.residue_key(b, ResidueIdentifier::Number(Some(5))), 1);
        assert_eq!(interner.residue_key(a, ResidueIdentifier::Number(Some(6))), 2);
    }
}
