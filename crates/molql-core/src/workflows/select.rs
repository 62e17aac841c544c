use crate::core::models::secondary_structure::SecondaryStructureType;
use crate::query::{AtomSet, AtomSetSeq, Context, Environment, QueryError};
use tracing::debug;

/// Residue-level selection criteria. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidueFilter {
    /// Author chain id (`auth_asym_id`).
    pub chain: Option<String>,
    pub secondary_structure: Option<SecondaryStructureType>,
    pub modified_only: bool,
}

impl ResidueFilter {
    fn matches(&self, env: &Environment<'_>) -> Result<bool, QueryError> {
        let address = env
            .element
            .current()
            .ok_or_else(|| QueryError::Evaluation("no current element".to_string()))?;
        let model = env.context().model();

        if let Some(chain) = &self.chain {
            let auth_asym_id = model.data.atom_site.auth_asym_id.get_string(address.data_index);
            if auth_asym_id != Some(chain.as_str()) {
                return Ok(false);
            }
        }
        if let Some(kind) = self.secondary_structure {
            if model.secondary_structure.kind[address.residue] != kind {
                return Ok(false);
            }
        }
        if self.modified_only && !model.is_modified(address.residue) {
            return Ok(false);
        }
        Ok(true)
    }
}

/// Returns one atom set per matching residue, holding that residue's visible atoms.
pub fn select_residues(
    context: &Context,
    filter: &ResidueFilter,
) -> Result<AtomSetSeq, QueryError> {
    let mut env: Environment<'_> = Environment::new(context);
    select_residues_in(&mut env, filter)
}

/// Like [`select_residues`], evaluated inside an existing environment so callers can impose
/// a time budget.
pub fn select_residues_in(
    env: &mut Environment<'_>,
    filter: &ResidueFilter,
) -> Result<AtomSetSeq, QueryError> {
    let context = env.context();
    let mut sets = Vec::new();

    env.for_each_residue(|env| -> Result<(), QueryError> {
        if filter.matches(env)? {
            if let Some(address) = env.element.current() {
                let atoms: Vec<usize> = context.residue_atoms(address.residue).collect();
                sets.push(AtomSet::new(context, atoms));
            }
        }
        Ok(())
    })?;

    debug!(selected = sets.len(), filter = ?filter, "Selected residues.");
    Ok(AtomSetSeq::new(context, sets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ParseOptions;
    use crate::core::parser::parse_cif;
    use std::sync::Arc;
    use std::time::Instant;

    const TWO_CHAINS: &str = "\
data_sel
loop_
_atom_site.label_entity_id
_atom_site.label_asym_id
_atom_site.auth_asym_id
_atom_site.label_comp_id
_atom_site.label_seq_id
_atom_site.auth_seq_id
1 A A ALA 1 1
1 A A ALA 1 1
1 A A MSE 2 2
1 A A GLY 3 3
1 B B ALA 1 1
1 B B MSE 2 2
_struct_conf.conf_type_id HELX_P
_struct_conf.id H1
_struct_conf.beg_label_asym_id A
_struct_conf.beg_label_seq_id 2
_struct_conf.end_label_asym_id A
_struct_conf.end_label_seq_id 3
_pdbx_struct_mod_residue.id 1
_pdbx_struct_mod_residue.label_asym_id B
_pdbx_struct_mod_residue.label_seq_id 2
_pdbx_struct_mod_residue.label_comp_id MSE
";

    fn context() -> Context {
        let structure = parse_cif(TWO_CHAINS, &ParseOptions::default()).unwrap();
        Context::of_model(Arc::clone(&structure.models[0]))
    }

    fn residues(seq: &AtomSetSeq) -> Vec<usize> {
        seq.iter().flat_map(|set| set.residue_indices().to_vec()).collect()
    }

    #[test]
    fn empty_filter_selects_every_residue() {
        let seq = select_residues(&context(), &ResidueFilter::default()).unwrap();
        assert_eq!(residues(&seq), vec![0, 1, 2, 3, 4]);
        assert_eq!(seq.atom_sets()[0].atom_indices(), &[0, 1]);
    }

    #[test]
    fn chain_and_secondary_structure_filters_combine() {
        let filter = ResidueFilter {
            chain: Some("A".to_string()),
            secondary_structure: Some(SecondaryStructureType::Helix),
            ..ResidueFilter::default()
        };
        let seq = select_residues(&context(), &filter).unwrap();
        assert_eq!(residues(&seq), vec![1, 2]);
    }

    #[test]
    fn modified_only_filter_uses_residue_map() {
        let filter = ResidueFilter {
            modified_only: true,
            ..ResidueFilter::default()
        };
        let seq = select_residues(&context(), &filter).unwrap();
        assert_eq!(residues(&seq), vec![4]);
    }

    #[test]
    fn masked_context_limits_selected_atoms() {
        let base = context();
        let ctx = Context::of_indices(Arc::clone(base.model()), &[1, 5]);
        let seq = select_residues(&ctx, &ResidueFilter::default()).unwrap();
        assert_eq!(residues(&seq), vec![0, 4]);
        assert_eq!(seq.atom_sets()[0].atom_indices(), &[1]);
    }

    #[test]
    fn exhausted_budget_surfaces_timeout() {
        let ctx = context();
        let mut env: Environment<'_> = Environment::new(&ctx).with_deadline(Instant::now());
        let result = select_residues_in(&mut env, &ResidueFilter::default());
        assert!(matches!(result, Err(QueryError::Timeout { .. })));
        assert!(env.element.current().is_none());
    }
}
