use crate::core::models::secondary_structure::SecondaryStructureType;
use crate::core::models::structure::{Model, Structure};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureSummary {
    pub id: String,
    pub models: Vec<ModelSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub id: i32,
    pub atoms: usize,
    pub residues: usize,
    pub chains: usize,
    pub entities: usize,
    pub helices: usize,
    pub sheets: usize,
    pub modified_residues: usize,
}

impl ModelSummary {
    pub fn of(model: &Model) -> Self {
        let ss = &model.secondary_structure;
        let mut helices = HashSet::new();
        let mut sheets = HashSet::new();
        for (kind, key) in ss.kind.iter().zip(&ss.key) {
            match kind {
                SecondaryStructureType::Helix => {
                    helices.insert(*key);
                }
                SecondaryStructureType::Sheet => {
                    sheets.insert(*key);
                }
                SecondaryStructureType::None => {}
            }
        }

        Self {
            id: model.id,
            atoms: model.atoms.count,
            residues: model.residues.count,
            chains: model.chains.count,
            entities: model.entities.count,
            helices: helices.len(),
            sheets: sheets.len(),
            modified_residues: model.modified_residues.len(),
        }
    }
}

pub fn summarize(structure: &Structure) -> StructureSummary {
    StructureSummary {
        id: structure.id.clone(),
        models: structure
            .models
            .iter()
            .map(|model| ModelSummary::of(model))
            .collect(),
    }
}
