//! Turns the `_atom_site` rows of an mmCIF data block into [`Model`]s.
//!
//! Rows are scanned once per model frame. Each frame is then annotated in place: entity,
//! chain and residue keys first, then secondary structure and modified residues, before
//! the model is frozen behind an [`Arc`].

mod error;
mod frame;
pub mod keys;
mod modified_residues;
mod secondary_structure;

pub use error::ParseError;

use crate::core::config::ParseOptions;
use crate::core::io::cif::DataBlock;
use crate::core::io::cif::text::CifFile;
use crate::core::io::mmcif::MmcifData;
use crate::core::models::structure::{Model, Structure};
use keys::KeyInterner;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Parses every model of `block`.
///
/// Missing optional categories degrade to empty ones. An `_atom_site` category with no
/// rows yields a structure without models.
#[instrument(skip_all, fields(block = block.header()))]
pub fn parse_block(block: &dyn DataBlock, options: &ParseOptions) -> Result<Structure, ParseError> {
    let data = Arc::new(MmcifData::from_block(block));
    let row_count = data.atom_site.row_count();
    let mut interner = KeyInterner::default();
    let mut models = Vec::new();

    let mut start_row = 0;
    while start_row < row_count {
        let frame = frame::scan_frame(&data.atom_site, start_row);
        let consumed = frame.row_count();
        if consumed == 0 {
            return Err(ParseError::Format(format!(
                "empty model frame at _atom_site row {start_row}"
            )));
        }
        debug!(
            model = frame.model_id,
            start_row,
            atoms = consumed,
            "Scanned model frame."
        );

        if options.keeps_model(frame.model_id) {
            let model = build_model(frame, block.header(), Arc::clone(&data), &mut interner, options);
            models.push(Arc::new(model));
        } else {
            debug!(model = frame.model_id, "Skipping model excluded by options.");
        }
        start_row += consumed;
    }

    Ok(Structure {
        id: block.header().to_string(),
        models,
    })
}

fn build_model(
    frame: frame::Frame,
    structure_id: &str,
    data: Arc<MmcifData>,
    interner: &mut KeyInterner,
    options: &ParseOptions,
) -> Model {
    let mut model = frame.into_model(structure_id, data);
    keys::assign_keys(&mut model, interner);
    if options.secondary_structure {
        secondary_structure::assign_secondary_structure(&mut model);
    }
    if options.modified_residues {
        modified_residues::assign_modified_residues(&mut model);
    }
    model
}

/// Parses the data block selected by `options` from a tokenized CIF file.
pub fn parse_file(file: &CifFile, options: &ParseOptions) -> Result<Structure, ParseError> {
    let block = match &options.block {
        Some(name) => file
            .block(name)
            .ok_or_else(|| ParseError::UnknownDataBlock(name.clone()))?,
        None => file.first_block().ok_or(ParseError::MissingDataBlock)?,
    };
    parse_block(block.as_ref(), options)
}

/// Tokenizes mmCIF text and parses the selected data block.
pub fn parse_cif(text: &str, options: &ParseOptions) -> Result<Structure, ParseError> {
    let file = CifFile::parse(text)?;
    parse_file(&file, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::cif::text::CifError;

    const TWO_MODELS: &str = "\
data_1ABC
loop_
_atom_site.id
_atom_site.label_entity_id
_atom_site.label_asym_id
_atom_site.auth_asym_id
_atom_site.label_seq_id
_atom_site.auth_seq_id
_atom_site.pdbx_PDB_ins_code
_atom_site.pdbx_PDB_model_num
1 1 A A 1 1 ? 1
2 1 A A 2 2 ? 1
3 1 A A 2 2 A 1
4 1 A A 1 1 ? 2
5 1 A A 2 2 ? 2
6 1 A A 2 2 A 2
loop_
_entity.id
_entity.type
1 polymer
";

    #[test]
    fn parses_every_model_frame() {
        let structure = parse_cif(TWO_MODELS, &ParseOptions::default()).unwrap();

        assert_eq!(structure.id, "1ABC");
        assert_eq!(structure.models.len(), 2);
        assert_eq!(structure.models[0].id, 1);
        assert_eq!(structure.models[1].id, 2);
        assert_eq!(structure.models[1].atoms.data_index, vec![3, 4, 5]);
        for model in &structure.models {
            assert!(model.has_consistent_offsets());
            assert_eq!(model.residues.count, 3);
            assert_eq!(model.structure_id, "1ABC");
        }
    }

    #[test]
    fn residue_keys_are_stable_across_models() {
        let structure = parse_cif(TWO_MODELS, &ParseOptions::default()).unwrap();
        let first = &structure.models[0].residues.key;
        let second = &structure.models[1].residues.key;

        assert_eq!(first, second);
        assert_ne!(first[1], first[2]);
        assert_eq!(structure.models[0].entities.data_index, vec![0]);
    }

    #[test]
    fn options_filter_models() {
        let options = ParseOptions::builder().models(vec![2]).build().unwrap();
        let structure = parse_cif(TWO_MODELS, &options).unwrap();
        assert_eq!(structure.models.len(), 1);
        assert_eq!(structure.models[0].id, 2);
    }

    #[test]
    fn empty_atom_site_yields_no_models() {
        let structure = parse_cif(
            "data_empty\nloop_\n_atom_site.id\n_atom_site.label_entity_id\n",
            &ParseOptions::default(),
        )
        .unwrap();
        assert_eq!(structure.id, "empty");
        assert!(structure.models.is_empty());
    }

    #[test]
    fn missing_data_block_is_fatal() {
        let result = parse_cif("# nothing here\n", &ParseOptions::default());
        assert!(matches!(result, Err(ParseError::MissingDataBlock)));
    }

    #[test]
    fn unknown_requested_block_is_fatal() {
        let options = ParseOptions::builder().block("9XYZ").build().unwrap();
        let result = parse_cif(TWO_MODELS, &options);
        assert!(matches!(result, Err(ParseError::UnknownDataBlock(name)) if name == "9XYZ"));
    }

    #[test]
    fn syntax_errors_carry_their_line() {
        let result = parse_cif("data_x\n_atom_site.id 'open\n", &ParseOptions::default());
        assert!(matches!(
            result,
            Err(ParseError::Syntax(CifError::UnterminatedQuote { line: 2 }))
        ));
    }

    #[test]
    fn requested_block_is_selected_by_name() {
        let text = format!("data_first\n_cell.length_a 1.0\n{TWO_MODELS}");
        let options = ParseOptions::builder().block("1abc").build().unwrap();
        let structure = parse_cif(&text, &options).unwrap();
        assert_eq!(structure.id, "1ABC");
        assert_eq!(structure.models.len(), 2);
    }
}
