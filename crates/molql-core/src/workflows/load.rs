use super::progress::{Progress, ProgressReporter};
use crate::core::config::ParseOptions;
use crate::core::io::mmcif::MmcifFile;
use crate::core::io::traits::StructureFile;
use crate::core::models::structure::Structure;
use crate::core::parser::ParseError;
use std::path::Path;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse '{path}': {source}")]
    Parse { path: String, source: ParseError },
}

/// Reads an mmCIF file and parses the data block selected by `options`.
#[instrument(skip_all, name = "load_workflow", fields(path = %path.display()))]
pub fn run(
    path: &Path,
    options: &ParseOptions,
    reporter: &ProgressReporter,
) -> Result<Structure, LoadError> {
    let path_str = || path.to_string_lossy().to_string();

    reporter.report(Progress::PhaseStart { name: "Reading" });
    let bytes = std::fs::read(path).map_err(|e| LoadError::Io {
        path: path_str(),
        source: e,
    })?;
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart {
        name: "Building models",
    });
    let structure =
        MmcifFile::read_from(&mut bytes.as_slice(), options).map_err(|e| LoadError::Parse {
            path: path_str(),
            source: e,
        })?;
    reporter.report(Progress::PhaseFinish);

    let atoms: usize = structure.models.iter().map(|m| m.atoms.count).sum();
    info!(
        structure = %structure.id,
        models = structure.models.len(),
        atoms,
        "Loaded structure."
    );
    reporter.report(Progress::Message(format!(
        "Loaded {} with {} model(s)",
        structure.id,
        structure.models.len()
    )));

    Ok(structure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::tempdir;

    const MINIMAL: &str = "\
data_1XYZ
loop_
_atom_site.label_entity_id
_atom_site.auth_asym_id
_atom_site.auth_seq_id
1 A 1
1 A 2
";

    #[test]
    fn loads_structure_and_reports_phases() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("1xyz.cif");
        fs::write(&path, MINIMAL).unwrap();

        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::PhaseStart { name } = event {
                events.lock().unwrap().push(name);
            }
        }));

        let structure = run(&path, &ParseOptions::default(), &reporter).unwrap();
        assert_eq!(structure.id, "1XYZ");
        assert_eq!(structure.models[0].residues.count, 2);
        drop(reporter);
        assert_eq!(
            events.into_inner().unwrap(),
            vec!["Reading", "Building models"]
        );
    }

    #[test]
    fn missing_file_reports_io_error_with_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.cif");

        let result = run(&path, &ParseOptions::default(), &ProgressReporter::new());
        match result {
            Err(LoadError::Io { path: reported, .. }) => assert!(reported.ends_with("absent.cif")),
            other => panic!("expected I/O error, got {other:?}"),
        }
    }

    #[test]
    fn non_utf8_file_reports_parse_error_with_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("binary.cif");
        fs::write(&path, [b'd', b'a', b't', b'a', b'_', 0xff, 0xfe]).unwrap();

        let result = run(&path, &ParseOptions::default(), &ProgressReporter::new());
        match result {
            Err(LoadError::Parse {
                path: reported,
                source: ParseError::Io(_),
            }) => assert!(reported.ends_with("binary.cif")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.cif");
        fs::write(&path, "data_bad\n_atom_site.id \"open\n").unwrap();

        let result = run(&path, &ParseOptions::default(), &ProgressReporter::new());
        assert!(matches!(
            result,
            Err(LoadError::Parse {
                source: ParseError::Syntax(_),
                ..
            })
        ));
    }
}
