use crate::core::io::itp::{ItpFile, OpaquePolicy, ParseReport};
use crate::core::io::traits::TopologyFile;
use crate::core::models::system::MoleculeTopology;
use crate::engine::config::{Normalization, TrimConfig};
use crate::engine::error::EngineError;
use crate::engine::transform::{self, IdMapping, TrimStats, Trimmed};
use std::path::Path;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct TrimSummary {
    pub report: ParseReport,
    pub stats: TrimStats,
    pub mapping: IdMapping,
    pub atoms_before: usize,
    pub atoms_after: usize,
}

/// Reads `input`, deletes the configured atoms, and writes the result to `output`.
///
/// The output file is replaced only after the whole topology was encoded, so a
/// failed run leaves any existing `output` untouched. `input` and `output` may
/// be the same path.
///
/// # Errors
///
/// Returns [`EngineError::Read`] or [`EngineError::Write`] for file failures and
/// the errors of [`trim`] for the transform itself.
pub fn run(input: &Path, output: &Path, config: &TrimConfig) -> Result<TrimSummary, EngineError> {
    prepare(input, config)?.commit(output, config)
}

/// A trimmed topology that has not been written yet.
///
/// Lets callers persist side outputs, such as the id mapping, before the
/// destination file is replaced.
#[derive(Debug, Clone)]
pub struct PendingTrim {
    topology: MoleculeTopology,
    summary: TrimSummary,
}

impl PendingTrim {
    pub fn topology(&self) -> &MoleculeTopology {
        &self.topology
    }

    pub fn summary(&self) -> &TrimSummary {
        &self.summary
    }

    /// Writes the topology atomically to `output`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Write`] if the file cannot be written or replaced.
    #[instrument(skip_all, name = "trim_commit")]
    pub fn commit(self, output: &Path, config: &TrimConfig) -> Result<TrimSummary, EngineError> {
        info!(path = %output.display(), "Writing topology.");
        ItpFile::write_to_path(&self.topology, &config.write, output).map_err(|source| {
            EngineError::Write {
                path: output.to_path_buf(),
                source,
            }
        })?;

        info!(
            "Trimmed topology from {} to {} atoms.",
            self.summary.atoms_before, self.summary.atoms_after
        );
        Ok(self.summary)
    }
}

/// Reads `input` and applies the configured deletion without writing anything.
///
/// # Errors
///
/// Returns [`EngineError::Read`] if the file cannot be read and the errors of
/// [`trim`] for the transform itself.
#[instrument(skip_all, name = "trim_workflow")]
pub fn prepare(input: &Path, config: &TrimConfig) -> Result<PendingTrim, EngineError> {
    info!(path = %input.display(), "Reading topology.");
    let (topology, report) =
        ItpFile::read_from_path(input).map_err(|source| EngineError::Read {
            path: input.to_path_buf(),
            source,
        })?;
    log_report(&report);

    let atoms_before = topology.atom_count();
    let trimmed = trim(topology, config)?;
    let atoms_after = trimmed.topology.atom_count();

    Ok(PendingTrim {
        topology: trimmed.topology,
        summary: TrimSummary {
            report,
            stats: trimmed.stats,
            mapping: trimmed.mapping,
            atoms_before,
            atoms_after,
        },
    })
}

/// Applies a [`TrimConfig`] to an in-memory topology.
///
/// # Errors
///
/// Returns [`EngineError::MissingAtoms`] when deletion is requested from a
/// topology without an atoms section and the divisor is derived from the
/// survivors, and [`EngineError::ZeroNormalization`] when no atom would be left
/// to carry the removed charge.
pub fn trim(topology: MoleculeTopology, config: &TrimConfig) -> Result<Trimmed, EngineError> {
    let normalization_count = resolve_normalization(&topology, config)?;
    let trimmed = transform::delete_atoms(topology, &config.atoms_to_delete, normalization_count)?;

    if config.write.opaque_sections == OpaquePolicy::Preserve && !trimmed.mapping.is_identity() {
        for (name, _) in trimmed.topology.opaque_sections() {
            warn!(
                "Section [ {} ] is copied verbatim; atom ids inside it were not renumbered.",
                name
            );
        }
    }
    Ok(trimmed)
}

/// Resolves the divisor for charge redistribution.
pub fn resolve_normalization(
    topology: &MoleculeTopology,
    config: &TrimConfig,
) -> Result<usize, EngineError> {
    match config.normalization {
        Normalization::Fixed(count) => Ok(count),
        Normalization::Survivors => {
            let Some(atoms) = topology.atoms() else {
                return if config.atoms_to_delete.is_empty() {
                    Ok(1)
                } else {
                    Err(EngineError::MissingAtoms)
                };
            };
            if atoms.is_empty() {
                return Ok(1);
            }
            Ok(atoms
                .ids()
                .filter(|id| !config.atoms_to_delete.contains(id))
                .count())
        }
    }
}

fn log_report(report: &ParseReport) {
    for section in report.sections_with_skips() {
        warn!(
            "Skipped {} malformed line(s) in [ {} ].",
            report.skipped_in(section),
            section
        );
    }
    if report.orphan_lines > 0 {
        warn!(
            "Ignored {} line(s) outside of any section.",
            report.orphan_lines
        );
    }
    if !report.ignored_columns.is_empty() {
        info!(
            "Dropped extra columns from {} line(s); they are not written back.",
            report.ignored_columns.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::itp::WriteOptions;
    use crate::core::models::ids::AtomId;
    use crate::core::models::topology::TermKind;
    use crate::engine::config::TrimConfigBuilder;
    use std::fs;
    use tempfile::tempdir;

    const TOLERANCE: f64 = 1e-6;

    const INPUT: &str = "\
[ moleculetype ]
MOL 3

[ atoms ]
     1    CT     1  MOL    C1     1  -0.100  12.011
     2    HC     1  MOL    H1     1   0.050   1.008
     3    OH     1  MOL    O1     2  -0.300  15.999
     4    HO     1  MOL    H2     2   0.350   1.008
     5    HC     1  MOL    H3     1   0.000   1.008
     6    CT     1  MOL    C2     3   oops   12.011

[ bonds ]
     1     2     1   0.1090  284512.0
     1     3     1   0.1410  267776.0
     3     4     1   0.0960  462750.4
     1     5     1   0.1090  284512.0

[ angles ]
     2     1     3     1   107.8   276.144
     1     3     4     1   108.5   460.24

[ exclusions ]
1 4
";

    fn config(ids: &[u32]) -> TrimConfig {
        TrimConfigBuilder::new()
            .atoms_to_delete(ids.iter().copied().map(AtomId::new))
            .build()
            .unwrap()
    }

    fn read(text: &str) -> MoleculeTopology {
        ItpFile::read_from(&mut text.as_bytes()).unwrap().0
    }

    #[test]
    fn run_writes_renumbered_topology_and_conserves_charge() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.itp");
        let output = dir.path().join("out.itp");
        fs::write(&input, INPUT).unwrap();

        let summary = run(&input, &output, &config(&[2])).unwrap();

        assert_eq!(summary.atoms_before, 5);
        assert_eq!(summary.atoms_after, 4);
        assert_eq!(summary.stats.normalization_count, 4);
        assert_eq!(summary.report.skipped_in("atoms"), 1);
        assert_eq!(summary.mapping.get(AtomId::new(5)), Some(AtomId::new(4)));

        let written = fs::read_to_string(&output).unwrap();
        let topology = read(&written);
        let atoms = topology.atoms().unwrap();
        assert_eq!(atoms.len(), 4);
        assert!(atoms.total_charge().abs() < TOLERANCE);

        let bonds = topology.terms(TermKind::Bond).unwrap();
        let refs: Vec<Vec<u32>> = bonds
            .iter()
            .map(|b| b.atoms.iter().map(|id| id.get()).collect())
            .collect();
        assert_eq!(refs, vec![vec![1, 2], vec![2, 3], vec![1, 4]]);
        assert_eq!(topology.terms(TermKind::Angle).unwrap().len(), 1);
        assert!(written.contains("[ exclusions ]\n1 4\n"));
    }

    #[test]
    fn run_can_rewrite_its_input_in_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mol.itp");
        fs::write(&path, INPUT).unwrap();

        run(&path, &path, &config(&[5])).unwrap();
        let topology = read(&fs::read_to_string(&path).unwrap());
        assert_eq!(topology.atom_count(), 3);
    }

    #[test]
    fn prepare_writes_nothing_until_commit() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.itp");
        let output = dir.path().join("out.itp");
        fs::write(&input, INPUT).unwrap();

        let pending = prepare(&input, &config(&[2])).unwrap();
        assert!(!output.exists());
        assert_eq!(pending.summary().atoms_after, 4);
        assert_eq!(pending.topology().atom_count(), 4);
        assert_eq!(
            pending.summary().mapping.get(AtomId::new(3)),
            Some(AtomId::new(2))
        );

        let summary = pending.commit(&output, &config(&[2])).unwrap();
        assert_eq!(summary.atoms_before, 5);
        assert!(output.exists());
    }

    #[test]
    fn missing_input_is_a_read_error() {
        let dir = tempdir().unwrap();
        let result = run(
            &dir.path().join("absent.itp"),
            &dir.path().join("out.itp"),
            &config(&[1]),
        );
        assert!(matches!(result, Err(EngineError::Read { .. })));
        assert!(!dir.path().join("out.itp").exists());
    }

    #[test]
    fn unwritable_output_is_a_write_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.itp");
        fs::write(&input, INPUT).unwrap();
        let result = run(&input, &dir.path().join("no/such/dir/out.itp"), &config(&[1]));
        assert!(matches!(result, Err(EngineError::Write { .. })));
    }

    #[test]
    fn fixed_normalization_is_passed_through() {
        let config = TrimConfigBuilder::new()
            .atoms_to_delete([AtomId::new(3)])
            .normalization(Normalization::Fixed(2))
            .build()
            .unwrap();
        let trimmed = trim(read(INPUT), &config).unwrap();
        assert_eq!(trimmed.stats.normalization_count, 2);
        assert!((trimmed.stats.charge_shift - -0.15).abs() < TOLERANCE);
    }

    #[test]
    fn survivors_count_ignores_missing_ids() {
        let topology = read(INPUT);
        let count = resolve_normalization(&topology, &config(&[1, 42])).unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn deletion_without_atoms_section_fails() {
        let topology = read("[ bonds ]\n1 2 1 0.1 1000.0\n");
        let result = trim(topology, &config(&[1]));
        assert!(matches!(result, Err(EngineError::MissingAtoms)));
    }

    #[test]
    fn empty_deletion_leaves_topology_intact() {
        let topology = read(INPUT);
        let trimmed = trim(topology.clone(), &config(&[])).unwrap();
        assert_eq!(trimmed.topology, topology);
        assert!(trimmed.mapping.is_identity());
    }

    #[test]
    fn deleting_every_atom_has_nothing_to_carry_the_charge() {
        let result = trim(read(INPUT), &config(&[1, 2, 3, 4, 5]));
        assert!(matches!(result, Err(EngineError::ZeroNormalization)));
    }

    #[test]
    fn drop_policy_omits_unknown_sections() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.itp");
        let output = dir.path().join("out.itp");
        fs::write(&input, INPUT).unwrap();

        let config = TrimConfigBuilder::new()
            .atoms_to_delete([AtomId::new(2)])
            .write_options(WriteOptions {
                opaque_sections: OpaquePolicy::Drop,
            })
            .build()
            .unwrap();
        run(&input, &output, &config).unwrap();

        let written = fs::read_to_string(&output).unwrap();
        assert!(!written.contains("exclusions"));
        assert!(written.contains("[ angles ]"));
    }
}
