use crate::cli::TrimArgs;
use crate::config::PartialTrimConfig;
use crate::error::{CliError, Result};
use itpkit::core::io::staging;
use itpkit::engine::transform::IdMapping;
use itpkit::workflows;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
struct MappingFile {
    atoms: Vec<MappingEntry>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
struct MappingEntry {
    old: u32,
    new: u32,
}

impl From<&IdMapping> for MappingFile {
    fn from(mapping: &IdMapping) -> Self {
        Self {
            atoms: mapping
                .iter()
                .map(|(old, new)| MappingEntry {
                    old: old.get(),
                    new: new.get(),
                })
                .collect(),
        }
    }
}

pub fn run(args: TrimArgs) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialTrimConfig::from_file(path)?,
        None => PartialTrimConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args)?;

    println!(
        "Deleting {} atom(s) from {}...",
        config.atoms_to_delete.len(),
        args.input.display()
    );
    let pending = workflows::trim::prepare(&args.input, &config)?;
    if let Some(path) = &args.mapping {
        write_mapping(path, &pending.summary().mapping)?;
    }
    let summary = pending.commit(&args.output, &config)?;

    if !summary.report.is_clean() {
        warn!(
            "{} line(s) of the input were skipped; run 'itpkit inspect --skipped' for details.",
            summary.report.total_skipped() + summary.report.orphan_lines
        );
    }
    if !summary.stats.missing_ids.is_empty() {
        println!(
            "Warning: {} requested atom id(s) were not found and were ignored.",
            summary.stats.missing_ids.len()
        );
    }

    println!(
        "✓ {} -> {} atoms, {} bonded term(s) removed, charge shift {:+.6} per atom over {} atom(s).",
        summary.atoms_before,
        summary.atoms_after,
        summary.stats.total_terms_removed(),
        summary.stats.charge_shift,
        summary.stats.normalization_count
    );
    println!("✓ Topology written to: {}", args.output.display());

    if let Some(path) = &args.mapping {
        println!("✓ Id mapping written to: {}", path.display());
    }

    Ok(())
}

/// Writes the mapping through a temporary file in the destination directory,
/// so a failure leaves any previous mapping file intact.
fn write_mapping(path: &Path, mapping: &IdMapping) -> Result<()> {
    info!("Writing id mapping ({} entries) to {:?}", mapping.len(), path);
    let content =
        toml::to_string(&MappingFile::from(mapping)).map_err(|e| CliError::Other(e.into()))?;

    let mut temp = staging::staging_file(path)?;
    temp.write_all(content.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| CliError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    const INPUT: &str = "\
[ moleculetype ]
MOL 3

[ atoms ]
     1    CT     1  MOL    C1     1  -0.100  12.011
     2    HC     1  MOL    H1     1   0.050   1.008
     3    OH     1  MOL    O1     2  -0.300  15.999
     4    HO     1  MOL    H2     2   0.350   1.008

[ bonds ]
     1     2     1   0.1090  284512.0
     1     3     1   0.1410  267776.0
     3     4     1   0.0960  462750.4
";

    fn trim_args(args: &[&str]) -> TrimArgs {
        let mut argv = vec!["itpkit", "trim"];
        argv.extend_from_slice(args);
        match Cli::parse_from(argv).command {
            Commands::Trim(args) => args,
            _ => panic!("Expected 'trim' subcommand"),
        }
    }

    #[test]
    fn trim_writes_topology_and_mapping() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.itp");
        let output = dir.path().join("out.itp");
        let mapping = dir.path().join("map.toml");
        fs::write(&input, INPUT).unwrap();

        let args = trim_args(&[
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "-d",
            "2",
            "--mapping",
            mapping.to_str().unwrap(),
        ]);
        run(args).unwrap();

        let written = fs::read_to_string(&output).unwrap();
        assert!(written.contains("[ atoms ]"));
        assert!(!written.contains("H1"));

        let parsed: MappingFile = toml::from_str(&fs::read_to_string(&mapping).unwrap()).unwrap();
        assert_eq!(
            parsed.atoms,
            vec![
                MappingEntry { old: 1, new: 1 },
                MappingEntry { old: 3, new: 2 },
                MappingEntry { old: 4, new: 3 },
            ]
        );
    }

    #[test]
    fn failed_mapping_write_leaves_output_untouched() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.itp");
        let output = dir.path().join("out.itp");
        fs::write(&input, INPUT).unwrap();
        fs::write(&output, "previous").unwrap();
        let mapping = dir.path().join("missing-dir").join("map.toml");

        let args = trim_args(&[
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "-d",
            "2",
            "--mapping",
            mapping.to_str().unwrap(),
        ]);
        assert!(matches!(run(args), Err(CliError::Io(_))));
        assert_eq!(fs::read_to_string(&output).unwrap(), "previous");
        assert!(!mapping.exists());
    }

    #[cfg(unix)]
    #[test]
    fn mapping_file_keeps_permissions_of_replaced_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let input = dir.path().join("in.itp");
        let output = dir.path().join("out.itp");
        let mapping = dir.path().join("map.toml");
        fs::write(&input, INPUT).unwrap();
        fs::write(&mapping, "").unwrap();
        fs::set_permissions(&mapping, fs::Permissions::from_mode(0o644)).unwrap();

        let args = trim_args(&[
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "-d",
            "1",
            "--mapping",
            mapping.to_str().unwrap(),
        ]);
        run(args).unwrap();

        let mode = fs::metadata(&mapping).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[test]
    fn trim_reports_missing_input_as_core_error() {
        let dir = tempdir().unwrap();
        let args = trim_args(&[
            "-i",
            dir.path().join("absent.itp").to_str().unwrap(),
            "-o",
            dir.path().join("out.itp").to_str().unwrap(),
            "-d",
            "1",
        ]);
        assert!(matches!(run(args), Err(CliError::Core(_))));
    }

    #[test]
    fn trim_reads_selection_from_config_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.itp");
        let output = dir.path().join("out.itp");
        let config = dir.path().join("trim.toml");
        fs::write(&input, INPUT).unwrap();
        fs::write(&config, "[selection]\ndelete = [\"3-4\"]\n").unwrap();

        let args = trim_args(&[
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "-c",
            config.to_str().unwrap(),
        ]);
        run(args).unwrap();

        let written = fs::read_to_string(&output).unwrap();
        assert!(!written.contains("O1"));
        assert!(written.contains("C1"));
    }
}
