use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use itpkit::core::io::itp::{ItpFile, ParseReport};
use itpkit::core::io::traits::TopologyFile;
use itpkit::core::models::system::MoleculeTopology;
use itpkit::core::models::topology::TermKind;
use std::fmt::{self, Write};
use tracing::info;

pub fn run(args: InspectArgs) -> Result<()> {
    info!("Loading topology from {:?}", &args.input);
    let (topology, report) =
        ItpFile::read_from_path(&args.input).map_err(|e| CliError::FileParsing {
            path: args.input.clone(),
            source: e.into(),
        })?;

    let summary = render_summary(&topology, &report, args.skipped)
        .map_err(|e| CliError::Other(e.into()))?;
    print!("{}", summary);
    Ok(())
}

fn render_summary(
    topology: &MoleculeTopology,
    report: &ParseReport,
    list_skipped: bool,
) -> std::result::Result<String, fmt::Error> {
    let mut out = String::new();

    match topology.molecule_type() {
        Some(molecule) => {
            writeln!(out, "Molecule:        {} (nrexcl {})", molecule.name, molecule.nrexcl)?;
        }
        None => {
            writeln!(out, "Molecule:        <none>")?;
        }
    }

    let total_charge = topology.atoms().map_or(0.0, |atoms| atoms.total_charge());
    writeln!(out, "Atoms:           {}", topology.atom_count())?;
    writeln!(out, "Total charge:    {:.6}", display_charge(total_charge))?;

    for kind in TermKind::ALL {
        let count = topology.terms(kind).map_or(0, <[_]>::len);
        writeln!(out, "{:<17}{}", format!("{}:", capitalize(kind.section_name())), count)?;
    }

    let opaque: Vec<&str> = topology.opaque_sections().map(|(name, _)| name).collect();
    if !opaque.is_empty() {
        writeln!(out, "Other sections:  {}", opaque.join(", "))?;
    }

    writeln!(out, "Skipped lines:   {}", report.total_skipped())?;
    if report.orphan_lines > 0 {
        writeln!(out, "Orphan lines:    {}", report.orphan_lines)?;
    }
    if !report.ignored_columns.is_empty() {
        writeln!(out, "Extra columns:   {} line(s)", report.ignored_columns.len())?;
    }

    if list_skipped {
        for skipped in &report.skipped {
            writeln!(
                out,
                "  line {} [ {} ]: {}",
                skipped.line, skipped.section, skipped.reason
            )?;
        }
        for ignored in &report.ignored_columns {
            writeln!(
                out,
                "  line {} [ {} ]: {} extra column(s) dropped",
                ignored.line, ignored.section, ignored.count
            )?;
        }
    }

    Ok(out)
}

/// Rounds away float noise so a neutral molecule does not print as `-0.000000`.
fn display_charge(charge: f64) -> f64 {
    if charge.abs() < 5e-7 { 0.0 } else { charge }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
