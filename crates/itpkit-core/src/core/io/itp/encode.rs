//! Section encoders: render typed sections as column-aligned text.
//!
//! Column widths and the fixed precision of charges (6 decimals) and masses
//! (5 decimals) are part of the format consumed by simulation tools and must
//! not change.

use super::lexer::COMMENT_MARKER;
use crate::core::models::atom::{Atom, AtomTable};
use crate::core::models::system::{MoleculeTopology, MoleculeType, Section};
use crate::core::models::topology::{BondedTerm, TermKind};
use phf::{Map, phf_map};
use serde::Deserialize;
use std::io::{self, Write};

static SECTION_LEGENDS: Map<&'static str, &'static str> = phf_map! {
    "moleculetype" => ";name            nrexcl",
    "atoms" => ";   nr  type  resi  res  atom  cgnr     charge      mass       ; qtot   bond_type",
    "bonds" => ";   ai     aj funct   r             k",
    "pairs" => ";   ai     aj    funct",
    "angles" => ";   ai     aj     ak    funct   theta         cth",
    "dihedrals" => ";   ai     aj     ak     al   func   phase     kd      pn",
};

/// What to do with sections that have no schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpaquePolicy {
    /// Re-emit the section verbatim at its original position.
    #[default]
    Preserve,
    /// Leave the section out of the output.
    Drop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WriteOptions {
    pub opaque_sections: OpaquePolicy,
}

/// Writes every section of `topology` in model order.
///
/// Bonded sections without terms are omitted entirely.
pub fn write_topology<W: Write>(
    writer: &mut W,
    topology: &MoleculeTopology,
    options: &WriteOptions,
) -> io::Result<()> {
    for section in topology.sections() {
        match section {
            Section::MoleculeType(molecule) => write_moleculetype(writer, molecule)?,
            Section::Atoms(table) => write_atoms(writer, table)?,
            Section::Terms { kind, terms } => write_terms(writer, *kind, terms)?,
            Section::Opaque { name, lines } => {
                if options.opaque_sections == OpaquePolicy::Preserve {
                    write_opaque(writer, name, lines)?;
                }
            }
        }
    }
    Ok(())
}

fn write_header<W: Write>(writer: &mut W, name: &str) -> io::Result<()> {
    writeln!(writer, "[ {} ]", name)?;
    if let Some(legend) = SECTION_LEGENDS.get(name) {
        writeln!(writer, "{}", legend)?;
    }
    Ok(())
}

pub fn write_moleculetype<W: Write>(writer: &mut W, molecule: &MoleculeType) -> io::Result<()> {
    write_header(writer, "moleculetype")?;
    writeln!(writer, "{}", format_moleculetype(molecule))?;
    writeln!(writer)
}

pub fn write_atoms<W: Write>(writer: &mut W, table: &AtomTable) -> io::Result<()> {
    write_header(writer, "atoms")?;
    for atom in table.iter_by_id() {
        writeln!(writer, "{}", format_atom(atom))?;
    }
    writeln!(writer)
}

pub fn write_terms<W: Write>(writer: &mut W, kind: TermKind, terms: &[BondedTerm]) -> io::Result<()> {
    if terms.is_empty() {
        return Ok(());
    }
    write_header(writer, kind.section_name())?;
    for term in terms {
        writeln!(writer, "{}", format_term(kind, term))?;
    }
    writeln!(writer)
}

fn write_opaque<W: Write>(writer: &mut W, name: &str, lines: &[String]) -> io::Result<()> {
    write_header(writer, name)?;
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    writeln!(writer)
}

pub fn format_moleculetype(molecule: &MoleculeType) -> String {
    format!("{}     {}", molecule.name, molecule.nrexcl)
}

pub fn format_atom(atom: &Atom) -> String {
    let mut line = format!(
        "{:>5} {:>5} {:>5} {:>4} {:>5} {:>5} {:>10.6} {:>10.5}",
        atom.nr, atom.atom_type, atom.resi, atom.res, atom.name, atom.cgnr, atom.charge, atom.mass
    );
    if let Some(comment) = &atom.comment {
        line.push_str(&format!(" {} {}", COMMENT_MARKER, comment));
    }
    line
}

pub fn format_term(kind: TermKind, term: &BondedTerm) -> String {
    let mut line = term
        .atoms
        .iter()
        .map(|id| format!("{:>6}", id))
        .collect::<Vec<_>>()
        .join(" ");

    match kind {
        TermKind::Bond => {
            line.push_str(&format!(" {:>5}", term.funct));
            push_parameters(&mut line, &term.parameters);
        }
        TermKind::Pair => {
            line.push_str(&format!(" {:>7}", term.funct));
            push_parameters(&mut line, &term.parameters);
        }
        TermKind::Angle => {
            line.push_str(&format!(" {:>7}", term.funct));
            push_parameters(&mut line, &term.parameters);
        }
        TermKind::Dihedral => {
            line.push_str(&format!(" {:>5}", term.funct));
            if !term.parameters.is_empty() {
                line.push_str(&format!(" {:>7}", term.parameters.join(" ")));
            }
        }
    }

    if let Some(comment) = &term.comment {
        line.push(' ');
        line.push_str(comment);
    }
    line
}

fn push_parameters(line: &mut String, parameters: &[String]) {
    for parameter in parameters {
        line.push_str(&format!(" {:>12}", parameter));
    }
}
