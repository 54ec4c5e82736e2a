//! Section decoders: turn the raw lines of one section into typed records.
//!
//! Decoding never fails. Lines that cannot produce a record are recorded in
//! the [`ParseReport`] and otherwise ignored, so hand-edited files with stray
//! or truncated lines still load.

use super::lexer::{COMMENT_MARKER, ClassifiedLines, RawLine, RawSection};
use super::report::{ParseReport, SkipReason};
use crate::core::models::atom::{Atom, AtomTable};
use crate::core::models::ids::AtomId;
use crate::core::models::schema::{AtomField, AtomSchema};
use crate::core::models::system::{MoleculeTopology, MoleculeType, Section};
use crate::core::models::topology::{BondedTerm, TermKind};
use std::str::FromStr;
use tracing::{debug, warn};

const ATOM_REF_COLUMNS: [&str; 4] = ["ai", "aj", "ak", "al"];

/// Builds the typed model from classified lines.
pub fn decode_topology(classified: &ClassifiedLines, report: &mut ParseReport) -> MoleculeTopology {
    report.orphan_lines += classified.orphans.len();

    let mut topology = MoleculeTopology::new();
    for raw in &classified.sections {
        if let Some(section) = decode_section(raw, report) {
            debug!(section = %raw.name, lines = raw.lines.len(), "Decoded section.");
            topology.push(section);
        }
    }
    topology
}

/// Decodes one section according to its name. Unknown names are kept as
/// opaque line lists.
///
/// Returns `None` only for a `[ moleculetype ]` section without a usable
/// record.
pub fn decode_section(raw: &RawSection, report: &mut ParseReport) -> Option<Section> {
    match raw.name.as_str() {
        "moleculetype" => decode_moleculetype(&raw.lines, report).map(Section::MoleculeType),
        "atoms" => Some(Section::Atoms(decode_atoms(&raw.lines, report))),
        name => match name.parse::<TermKind>() {
            Ok(kind) => Some(Section::Terms {
                kind,
                terms: decode_terms(kind, &raw.lines, report),
            }),
            Err(_) => Some(Section::Opaque {
                name: raw.name.clone(),
                lines: raw.lines.iter().map(|l| l.content.clone()).collect(),
            }),
        },
    }
}

/// Decodes `[ moleculetype ]`.
///
/// With a leading legend line, values pair with legend names by position;
/// otherwise the first two tokens are `name` and `nrexcl`. Lines after the
/// record are reported as surplus.
pub fn decode_moleculetype(lines: &[RawLine], report: &mut ParseReport) -> Option<MoleculeType> {
    const SECTION: &str = "moleculetype";

    let first = lines.first()?;
    let (record, consumed) = match first.content.strip_prefix(COMMENT_MARKER) {
        Some(legend) => {
            let data = lines.get(1)?;
            (moleculetype_from_legend(legend, data, report), 2)
        }
        None => (moleculetype_positional(first, report), 1),
    };

    for extra in lines.iter().skip(consumed) {
        report.skip(SECTION, extra.number, SkipReason::Surplus);
    }
    record
}

fn moleculetype_from_legend(
    legend: &str,
    data: &RawLine,
    report: &mut ParseReport,
) -> Option<MoleculeType> {
    let (values, _) = split_comment(&data.content);
    let mut name = None;
    let mut nrexcl = None;
    for (header, value) in legend.split_whitespace().zip(values.split_whitespace()) {
        match header.to_ascii_lowercase().as_str() {
            "name" | "molname" | "moleculename" | "molecule" => name = Some(value),
            "nrexcl" => nrexcl = Some(value),
            _ => {}
        }
    }

    let Some(name) = name else {
        report.skip("moleculetype", data.number, SkipReason::MissingField("name"));
        return None;
    };
    let Some(nrexcl) = nrexcl else {
        report.skip("moleculetype", data.number, SkipReason::MissingField("nrexcl"));
        return None;
    };
    build_moleculetype(name, nrexcl, data.number, report)
}

fn moleculetype_positional(data: &RawLine, report: &mut ParseReport) -> Option<MoleculeType> {
    let (values, _) = split_comment(&data.content);
    let tokens: Vec<&str> = values.split_whitespace().collect();
    if tokens.len() < 2 {
        report.skip(
            "moleculetype",
            data.number,
            SkipReason::TooFewTokens {
                required: 2,
                found: tokens.len(),
            },
        );
        return None;
    }
    build_moleculetype(tokens[0], tokens[1], data.number, report)
}

fn build_moleculetype(
    name: &str,
    nrexcl: &str,
    line: usize,
    report: &mut ParseReport,
) -> Option<MoleculeType> {
    match nrexcl.parse::<u32>() {
        Ok(nrexcl) => Some(MoleculeType::new(name, nrexcl)),
        Err(_) => {
            report.skip(
                "moleculetype",
                line,
                SkipReason::InvalidValue {
                    field: "nrexcl",
                    value: nrexcl.to_string(),
                },
            );
            None
        }
    }
}

/// Decodes `[ atoms ]` into a table keyed by atom id.
///
/// The first comment line, if any, is read as a column legend; a legend that
/// does not name all eight columns falls back to the default
/// `nr type resi res atom cgnr charge mass`. Lines with fewer data tokens than
/// the schema has columns are skipped, as are lines whose numeric columns do
/// not parse. Text after an inline `;` becomes the atom's comment.
pub fn decode_atoms(lines: &[RawLine], report: &mut ParseReport) -> AtomTable {
    const SECTION: &str = "atoms";

    let schema = atom_schema(lines);
    let mut table = AtomTable::new();

    for line in lines.iter().filter(|l| !l.is_comment()) {
        let (data, comment) = split_comment(&line.content);
        let tokens: Vec<&str> = data.split_whitespace().collect();
        if tokens.len() < schema.len() {
            report.skip(
                SECTION,
                line.number,
                SkipReason::TooFewTokens {
                    required: schema.len(),
                    found: tokens.len(),
                },
            );
            continue;
        }

        match build_atom(&schema, &tokens, comment) {
            Ok(atom) => {
                let surplus = tokens.len() - schema.len();
                if surplus > 0 {
                    debug!(line = line.number, surplus, "Ignoring extra atom columns.");
                    report.ignore_columns(SECTION, line.number, surplus);
                }
                let id = atom.nr;
                if table.insert(atom).is_some() {
                    report.skip(SECTION, line.number, SkipReason::DuplicateAtom(id));
                }
            }
            Err(reason) => report.skip(SECTION, line.number, reason),
        }
    }

    table
}

fn atom_schema(lines: &[RawLine]) -> AtomSchema {
    let Some(legend_line) = lines.iter().find(|l| l.is_comment()) else {
        return AtomSchema::default();
    };
    let legend = legend_line.content[COMMENT_MARKER.len_utf8()..]
        .split(COMMENT_MARKER)
        .next()
        .unwrap_or_default();
    if legend.trim().is_empty() {
        return AtomSchema::default();
    }
    AtomSchema::from_legend(legend).unwrap_or_else(|| {
        warn!(
            line = legend_line.number,
            "Atom legend '{}' does not name every column; using the default schema.",
            legend.trim()
        );
        AtomSchema::default()
    })
}

fn build_atom(schema: &AtomSchema, tokens: &[&str], comment: Option<&str>) -> Result<Atom, SkipReason> {
    Ok(Atom {
        nr: parse_column(schema, tokens, AtomField::Nr)?,
        atom_type: column(schema, tokens, AtomField::Type)?.to_string(),
        resi: parse_column(schema, tokens, AtomField::Resi)?,
        res: column(schema, tokens, AtomField::Res)?.to_string(),
        name: column(schema, tokens, AtomField::Atom)?.to_string(),
        cgnr: parse_column(schema, tokens, AtomField::Cgnr)?,
        charge: parse_column(schema, tokens, AtomField::Charge)?,
        mass: parse_column(schema, tokens, AtomField::Mass)?,
        comment: comment.map(str::to_string),
    })
}

fn column<'a>(schema: &AtomSchema, tokens: &[&'a str], field: AtomField) -> Result<&'a str, SkipReason> {
    schema
        .position(field)
        .and_then(|pos| tokens.get(pos).copied())
        .ok_or(SkipReason::MissingField(field.name()))
}

fn parse_column<T: FromStr>(
    schema: &AtomSchema,
    tokens: &[&str],
    field: AtomField,
) -> Result<T, SkipReason> {
    let token = column(schema, tokens, field)?;
    token.parse().map_err(|_| SkipReason::InvalidValue {
        field: field.name(),
        value: token.to_string(),
    })
}

/// Data tokens a line of the given section must provide.
///
/// Angles need their function code, so a three-token angle line is skipped.
fn required_tokens(kind: TermKind) -> usize {
    kind.arity() + 1
}

/// Parameters captured after the function code; `None` keeps them all.
fn parameter_limit(kind: TermKind) -> Option<usize> {
    match kind {
        TermKind::Bond | TermKind::Angle => Some(2),
        TermKind::Pair => Some(0),
        TermKind::Dihedral => None,
    }
}

/// Decodes `[ bonds ]`, `[ pairs ]`, `[ angles ]` or `[ dihedrals ]`.
///
/// Tokens beyond the captured parameters, followed by any inline comment, are
/// kept verbatim as the term's comment so they survive re-serialization.
pub fn decode_terms(kind: TermKind, lines: &[RawLine], report: &mut ParseReport) -> Vec<BondedTerm> {
    let section = kind.section_name();
    let required = required_tokens(kind);
    let arity = kind.arity();

    let mut terms = Vec::new();
    for line in lines.iter().filter(|l| !l.is_comment()) {
        let (data, inline) = split_comment(&line.content);
        let tokens: Vec<&str> = data.split_whitespace().collect();
        if tokens.len() < required {
            report.skip(
                section,
                line.number,
                SkipReason::TooFewTokens {
                    required,
                    found: tokens.len(),
                },
            );
            continue;
        }

        let atoms: Result<Vec<AtomId>, SkipReason> = tokens[..arity]
            .iter()
            .zip(ATOM_REF_COLUMNS)
            .map(|(token, field)| {
                token
                    .parse::<AtomId>()
                    .ok()
                    .filter(|id| id.get() > 0)
                    .ok_or_else(|| SkipReason::InvalidValue {
                        field,
                        value: token.to_string(),
                    })
            })
            .collect();
        let atoms = match atoms {
            Ok(atoms) => atoms,
            Err(reason) => {
                report.skip(section, line.number, reason);
                continue;
            }
        };

        let params_start = arity + 1;
        let params_end = match parameter_limit(kind) {
            Some(limit) => tokens.len().min(params_start + limit),
            None => tokens.len(),
        };

        terms.push(BondedTerm {
            atoms,
            funct: tokens[arity].to_string(),
            parameters: tokens[params_start..params_end]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            comment: trailing_text(&tokens[params_end..], inline),
        });
    }
    terms
}

/// Splits a line at the first comment marker. An empty comment is `None`.
fn split_comment(line: &str) -> (&str, Option<&str>) {
    match line.split_once(COMMENT_MARKER) {
        Some((data, comment)) => {
            let comment = comment.trim();
            (data, (!comment.is_empty()).then_some(comment))
        }
        None => (line, None),
    }
}

fn trailing_text(extra: &[&str], inline: Option<&str>) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    if !extra.is_empty() {
        parts.push(extra.join(" "));
    }
    if let Some(comment) = inline {
        parts.push(format!("{} {}", COMMENT_MARKER, comment));
    }
    (!parts.is_empty()).then(|| parts.join(" "))
}
