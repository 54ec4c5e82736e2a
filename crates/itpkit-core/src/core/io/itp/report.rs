use crate::core::models::ids::AtomId;
use std::fmt;

/// Why a line did not produce a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer data tokens than the section requires.
    TooFewTokens { required: usize, found: usize },
    /// A token could not be parsed as the column's declared kind.
    InvalidValue { field: &'static str, value: String },
    /// The atom replaced an earlier record with the same id.
    DuplicateAtom(AtomId),
    /// A required column was not named by the section legend.
    MissingField(&'static str),
    /// A line after the single data line of `[ moleculetype ]`.
    Surplus,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::TooFewTokens { required, found } => {
                write!(f, "expected at least {} tokens, found {}", required, found)
            }
            SkipReason::InvalidValue { field, value } => {
                write!(f, "invalid value '{}' for column '{}'", value, field)
            }
            SkipReason::DuplicateAtom(id) => write!(f, "duplicate atom id {}", id),
            SkipReason::MissingField(field) => write!(f, "no value for column '{}'", field),
            SkipReason::Surplus => write!(f, "unexpected extra line"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub section: String,
    pub line: usize,
    pub reason: SkipReason,
}

/// A line that was decoded but carried columns beyond its schema, such as
/// the B-state `typeB chargeB massB` columns of a perturbed atom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredColumns {
    pub section: String,
    pub line: usize,
    pub count: usize,
}

/// Everything the lenient decoders chose to ignore while reading a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub skipped: Vec<SkippedLine>,
    /// Number of data lines that appeared outside any section.
    pub orphan_lines: usize,
    /// Lines kept without their surplus columns. These do not make a report
    /// unclean.
    pub ignored_columns: Vec<IgnoredColumns>,
}

impl ParseReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip(&mut self, section: &str, line: usize, reason: SkipReason) {
        self.skipped.push(SkippedLine {
            section: section.to_string(),
            line,
            reason,
        });
    }

    pub fn ignore_columns(&mut self, section: &str, line: usize, count: usize) {
        self.ignored_columns.push(IgnoredColumns {
            section: section.to_string(),
            line,
            count,
        });
    }

    pub fn skipped_in(&self, section: &str) -> usize {
        self.skipped.iter().filter(|s| s.section == section).count()
    }

    pub fn total_skipped(&self) -> usize {
        self.skipped.len()
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.orphan_lines == 0
    }

    /// Section names with at least one skipped line, in first-seen order.
    pub fn sections_with_skips(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for skipped in &self.skipped {
            if !names.contains(&skipped.section.as_str()) {
                names.push(&skipped.section);
            }
        }
        names
    }
}
