use phf::{Map, phf_map};
use std::fmt;

/// A column of the `[ atoms ]` section.
///
/// `nr`, `resi` and `cgnr` parse as integers, `charge` and `mass` as floats,
/// the rest are kept as text. A token that fails its parse skips the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtomField {
    Nr,
    Type,
    Resi,
    Res,
    Atom,
    Cgnr,
    Charge,
    Mass,
}

impl AtomField {
    pub const ALL: [AtomField; 8] = [
        AtomField::Nr,
        AtomField::Type,
        AtomField::Resi,
        AtomField::Res,
        AtomField::Atom,
        AtomField::Cgnr,
        AtomField::Charge,
        AtomField::Mass,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AtomField::Nr => "nr",
            AtomField::Type => "type",
            AtomField::Resi => "resi",
            AtomField::Res => "res",
            AtomField::Atom => "atom",
            AtomField::Cgnr => "cgnr",
            AtomField::Charge => "charge",
            AtomField::Mass => "mass",
        }
    }

    /// Resolves a legend column name, accepting the spellings used by common
    /// topology generators. Matching is case-insensitive.
    pub fn from_legend_name(name: &str) -> Option<Self> {
        LEGEND_ALIASES
            .get(name.trim().to_ascii_lowercase().as_str())
            .copied()
    }
}

impl fmt::Display for AtomField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

static LEGEND_ALIASES: Map<&'static str, AtomField> = phf_map! {
    "nr" => AtomField::Nr, "id" => AtomField::Nr,
    "type" => AtomField::Type,
    "resi" => AtomField::Resi, "resnr" => AtomField::Resi, "resid" => AtomField::Resi,
    "res" => AtomField::Res, "residue" => AtomField::Res, "resname" => AtomField::Res, "resnm" => AtomField::Res,
    "atom" => AtomField::Atom, "atomname" => AtomField::Atom,
    "cgnr" => AtomField::Cgnr,
    "charge" => AtomField::Charge, "q" => AtomField::Charge,
    "mass" => AtomField::Mass,
};

/// Ordered list of columns for an `[ atoms ]` section.
///
/// Positions without a recognised name are kept as `None` so that the
/// minimum-length guard still counts them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomSchema {
    columns: Vec<Option<AtomField>>,
}

impl Default for AtomSchema {
    fn default() -> Self {
        Self {
            columns: AtomField::ALL.iter().copied().map(Some).collect(),
        }
    }
}

impl AtomSchema {
    /// Builds a schema from the body of a legend line (text after the leading
    /// comment marker, up to any second marker).
    ///
    /// Returns `None` unless every [`AtomField`] is named exactly once.
    pub fn from_legend(legend: &str) -> Option<Self> {
        let columns: Vec<Option<AtomField>> = legend
            .split_whitespace()
            .map(AtomField::from_legend_name)
            .collect();

        let complete = AtomField::ALL
            .iter()
            .all(|field| columns.iter().filter(|c| **c == Some(*field)).count() == 1);
        complete.then_some(Self { columns })
    }

    /// Number of columns a data line must provide.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn position(&self, field: AtomField) -> Option<usize> {
        self.columns.iter().position(|c| *c == Some(field))
    }

    pub fn columns(&self) -> &[Option<AtomField>] {
        &self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schema_has_the_eight_standard_columns_in_order() {
        let schema = AtomSchema::default();
        assert_eq!(schema.len(), 8);
        assert_eq!(schema.position(AtomField::Nr), Some(0));
        assert_eq!(schema.position(AtomField::Charge), Some(6));
        assert_eq!(schema.position(AtomField::Mass), Some(7));
    }

    #[test]
    fn legend_with_generator_spellings_resolves() {
        let schema =
            AtomSchema::from_legend("nr type resnr residue atom cgnr charge mass").unwrap();
        assert_eq!(schema.position(AtomField::Resi), Some(2));
        assert_eq!(schema.position(AtomField::Res), Some(3));
    }

    #[test]
    fn legend_with_reordered_and_extra_columns_keeps_positions() {
        let schema =
            AtomSchema::from_legend("nr type resi res atom cgnr mass charge typeB").unwrap();
        assert_eq!(schema.len(), 9);
        assert_eq!(schema.position(AtomField::Mass), Some(6));
        assert_eq!(schema.position(AtomField::Charge), Some(7));
        assert_eq!(schema.columns()[8], None);
    }

    #[test]
    fn incomplete_legend_is_rejected() {
        assert!(AtomSchema::from_legend("nr type charge").is_none());
        assert!(AtomSchema::from_legend("").is_none());
    }

    #[test]
    fn duplicated_column_is_rejected() {
        assert!(AtomSchema::from_legend("nr nr type resi res atom cgnr charge mass").is_none());
    }

    #[test]
    fn legend_names_are_case_insensitive() {
        assert_eq!(AtomField::from_legend_name("CHARGE"), Some(AtomField::Charge));
        assert_eq!(AtomField::from_legend_name("ResNr"), Some(AtomField::Resi));
        assert_eq!(AtomField::from_legend_name("typeB"), None);
    }
}
