use super::ids::AtomId;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The bonded-interaction sections that reference atoms by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TermKind {
    Bond,
    Pair,
    Angle,
    Dihedral,
}

#[derive(Debug, Error)]
#[error("Unknown bonded section name")]
pub struct ParseTermKindError;

impl TermKind {
    pub const ALL: [TermKind; 4] = [
        TermKind::Bond,
        TermKind::Pair,
        TermKind::Angle,
        TermKind::Dihedral,
    ];

    /// Number of atom references per term.
    pub fn arity(self) -> usize {
        match self {
            TermKind::Bond | TermKind::Pair => 2,
            TermKind::Angle => 3,
            TermKind::Dihedral => 4,
        }
    }

    /// The section header name used in topology files.
    pub fn section_name(self) -> &'static str {
        match self {
            TermKind::Bond => "bonds",
            TermKind::Pair => "pairs",
            TermKind::Angle => "angles",
            TermKind::Dihedral => "dihedrals",
        }
    }
}

impl FromStr for TermKind {
    type Err = ParseTermKindError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bonds" => Ok(Self::Bond),
            "pairs" => Ok(Self::Pair),
            "angles" => Ok(Self::Angle),
            "dihedrals" => Ok(Self::Dihedral),
            _ => Err(ParseTermKindError),
        }
    }
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section_name())
    }
}

/// A bond, pair, angle or dihedral record.
///
/// The function code and parameters are carried as text; they are moved,
/// never interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct BondedTerm {
    pub atoms: Vec<AtomId>, // ai, aj[, ak[, al]]
    pub funct: String,
    pub parameters: Vec<String>,
    pub comment: Option<String>, // trailing text written after the data columns
}

impl BondedTerm {
    pub fn new(atoms: Vec<AtomId>, funct: &str) -> Self {
        Self {
            atoms,
            funct: funct.to_string(),
            parameters: Vec::new(),
            comment: None,
        }
    }

    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }

    pub fn contains(&self, atom_id: AtomId) -> bool {
        self.atoms.contains(&atom_id)
    }

    pub fn references_any<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(AtomId) -> bool,
    {
        self.atoms.iter().any(|&id| predicate(id))
    }
}
