use super::atom::AtomTable;
use super::topology::{BondedTerm, TermKind};

/// The `[ moleculetype ]` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoleculeType {
    pub name: String,
    /// Number of bonds over which non-bonded interactions are excluded.
    pub nrexcl: u32,
}

impl MoleculeType {
    pub fn new(name: &str, nrexcl: u32) -> Self {
        Self {
            name: name.to_string(),
            nrexcl,
        }
    }
}

/// One decoded section of a topology file.
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    MoleculeType(MoleculeType),
    Atoms(AtomTable),
    Terms {
        kind: TermKind,
        terms: Vec<BondedTerm>,
    },
    /// A section without a schema, kept as its raw data lines.
    Opaque { name: String, lines: Vec<String> },
}

impl Section {
    pub fn name(&self) -> &str {
        match self {
            Section::MoleculeType(_) => "moleculetype",
            Section::Atoms(_) => "atoms",
            Section::Terms { kind, .. } => kind.section_name(),
            Section::Opaque { name, .. } => name,
        }
    }
}

/// A single molecule definition: its sections in the order they first
/// appeared in the source file.
///
/// Each section name occurs at most once; [`MoleculeTopology::push`]
/// replaces an existing section of the same name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoleculeTopology {
    sections: Vec<Section>,
}

impl MoleculeTopology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a section, or replaces the section that has the same name
    /// while keeping its position.
    pub fn push(&mut self, section: Section) {
        match self.sections.iter().position(|s| s.name() == section.name()) {
            Some(pos) => self.sections[pos] = section,
            None => self.sections.push(section),
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn sections_mut(&mut self) -> &mut [Section] {
        &mut self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name() == name)
    }

    pub fn molecule_type(&self) -> Option<&MoleculeType> {
        self.sections.iter().find_map(|s| match s {
            Section::MoleculeType(m) => Some(m),
            _ => None,
        })
    }

    pub fn atoms(&self) -> Option<&AtomTable> {
        self.sections.iter().find_map(|s| match s {
            Section::Atoms(table) => Some(table),
            _ => None,
        })
    }

    pub fn atoms_mut(&mut self) -> Option<&mut AtomTable> {
        self.sections.iter_mut().find_map(|s| match s {
            Section::Atoms(table) => Some(table),
            _ => None,
        })
    }

    pub fn terms(&self, kind: TermKind) -> Option<&[BondedTerm]> {
        self.sections.iter().find_map(|s| match s {
            Section::Terms { kind: k, terms } if *k == kind => Some(terms.as_slice()),
            _ => None,
        })
    }

    pub fn terms_mut(&mut self, kind: TermKind) -> Option<&mut Vec<BondedTerm>> {
        self.sections.iter_mut().find_map(|s| match s {
            Section::Terms { kind: k, terms } if *k == kind => Some(terms),
            _ => None,
        })
    }

    /// Iterates the names and lines of sections without a schema.
    pub fn opaque_sections(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.sections.iter().filter_map(|s| match s {
            Section::Opaque { name, lines } => Some((name.as_str(), lines.as_slice())),
            _ => None,
        })
    }

    pub fn atom_count(&self) -> usize {
        self.atoms().map_or(0, AtomTable::len)
    }
}
